//! site-capture
//!
//! Batch capture of web pages: for each URL, the visible text and the main
//! content markup are written to a folder named after the site.

use anyhow::{Context, bail};
use clap::Parser;
use site_capture::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use site_capture::pipeline::{self, BatchSummary, CaptureOptions};
use site_capture::tools::utils::http_url;
use site_capture::{ExtractionOptions, RemovalOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "site-capture")]
#[command(version)]
#[command(about = "Capture the visible text and main content of web pages", long_about = None)]
struct Cli {
    /// URL to process, or a text file with one URL per line
    input: String,

    /// Output directory
    #[arg(long, short = 'o', default_value = "processed_screenshots")]
    output: PathBuf,

    /// Remove Framer-specific elements (ssr-variant, badge container)
    #[arg(long)]
    remove_framer: bool,

    /// Remove ads, cookie banners, GDPR notices and popup overlays
    #[arg(long)]
    remove_all_unwanted: bool,

    /// Additional CSS selectors to remove
    #[arg(long, num_args = 1.., value_name = "SELECTOR")]
    custom_selectors: Vec<String>,

    /// Page load timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Seconds to wait after load before capturing
    #[arg(long, default_value_t = 2.0)]
    delay: f64,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Keep text of hidden elements
    #[arg(long)]
    include_hidden: bool,

    /// Command converting CSS on stdin into utility classes on stdout
    #[arg(long, value_name = "CMD")]
    converter: Option<String>,

    /// Also copy the extracted text to the page clipboard
    #[arg(long)]
    copy: bool,

    /// Skip saving the main-content markup
    #[arg(long)]
    no_dom: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// WebSocket endpoint of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,
}

impl Cli {
    fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            extraction: ExtractionOptions::new().include_hidden(self.include_hidden),
            removal: RemovalOptions {
                remove_framer: self.remove_framer,
                remove_common_unwanted: self.remove_all_unwanted,
                custom_selectors: self.custom_selectors.clone(),
            },
            delay_secs: self.delay,
            converter: self.converter.clone(),
            copy: self.copy,
            capture_dom: !self.no_dom,
        }
    }

    fn launch_options(&self) -> LaunchOptions {
        let mut options = LaunchOptions::new()
            .headless(!self.headed)
            .navigation_timeout(Duration::from_secs(self.timeout));
        if let Some(path) = &self.executable_path {
            options = options.chrome_path(path);
        }
        if let Some(dir) = &self.user_data_dir {
            options = options.user_data_dir(dir);
        }
        options
    }
}

/// A single URL, or every URL listed in a file
fn load_targets(input: &str) -> anyhow::Result<Vec<String>> {
    if let Some(url) = http_url(input) {
        log::info!("Processing single URL: {}", url);
        return Ok(vec![input.trim().to_string()]);
    }

    let contents = std::fs::read_to_string(input).with_context(|| format!("{} not found", input))?;

    let mut urls = Vec::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if http_url(line).is_some() {
            urls.push(line.to_string());
        } else {
            log::warn!("Skipping line {} of {}: not an http(s) URL: {}", number + 1, input, line);
        }
    }

    log::info!("Found {} URLs to process from {}", urls.len(), input);
    Ok(urls)
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let urls = load_targets(&cli.input)?;
    if urls.is_empty() {
        bail!("No URLs to process");
    }

    let options = cli.capture_options();
    log::info!("Output directory: {}", cli.output.display());
    log::debug!("Capture options: {:?}", options);

    let session = match &cli.ws_endpoint {
        Some(endpoint) => BrowserSession::connect(ConnectionOptions::new(endpoint))
            .with_context(|| format!("Failed to connect to {}", endpoint))?,
        None => BrowserSession::launch(cli.launch_options()).context("Failed to launch browser")?,
    };

    let started = Instant::now();
    let mut summary = BatchSummary::default();

    for (i, url) in urls.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", i + 1, urls.len(), url);

        let outcome = pipeline::process_url(&session, url, &cli.output, &options);
        summary.record(url, &outcome);

        match &outcome {
            Ok(report) => log::info!(
                "Completed in {:.1}s - {}/{} successful ({})",
                report.elapsed.as_secs_f64(),
                summary.succeeded,
                i + 1,
                report.folder.display()
            ),
            Err(e) => log::error!("Failed {}: {} - {}/{} successful", url, e, summary.succeeded, i + 1),
        }
    }

    if let Err(e) = session.close() {
        log::debug!("Failed to close browser tabs: {}", e);
    }

    log::info!("Processing complete in {:.1}s", started.elapsed().as_secs_f64());
    log::info!("Success rate: {}/{} URLs", summary.succeeded, summary.total());

    if summary.all_succeeded() {
        log::info!("All {} URLs processed successfully", summary.succeeded);
        Ok(ExitCode::SUCCESS)
    } else {
        for url in &summary.failed {
            log::warn!("Failed URL: {}", url);
        }
        Ok(ExitCode::FAILURE)
    }
}
