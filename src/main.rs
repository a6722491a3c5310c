//! # Launch List Scraper
//!
//! Walks a paginated listing of token launch projects, collects each
//! project's table fields plus the description from its detail page, and
//! keeps `project_list.json` up to date after every project.
//!
//! ## Usage
//!
//! ```sh
//! # chromedriver must be listening on localhost:9515
//! launch_list_scraper
//! ```
//!
//! ## Architecture
//!
//! 1. **Session**: start a browser (WebDriver or plain HTTP)
//! 2. **Listing**: load page `n` of the table and extract its rows
//! 3. **Detail**: fetch the description of each new project
//! 4. **Output**: append the project and rewrite the JSON file
//! 5. Repeat with `n + 1` until a page yields nothing new, then close the browser

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod cli;
mod config;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use browser::http::HttpBrowser;
use browser::webdriver::WebDriverBrowser;
use cli::{Cli, DriverKind};
use config::ScraperConfig;
use outputs::digest::write_digest;
use outputs::json::ProjectStore;
use pipeline::{Pipeline, RunSummary};
use utils::ensure_output_writable;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("launch_list_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = ScraperConfig::resolve(&args)?;
    info!(
        base_url = %config.base_url,
        output = %config.output_path,
        driver = ?config.driver,
        "Configuration resolved"
    );

    let output_path = Path::new(&config.output_path);
    if let Err(e) = ensure_output_writable(output_path).await {
        error!(
            path = %config.output_path,
            error = %e,
            "Output location is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let store = if args.resume {
        ProjectStore::resume(output_path).await?
    } else {
        ProjectStore::new(output_path)
    };

    let summary = match config.driver {
        DriverKind::Webdriver => {
            let browser = WebDriverBrowser::connect(&config).await?;
            Pipeline::new(browser, config.clone(), store).run().await
        }
        DriverKind::Http => {
            let browser = HttpBrowser::new()?;
            Pipeline::new(browser, config.clone(), store).run().await
        }
    };
    let RunSummary {
        records,
        pages_scraped,
    } = summary;

    if let Some(digest_path) = &args.digest {
        if let Err(e) = write_digest(&records, digest_path).await {
            error!(path = %digest_path, error = %e, "Failed writing digest");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        projects = records.len(),
        pages = pages_scraped,
        path = %config.output_path,
        ?elapsed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}
