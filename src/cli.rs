//! Command-line interface definitions.
//!
//! Every flag is optional: running the binary with no arguments scrapes the
//! default listing into `project_list.json` in the working directory.

use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// Which browser backend drives page loads.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// A real browser through a running WebDriver service (chromedriver).
    Webdriver,
    /// Plain HTTP fetches; only for listings rendered server-side.
    Http,
}

/// Command-line arguments.
///
/// Flags override values from the optional YAML config file.
///
/// # Examples
///
/// ```sh
/// # Stock run
/// launch_list_scraper
///
/// # Continue an earlier run and write a Markdown digest
/// launch_list_scraper --resume --digest digest.md
///
/// # Headless browser on a remote chromedriver
/// launch_list_scraper --headless --webdriver-url http://127.0.0.1:4444
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "SCRAPER_CONFIG")]
    pub config: Option<String>,

    /// Output JSON file (default: project_list.json)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Listing page URL without query string
    #[arg(long)]
    pub base_url: Option<String>,

    /// Browser backend
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,

    /// WebDriver endpoint
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Seconds to pause after each navigation
    #[arg(long)]
    pub settle_secs: Option<u64>,

    /// Seconds to wait for an element before giving up on it
    #[arg(long)]
    pub wait_secs: Option<u64>,

    /// Stop after this many listing pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Seed known projects from the existing output file and keep them
    #[arg(long)]
    pub resume: bool,

    /// Also write a Markdown digest of the collected projects to this path
    #[arg(long)]
    pub digest: Option<String>,
}
