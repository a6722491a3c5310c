//! The scrape driver loop.
//!
//! ```text
//! page = 1
//! loop:
//!     load listing page        -> stop on failure or no rows
//!     extract rows             -> stop on known name or no new rows
//!     for each row: fetch description, append, rewrite output
//!     page += 1
//! close browser (always)
//! ```
//!
//! The loop assumes the listing is sorted newest first, so the first known
//! project means everything after it has been seen already. A page that
//! contains a project accepted earlier in the run is dropped as a whole.
//! Reaching a project from a resumed run, or a name repeated within a single
//! page, keeps the rows before it and ends pagination after the page.

use crate::browser::Browser;
use crate::config::ScraperConfig;
use crate::models::ProjectRecord;
use crate::outputs::json::ProjectStore;
use crate::scrapers::listing::Halt;
use crate::scrapers::{detail, listing};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, instrument, warn};

/// Result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub records: Vec<ProjectRecord>,
    /// Listing pages whose rows were accepted.
    pub pages_scraped: u32,
}

pub struct Pipeline<B: Browser> {
    browser: B,
    config: ScraperConfig,
    store: ProjectStore,
}

impl<B: Browser> Pipeline<B> {
    pub fn new(browser: B, config: ScraperConfig, store: ProjectStore) -> Self {
        Self {
            browser,
            config,
            store,
        }
    }

    /// Run pagination to completion and release the browser.
    ///
    /// The browser is closed even if a stage panics; whatever was collected
    /// up to that point is still returned.
    pub async fn run(self) -> RunSummary {
        let Pipeline {
            mut browser,
            config,
            mut store,
        } = self;
        let mut pages_scraped = 0;

        info!("Starting scraper (projects sorted by start date, latest first)");
        let outcome = AssertUnwindSafe(paginate(
            &mut browser,
            &config,
            &mut store,
            &mut pages_scraped,
        ))
        .catch_unwind()
        .await;
        if outcome.is_err() {
            error!(
                collected = store.len(),
                "Scraping aborted unexpectedly; keeping collected projects"
            );
        }

        if let Err(e) = browser.close().await {
            warn!(error = %e, "Error quitting browser");
        }

        if store.is_empty() {
            warn!("No projects collected");
        }
        info!(
            total = store.len(),
            pages = pages_scraped,
            "Scraping complete"
        );
        RunSummary {
            records: store.into_records(),
            pages_scraped,
        }
    }
}

/// What the driver loop does after a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    /// Rows were accepted; try the next page.
    Continue,
    /// Rows were accepted, but nothing new can follow.
    LastPage,
    /// Nothing was accepted.
    Stop,
}

async fn paginate<B: Browser>(
    browser: &mut B,
    config: &ScraperConfig,
    store: &mut ProjectStore,
    pages_scraped: &mut u32,
) {
    let mut page = 1;
    loop {
        if config.max_pages.is_some_and(|max| page > max) {
            info!(max_pages = ?config.max_pages, "Page limit reached");
            break;
        }
        info!(page, "Processing page");
        match scrape_page(browser, config, store, page).await {
            PageOutcome::Continue => {
                *pages_scraped += 1;
                page += 1;
            }
            PageOutcome::LastPage => {
                *pages_scraped += 1;
                break;
            }
            PageOutcome::Stop => break,
        }
    }
}

/// Scrape one listing page, appending its new projects to the store.
#[instrument(level = "info", skip(browser, config, store))]
async fn scrape_page<B: Browser>(
    browser: &mut B,
    config: &ScraperConfig,
    store: &mut ProjectStore,
    page: u32,
) -> PageOutcome {
    let Some(listing_page) = listing::load_page(browser, config, page).await else {
        return PageOutcome::Stop;
    };

    let extraction = match listing::extract_rows(&listing_page, config, store.seen(), store.resumed()) {
        Ok(extraction) => extraction,
        Err(e) => {
            warn!(error = %e, "Error processing page");
            return PageOutcome::Stop;
        }
    };
    if extraction.halt == Halt::KnownProject {
        info!(
            discarded = extraction.rows.len(),
            "Page contains an already known project; stopping"
        );
    }

    let last_page = extraction.ends_pagination();
    let rows = extraction.into_new_rows();
    if rows.is_empty() {
        return PageOutcome::Stop;
    }

    let added = rows.len();
    for row in rows {
        let description = detail::fetch_description(browser, config, &row.url).await;
        let record = row.into_record(description);
        let (name, score, raise) = (
            record.name.clone(),
            record.score.clone(),
            record.total_raise.clone(),
        );
        if store.append_record(record).await {
            info!(
                count = store.len(),
                %name,
                %score,
                %raise,
                "Project added"
            );
        }
    }

    info!(added, "Added new projects from page");
    if last_page {
        PageOutcome::LastPage
    } else {
        PageOutcome::Continue
    }
}
