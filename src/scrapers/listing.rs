//! Listing page navigation and row extraction.
//!
//! A listing page is a table whose project rows each hold an anchor marked
//! with the `clean-button` class. Columns are read at fixed positions:
//!
//! | Cell | Field |
//! |------|-------|
//! | 0 | score |
//! | 1 | name and detail link |
//! | 2 | start date |
//! | 3 | end date |
//! | 4 | status |
//! | 5 | unused |
//! | 6 | total raise |

use crate::browser::{Browser, element_text, parse_selector};
use crate::config::ScraperConfig;
use crate::models::{ListingRow, or_not_available};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::error::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Minimum number of cells for a row to carry project data.
pub const MIN_CELLS: usize = 7;

static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// A listing page that loaded with at least one project row.
#[derive(Debug)]
pub struct ListingPage {
    /// URL of the loaded document, used to resolve relative links.
    pub url: String,
    pub html: String,
}

/// Where row extraction stopped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    #[default]
    /// Every row was examined.
    EndOfPage,
    /// A row named a project accepted on an earlier page of this run.
    KnownProject,
    /// A row named a project loaded from an earlier run's output.
    PreviousRun,
    /// A row repeated a name collected earlier on the same page.
    RepeatedOnPage,
}

/// Rows collected from one page.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub rows: Vec<ListingRow>,
    pub halt: Halt,
}

impl PageExtraction {
    /// Rows that should be processed.
    ///
    /// A page that reached a project accepted earlier in this run is dropped
    /// as a whole. Reaching a resumed project or a name repeated within the
    /// page keeps the rows before it.
    pub fn into_new_rows(self) -> Vec<ListingRow> {
        match self.halt {
            Halt::KnownProject => Vec::new(),
            Halt::EndOfPage | Halt::PreviousRun | Halt::RepeatedOnPage => self.rows,
        }
    }

    /// Whether pagination should end after this page.
    pub fn ends_pagination(&self) -> bool {
        self.halt != Halt::EndOfPage
    }
}

/// Navigate to a listing page and confirm it shows project rows.
///
/// Any failure, including a page without rows, yields `None`; the caller
/// treats that as the end of pagination.
#[instrument(level = "info", skip(browser, config))]
pub async fn load_page<B: Browser>(
    browser: &mut B,
    config: &ScraperConfig,
    page: u32,
) -> Option<ListingPage> {
    let url = config.page_url(page);
    info!(page, %url, "Navigating to listing page");

    match try_load_page(browser, config, &url).await {
        Ok(Some(listing)) => Some(listing),
        Ok(None) => {
            warn!(page, "No project rows found");
            None
        }
        Err(e) => {
            warn!(page, error = %e, "Failed to load listing page");
            None
        }
    }
}

async fn try_load_page<B: Browser>(
    browser: &mut B,
    config: &ScraperConfig,
    url: &str,
) -> Result<Option<ListingPage>, Box<dyn Error>> {
    browser.goto(url).await?;
    sleep(config.settle()).await;

    let appeared = browser
        .wait_for(
            &config.row_marker_selector,
            config.wait_timeout(),
            config.poll_interval(),
        )
        .await?;
    if !appeared {
        return Ok(None);
    }
    let html = browser.source().await?;

    let row_count = {
        let document = Html::parse_document(&html);
        project_rows(&document, config)?.len()
    };
    if row_count == 0 {
        return Ok(None);
    }
    info!(rows = row_count, "Listing page loaded");

    let current = browser.current_url().await.unwrap_or_else(|_| url.to_string());
    Ok(Some(ListingPage { url: current, html }))
}

fn project_rows<'a>(
    document: &'a Html,
    config: &ScraperConfig,
) -> Result<Vec<ElementRef<'a>>, Box<dyn Error>> {
    let row_selector = parse_selector(&config.row_selector)?;
    let marker = parse_selector(&config.row_marker_selector)?;
    Ok(document
        .select(&row_selector)
        .filter(|row| row.select(&marker).next().is_some())
        .collect())
}

/// Extract project rows in document order.
///
/// Rows with fewer than [`MIN_CELLS`] cells or without a resolvable link are
/// skipped. Extraction halts at the first row whose name is in `resumed`, in
/// `seen`, or already collected from this page; the rows gathered up to that
/// point are returned along with the reason.
#[instrument(level = "debug", skip_all, fields(page_url = %page.url))]
pub fn extract_rows(
    page: &ListingPage,
    config: &ScraperConfig,
    seen: &HashSet<String>,
    resumed: &HashSet<String>,
) -> Result<PageExtraction, Box<dyn Error>> {
    let base = Url::parse(&page.url)?;
    let document = Html::parse_document(&page.html);
    let mut extraction = PageExtraction::default();

    for (index, row) in project_rows(&document, config)?.into_iter().enumerate() {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        if cells.len() < MIN_CELLS {
            debug!(index, cells = cells.len(), "Skipping short row");
            continue;
        }

        let name = element_text(cells[1]);
        if name.is_empty() {
            debug!(index, "Skipping row without a name");
            continue;
        }
        if resumed.contains(&name) {
            info!(index, %name, "Reached a project from the previous run");
            extraction.halt = Halt::PreviousRun;
            break;
        }
        if seen.contains(&name) {
            info!(index, %name, "Reached an already known project");
            extraction.halt = Halt::KnownProject;
            break;
        }
        if extraction.rows.iter().any(|r| r.name == name) {
            info!(index, %name, "Project repeated on the same page");
            extraction.halt = Halt::RepeatedOnPage;
            break;
        }

        let Some(url) = resolve_link(cells[1], &base) else {
            warn!(index, %name, "No link found for project");
            continue;
        };

        extraction.rows.push(ListingRow {
            score: or_not_available(element_text(cells[0])),
            name,
            url,
            start_date: or_not_available(element_text(cells[2])),
            end_date: or_not_available(element_text(cells[3])),
            status: or_not_available(element_text(cells[4])),
            total_raise: or_not_available(element_text(cells[6])),
        });
    }

    debug!(
        rows = extraction.rows.len(),
        halt = ?extraction.halt,
        "Extracted listing rows"
    );
    Ok(extraction)
}

fn resolve_link(cell: ElementRef<'_>, base: &Url) -> Option<String> {
    let href = cell.select(&LINK).next()?.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}
