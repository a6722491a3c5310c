//! Project detail pages.
//!
//! Detail pages are not uniform, so the description is located by trying a
//! list of selectors from most to least specific. The first selector whose
//! first match has non-empty text wins; there is no scoring across them.

use crate::browser::{Browser, parse_selector};
use crate::config::ScraperConfig;
use crate::models::NOT_AVAILABLE;
use crate::utils::truncate_for_log;
use std::error::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Fetch the description for one project.
///
/// Never fails: navigation errors and selector misses both produce
/// [`NOT_AVAILABLE`].
#[instrument(level = "info", skip(browser, config))]
pub async fn fetch_description<B: Browser>(
    browser: &mut B,
    config: &ScraperConfig,
    url: &str,
) -> String {
    match try_fetch_description(browser, config, url).await {
        Ok(Some(description)) => description,
        Ok(None) => {
            warn!("No description selector matched");
            NOT_AVAILABLE.to_string()
        }
        Err(e) => {
            warn!(error = %e, "Error getting description");
            NOT_AVAILABLE.to_string()
        }
    }
}

async fn try_fetch_description<B: Browser>(
    browser: &mut B,
    config: &ScraperConfig,
    url: &str,
) -> Result<Option<String>, Box<dyn Error>> {
    browser.goto(url).await?;
    sleep(config.settle()).await;

    for candidate in &config.description_selectors {
        if let Err(e) = parse_selector(candidate) {
            warn!(selector = %candidate, error = %e, "Skipping unparsable selector");
            continue;
        }

        let present = browser
            .wait_for(candidate, config.wait_timeout(), config.poll_interval())
            .await?;
        if !present {
            debug!(selector = %candidate, "Selector not present");
            continue;
        }

        if let Some(text) = browser.first_text(candidate).await? {
            info!(
                selector = %candidate,
                preview = %truncate_for_log(&text, 80),
                "Found description"
            );
            return Ok(Some(text));
        }
        debug!(selector = %candidate, "Selector yielded no text");
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeBrowser;

    const DETAIL: &str = "https://coinlaunch.space/projects/x/";

    fn config() -> ScraperConfig {
        ScraperConfig {
            settle_secs: 0,
            wait_timeout_secs: 0,
            ..ScraperConfig::default()
        }
    }

    async fn describe(html: &str) -> String {
        let mut browser = FakeBrowser::new().with_page(DETAIL, html);
        fetch_description(&mut browser, &config(), DETAIL).await
    }

    #[tokio::test]
    async fn test_second_priority_selector() {
        let html = r#"<html><body><div class="wrap"><p>Project X</p></div></body></html>"#;
        assert_eq!(describe(html).await, "Project X");
    }

    #[tokio::test]
    async fn test_no_candidates_yields_sentinel() {
        let html = r#"<html><body><div class="other"><p>Nothing here</p></div></body></html>"#;
        assert_eq!(describe(html).await, "N/A");
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let html = r#"<div class="wrap"><p>Second</p></div><div class="description-text"> First  one </div>"#;
        assert_eq!(describe(html).await, "First one");
    }

    #[tokio::test]
    async fn test_empty_match_falls_through() {
        let html = r#"<div class="description-text">   </div><div class="project-description">Fifth</div>"#;
        assert_eq!(describe(html).await, "Fifth");
    }

    #[tokio::test]
    async fn test_multi_paragraph_description_keeps_line_breaks() {
        let html = r#"<div class="description-text"><p>Lending  on Base.</p><p>Audited twice.</p></div>"#;
        assert_eq!(describe(html).await, "Lending on Base.\nAudited twice.");
    }

    #[tokio::test]
    async fn test_navigation_failure_yields_sentinel() {
        let mut browser = FakeBrowser::new();
        let description =
            fetch_description(&mut browser, &config(), "https://unreachable.test/").await;
        assert_eq!(description, "N/A");
    }
}
