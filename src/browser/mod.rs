//! Browser automation boundary.
//!
//! The scraper needs a handful of things from a browser: navigate, report
//! the current URL, hand back the rendered HTML, wait for an element, read
//! an element's text, and shut down. Row parsing runs over the HTML with
//! `scraper`.
//!
//! Waiting and text reading have default implementations that poll the
//! page source; backends with a live DOM override them.
//!
//! # Backends
//!
//! | Backend | Module | Notes |
//! |---------|--------|-------|
//! | WebDriver | [`webdriver`] | Real browser, renders client-side content |
//! | HTTP | [`http`] | Static fetch, no script execution |

use itertools::Itertools;
use scraper::{ElementRef, Html, Node, Selector};
use std::error::Error;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

pub mod http;
pub mod webdriver;

#[cfg(test)]
pub mod fake;

/// Elements whose start begins a new line of rendered text.
const BLOCK_TAGS: [&str; 14] = [
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "section",
];

/// A single browser session.
#[allow(async_fn_in_trait)]
pub trait Browser {
    /// Navigate to `url`, returning once the navigation is committed.
    async fn goto(&mut self, url: &str) -> Result<(), Box<dyn Error>>;

    /// URL of the loaded document, after redirects.
    async fn current_url(&mut self) -> Result<String, Box<dyn Error>>;

    /// Rendered HTML of the loaded document.
    async fn source(&mut self) -> Result<String, Box<dyn Error>>;

    /// Wait until `selector` matches, for at most `timeout`.
    ///
    /// Returns `false` when the bound elapsed first. The page is always
    /// checked at least once, so a zero timeout is a single presence check.
    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<bool, Box<dyn Error>> {
        let parsed = parse_selector(selector)?;
        let started = Instant::now();
        loop {
            let html = self.source().await?;
            if Html::parse_document(&html).select(&parsed).next().is_some() {
                return Ok(true);
            }
            if started.elapsed() >= timeout {
                debug!(%selector, ?timeout, "Selector did not appear");
                return Ok(false);
            }
            sleep(poll).await;
        }
    }

    /// Trimmed rendered text of the first element matching `selector`.
    ///
    /// `None` when nothing matches or the text is blank.
    async fn first_text(&mut self, selector: &str) -> Result<Option<String>, Box<dyn Error>> {
        let parsed = parse_selector(selector)?;
        let html = self.source().await?;
        let document = Html::parse_document(&html);
        Ok(document
            .select(&parsed)
            .next()
            .and_then(|element| non_blank(rendered_text(element))))
    }

    /// End the session and release the browser.
    async fn close(self) -> Result<(), Box<dyn Error>>;
}

/// Parse a CSS selector, boxing the parse error.
pub fn parse_selector(selector: &str) -> Result<Selector, Box<dyn Error>> {
    Selector::parse(selector).map_err(|e| format!("invalid selector {:?}: {}", selector, e).into())
}

/// Single-line text of an element: text nodes joined, whitespace collapsed.
///
/// Used for table cells, where line structure carries no meaning.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of an element with a line break before each block-level child.
///
/// Whitespace inside a line is collapsed and blank lines are dropped, which
/// approximates what a browser reports as an element's visible text.
pub fn rendered_text(element: ElementRef<'_>) -> String {
    let mut lines = vec![String::new()];
    for node in element.descendants().skip(1) {
        match node.value() {
            Node::Element(el) if BLOCK_TAGS.contains(&el.name()) => lines.push(String::new()),
            Node::Text(text) => {
                if let Some(line) = lines.last_mut() {
                    for word in text.split_whitespace() {
                        if !line.is_empty() {
                            line.push(' ');
                        }
                        line.push_str(word);
                    }
                }
            }
            _ => {}
        }
    }
    lines.into_iter().filter(|line| !line.is_empty()).join("\n")
}

/// Trim `text`, mapping blank text to `None`.
pub fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeBrowser;
    use super::*;

    fn first<'a>(doc: &'a Html, selector: &str) -> ElementRef<'a> {
        doc.select(&parse_selector(selector).unwrap()).next().unwrap()
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let doc = Html::parse_fragment("<p>  Hello\n   <b>brave</b>\tnew   world </p>");
        assert_eq!(element_text(first(&doc, "p")), "Hello brave new world");
    }

    #[test]
    fn test_rendered_text_keeps_paragraph_breaks() {
        let doc = Html::parse_fragment(
            "<div class='d'><p>First  <b>bold</b> line.</p>\n<p>Second line.</p><ul><li>one</li><li>two</li></ul></div>",
        );
        assert_eq!(
            rendered_text(first(&doc, ".d")),
            "First bold line.\nSecond line.\none\ntwo"
        );
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  a\nb \n".into()), Some("a\nb".to_string()));
        assert_eq!(non_blank(" \n\t".into()), None);
    }

    #[test]
    fn test_parse_selector_rejects_garbage() {
        assert!(parse_selector("div[").is_err());
    }

    #[tokio::test]
    async fn test_wait_for_present() {
        let mut browser = FakeBrowser::new().with_page("https://x.test/", "<div class='a'>hi</div>");
        browser.goto("https://x.test/").await.unwrap();
        let found = browser.wait_for(".a", Duration::ZERO, Duration::ZERO).await.unwrap();
        assert!(found);
        assert_eq!(browser.source_calls(), 1);
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let mut browser = FakeBrowser::new().with_page("https://x.test/", "<div class='a'>hi</div>");
        browser.goto("https://x.test/").await.unwrap();
        let found = browser
            .wait_for(".missing", Duration::from_millis(30), Duration::from_millis(10))
            .await
            .unwrap();
        assert!(!found);
        assert!(browser.source_calls() >= 2);
    }

    #[tokio::test]
    async fn test_first_text_reads_first_match_only() {
        let mut browser = FakeBrowser::new()
            .with_page("https://x.test/", "<p class='a'> one </p><p class='a'>two</p><p class='b'>  </p>");
        browser.goto("https://x.test/").await.unwrap();
        assert_eq!(browser.first_text(".a").await.unwrap().as_deref(), Some("one"));
        assert_eq!(browser.first_text(".b").await.unwrap(), None);
        assert_eq!(browser.first_text(".c").await.unwrap(), None);
    }
}
