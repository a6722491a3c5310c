//! Static HTTP "browser".
//!
//! Fetches each page once with reqwest and serves the body as the rendered
//! source. Scripts never run, so this only works for listings that are
//! rendered server-side.

use super::Browser;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, instrument};

pub struct HttpBrowser {
    client: Client,
    current_url: Option<String>,
    body: Option<String>,
}

impl HttpBrowser {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(concat!("launch_list_scraper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            current_url: None,
            body: None,
        })
    }
}

impl Browser for HttpBrowser {
    #[instrument(level = "debug", skip(self))]
    async fn goto(&mut self, url: &str) -> Result<(), Box<dyn Error>> {
        self.current_url = None;
        self.body = None;

        let response = self.client.get(url).send().await?.error_for_status()?;
        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!(%final_url, bytes = body.len(), "Fetched page");

        self.current_url = Some(final_url);
        self.body = Some(body);
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, Box<dyn Error>> {
        self.current_url.clone().ok_or_else(|| "no page loaded".into())
    }

    async fn source(&mut self) -> Result<String, Box<dyn Error>> {
        self.body.clone().ok_or_else(|| "no page loaded".into())
    }

    async fn close(self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_source_before_navigation_fails() {
        let mut browser = HttpBrowser::new().unwrap();
        assert!(browser.source().await.is_err());
        assert!(browser.current_url().await.is_err());
    }
}
