//! WebDriver-backed browser session.
//!
//! Connects to an already running WebDriver service (chromedriver by
//! default on `http://localhost:9515`) and starts a Chrome session with the
//! configured arguments. Element waits and text reads go through the live
//! DOM, so text keeps the line breaks the browser renders.

use super::{Browser, non_blank};
use crate::config::ScraperConfig;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Start a browser session with the configured Chrome arguments.
    #[instrument(level = "info", skip_all, fields(webdriver_url = %config.webdriver_url))]
    pub async fn connect(config: &ScraperConfig) -> Result<Self, Box<dyn Error>> {
        let mut caps = Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": chrome_args(config) }),
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await?;
        info!(headless = config.headless, "Browser session started");

        Ok(Self { client })
    }
}

fn chrome_args(config: &ScraperConfig) -> Vec<Value> {
    let mut args: Vec<Value> = config.browser_args.iter().map(|a| json!(a)).collect();
    if config.headless {
        args.push(json!("--headless"));
        args.push(json!("--disable-gpu"));
    }
    args
}

impl Browser for WebDriverBrowser {
    async fn goto(&mut self, url: &str) -> Result<(), Box<dyn Error>> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, Box<dyn Error>> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn source(&mut self) -> Result<String, Box<dyn Error>> {
        Ok(self.client.source().await?)
    }

    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<bool, Box<dyn Error>> {
        let waited = self
            .client
            .wait()
            .at_most(timeout)
            .every(poll)
            .for_element(Locator::Css(selector))
            .await;
        match waited {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => {
                debug!(%selector, ?timeout, "Selector did not appear");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn first_text(&mut self, selector: &str) -> Result<Option<String>, Box<dyn Error>> {
        let element = match self.client.find(Locator::Css(selector)).await {
            Ok(element) => element,
            Err(e) if e.is_no_such_element() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(non_blank(element.text().await?))
    }

    async fn close(self) -> Result<(), Box<dyn Error>> {
        self.client.close().await?;
        info!("Browser session closed");
        Ok(())
    }
}
