//! Scraper configuration.
//!
//! Defaults reproduce the stock run against the DeFi launch listing. A YAML
//! file can override any subset of fields, and command-line flags override
//! the file (see [`ScraperConfig::apply_cli`]).
//!
//! ```yaml
//! base_url: https://coinlaunch.space/projects/defi/
//! settle_secs: 5
//! description_selectors:
//!   - .description-text
//!   - .wrap p
//! ```

use crate::cli::{Cli, DriverKind};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Detail-page selectors tried in order; the first with non-empty text wins.
pub const DEFAULT_DESCRIPTION_SELECTORS: [&str; 7] = [
    ".description-text",
    "div.wrap > p",
    "div.description p",
    "div.mb-48.description-text",
    ".project-description",
    ".wrap p",
    "div.wrap div p",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Listing page without query string.
    pub base_url: String,
    /// Query pair that is present on every listing URL.
    pub sort_param: String,
    pub output_path: String,
    /// Pause after each navigation before the DOM is queried.
    pub settle_secs: u64,
    /// Upper bound for each wait-for-element poll.
    pub wait_timeout_secs: u64,
    pub poll_interval_millis: u64,
    pub row_selector: String,
    /// Only rows containing this element are project rows.
    pub row_marker_selector: String,
    pub description_selectors: Vec<String>,
    pub driver: DriverKind,
    pub webdriver_url: String,
    pub headless: bool,
    pub browser_args: Vec<String>,
    pub max_pages: Option<u32>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://coinlaunch.space/projects/defi/".to_string(),
            sort_param: "sort=-dateStart".to_string(),
            output_path: "project_list.json".to_string(),
            settle_secs: 3,
            wait_timeout_secs: 20,
            poll_interval_millis: 500,
            row_selector: "tbody tr".to_string(),
            row_marker_selector: "a.clean-button".to_string(),
            description_selectors: DEFAULT_DESCRIPTION_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            driver: DriverKind::Webdriver,
            webdriver_url: "http://localhost:9515".to_string(),
            headless: false,
            browser_args: vec!["--no-sandbox".to_string(), "--start-maximized".to_string()],
            max_pages: None,
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a YAML file; missing fields keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ScraperConfig = serde_yaml::from_str(&raw)?;
        info!("Loaded scraper configuration");
        Ok(config)
    }

    /// Build the effective configuration: defaults, then file, then flags.
    pub fn resolve(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let mut config = match &cli.config {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(output) = &cli.output {
            self.output_path = output.clone();
        }
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(driver) = cli.driver {
            self.driver = driver;
        }
        if let Some(webdriver_url) = &cli.webdriver_url {
            self.webdriver_url = webdriver_url.clone();
        }
        if cli.headless {
            self.headless = true;
        }
        if let Some(secs) = cli.settle_secs {
            self.settle_secs = secs;
        }
        if let Some(secs) = cli.wait_secs {
            self.wait_timeout_secs = secs;
        }
        if cli.max_pages.is_some() {
            self.max_pages = cli.max_pages;
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| format!("invalid base_url {:?}: {}", self.base_url, e))?;
        if base.query().is_some() || base.fragment().is_some() {
            return Err(format!(
                "base_url {:?} must not carry a query or fragment; use sort_param",
                self.base_url
            )
            .into());
        }
        if self.description_selectors.is_empty() {
            return Err("description_selectors must not be empty".into());
        }
        Ok(())
    }

    /// Listing URL for a 1-based page index.
    ///
    /// Page 1 carries only the sort parameter; later pages append `&page=<n>`.
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            format!("{}?{}", self.base_url, self.sort_param)
        } else {
            format!("{}?{}&page={}", self.base_url, self.sort_param, page)
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_first_page_omits_page_param() {
        let config = ScraperConfig::default();
        assert_eq!(
            config.page_url(1),
            "https://coinlaunch.space/projects/defi/?sort=-dateStart"
        );
    }

    #[test]
    fn test_later_pages_append_page_param() {
        let config = ScraperConfig::default();
        for page in 2..5 {
            let url = config.page_url(page);
            assert!(url.contains("sort=-dateStart"));
            assert!(url.ends_with(&format!("&page={}", page)));
        }
    }

    #[test]
    fn test_yaml_overrides_subset() {
        let config: ScraperConfig = serde_yaml::from_str(
            "base_url: https://example.com/list/\nsettle_secs: 0\ndescription_selectors: ['.about']\n",
        )
        .unwrap();
        assert_eq!(config.base_url, "https://example.com/list/");
        assert_eq!(config.settle_secs, 0);
        assert_eq!(config.description_selectors, vec![".about".to_string()]);
        assert_eq!(config.wait_timeout_secs, 20);
        assert_eq!(config.sort_param, "sort=-dateStart");
    }

    #[test]
    fn test_yaml_file_and_cli_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.yaml");
        std::fs::write(&path, "output_path: from_file.json\nwait_timeout_secs: 7\n").unwrap();

        let cli = Cli::parse_from([
            "launch_list_scraper",
            "--config",
            path.to_str().unwrap(),
            "--output",
            "from_cli.json",
        ]);
        let config = ScraperConfig::resolve(&cli).unwrap();
        assert_eq!(config.output_path, "from_cli.json");
        assert_eq!(config.wait_timeout_secs, 7);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = ScraperConfig {
            base_url: "not a url".into(),
            ..ScraperConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_with_query_rejected() {
        let config = ScraperConfig {
            base_url: "https://list.test/projects/?a=1".into(),
            ..ScraperConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("query"));
        assert!(ScraperConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_selectors_in_priority_order() {
        let config = ScraperConfig::default();
        assert_eq!(config.description_selectors.len(), 7);
        assert_eq!(config.description_selectors[0], ".description-text");
        assert_eq!(config.description_selectors[1], "div.wrap > p");
        assert_eq!(config.description_selectors[6], "div.wrap div p");
    }
}
