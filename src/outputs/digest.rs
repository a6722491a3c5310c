//! Markdown digest of scraped projects.
//!
//! Condenses each record into the handful of facts worth skimming: launch
//! date, raise, what the project works on, and who backs it. The last two
//! are pulled out of the free-text description.

use crate::models::{NOT_AVAILABLE, ProjectRecord};
use chrono::Local;
use std::error::Error;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

/// Phrases that introduce an investor clause, checked in this order.
const INVESTOR_KEYWORDS: [&str; 5] = [
    "backed by",
    "invested by",
    "investors include",
    "investment from",
    "partners include",
];

#[derive(Debug, PartialEq, Eq)]
pub struct ProjectDigest<'a> {
    pub name: &'a str,
    pub tge: &'a str,
    pub raise: &'a str,
    pub focus: String,
    pub investors: String,
}

impl<'a> From<&'a ProjectRecord> for ProjectDigest<'a> {
    fn from(record: &'a ProjectRecord) -> Self {
        Self {
            name: &record.name,
            tge: &record.start_date,
            raise: &record.total_raise,
            focus: project_focus(&record.description),
            investors: investors(&record.description),
        }
    }
}

/// First sentence of the description.
pub fn project_focus(description: &str) -> String {
    if description.is_empty() || description == NOT_AVAILABLE {
        return NOT_AVAILABLE.to_string();
    }
    let first = description.split('.').next().unwrap_or_default().trim();
    if first.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        first.to_string()
    }
}

/// Clause naming the project's backers, from the keyword up to the next period.
pub fn investors(description: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with the original text.
    let lower = description.to_ascii_lowercase();
    for keyword in INVESTOR_KEYWORDS {
        let Some(start) = lower.find(keyword) else {
            continue;
        };
        if let Some(end) = description[start..].find('.') {
            return description[start..start + end].trim().to_string();
        }
    }
    NOT_AVAILABLE.to_string()
}

pub fn digest_to_markdown(records: &[ProjectRecord]) -> String {
    let mut md = String::new();
    writeln!(md, "# Project digest\n").unwrap();
    writeln!(
        md,
        "_{} projects, generated {}_\n",
        records.len(),
        Local::now().format("%Y-%m-%d %H:%M")
    )
    .unwrap();

    for digest in records.iter().map(ProjectDigest::from) {
        writeln!(md, "## {}\n", digest.name).unwrap();
        writeln!(md, "- **TGE:** {}", digest.tge).unwrap();
        writeln!(md, "- **Raise:** {}", digest.raise).unwrap();
        writeln!(md, "- **Working on:** {}", digest.focus).unwrap();
        writeln!(md, "- **Investors:** {}\n", digest.investors).unwrap();
    }
    md
}

#[instrument(level = "info", skip(records))]
pub async fn write_digest(records: &[ProjectRecord], path: &str) -> Result<(), Box<dyn Error>> {
    fs::write(path, digest_to_markdown(records)).await?;
    info!(count = records.len(), "Wrote project digest");
    Ok(())
}
