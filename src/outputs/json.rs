//! JSON output of scraped projects.
//!
//! [`ProjectStore`] owns the ordered collection and the set of known names.
//! After every accepted record the whole collection is rewritten to disk as
//! a pretty-printed JSON array, so an interrupted run loses at most the
//! project being fetched at the time.
//!
//! The rewrite goes through a sibling `.tmp` file followed by a rename, so a
//! reader never sees a half-written array.

use crate::models::ProjectRecord;
use itertools::Itertools;
use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

pub struct ProjectStore {
    path: PathBuf,
    records: Vec<ProjectRecord>,
    /// Every accepted name, including resumed ones.
    seen: HashSet<String>,
    /// Names loaded from an earlier run's output.
    resumed: HashSet<String>,
}

impl ProjectStore {
    /// Empty store writing to `path`. Nothing touches disk until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            seen: HashSet::new(),
            resumed: HashSet::new(),
        }
    }

    /// Store seeded from an earlier run's output file.
    ///
    /// A missing file yields an empty store. Records repeating a name are
    /// dropped, keeping the first occurrence.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn resume(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        let mut store = Self::new(path);

        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No previous output; starting empty");
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };

        let loaded: Vec<ProjectRecord> = serde_json::from_str(&raw)?;
        let total = loaded.len();
        store.records = loaded
            .into_iter()
            .unique_by(|r| r.name.clone())
            .collect();
        store.seen = store.records.iter().map(|r| r.name.clone()).collect();
        store.resumed = store.seen.clone();

        if store.records.len() < total {
            warn!(dropped = total - store.records.len(), "Dropped duplicate names from previous output");
        }
        info!(count = store.records.len(), "Resumed previous output");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn resumed(&self) -> &HashSet<String> {
        &self.resumed
    }

    /// Accept a finalized record and rewrite the output file.
    ///
    /// Returns `false` without touching the collection if the name is
    /// already present. Write failures are logged, not returned.
    #[instrument(level = "debug", skip_all, fields(name = %record.name))]
    pub async fn append_record(&mut self, record: ProjectRecord) -> bool {
        if self.seen.contains(&record.name) {
            warn!("Refusing duplicate project name");
            return false;
        }
        self.seen.insert(record.name.clone());
        self.records.push(record);

        if let Err(e) = self.persist().await {
            error!(path = %self.path.display(), error = %e, "Error saving progress");
        }
        true
    }

    /// Rewrite the output file with the full collection.
    pub async fn persist(&self) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string_pretty(&self.records)?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub fn into_records(self) -> Vec<ProjectRecord> {
        self.records
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
