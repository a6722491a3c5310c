//! Data models for scraped project listings.
//!
//! - [`ListingRow`]: raw fields pulled from one row of a listing table
//! - [`ProjectRecord`]: a finalized row, enriched with the detail-page description
//!
//! Unresolved fields carry the sentinel [`NOT_AVAILABLE`] rather than being
//! omitted, so every record serializes with the same set of keys.

use serde::{Deserialize, Serialize};

/// Sentinel used for any field the listing or detail page did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw fields extracted from a single listing table row.
///
/// A row only becomes a `ListingRow` once it has a non-empty name and a
/// resolvable detail link; every other field falls back to [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub score: String,
    pub name: String,
    /// Absolute URL of the project's detail page.
    pub url: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub total_raise: String,
}

impl ListingRow {
    /// Finalize the row with the description fetched from its detail page.
    pub fn into_record(self, description: String) -> ProjectRecord {
        ProjectRecord {
            score: self.score,
            name: self.name,
            url: self.url,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
            total_raise: self.total_raise,
            description,
        }
    }
}

/// A fully scraped project, as written to the output file.
///
/// Field order matches the JSON key order of the output array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProjectRecord {
    /// Free-form rating shown in the first listing column.
    pub score: String,
    /// Unique key across the whole collection.
    pub name: String,
    pub url: String,
    pub start_date: String,
    pub end_date: String,
    /// e.g. upcoming, active, ended.
    pub status: String,
    /// Display-formatted currency amount.
    pub total_raise: String,
    pub description: String,
}

/// Substitute the sentinel for empty text.
pub fn or_not_available(text: String) -> String {
    if text.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        text
    }
}
