//! Page scrapers for the project listing site.
//!
//! Scraping happens in two phases per listing page:
//!
//! 1. **Listing**: load a page of the table and pull raw fields from each row
//! 2. **Detail**: visit each new project's page for its description
//!
//! Both phases degrade instead of failing: a listing page that cannot be
//! loaded ends pagination, and a detail page that cannot be read yields the
//! `N/A` sentinel.

pub mod detail;
pub mod listing;
