//! Output generation for scraped projects.
//!
//! # Submodules
//!
//! - [`json`]: the incrementally rewritten `project_list.json`
//! - [`digest`]: optional Markdown summary written once the run ends

pub mod digest;
pub mod json;
