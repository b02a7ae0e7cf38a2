//! Core of the civic issue analyzer: the category catalog, prompt building,
//! validation of untrusted model answers, enrichment with routing metadata,
//! the analysis orchestrator and the district classifier. The HTTP service
//! pulls everything from this crate.

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod district;
pub mod enrich;
pub mod error;
pub mod json_relaxed;
pub mod model_client;
pub mod prompt;
pub mod severity;
pub mod validator;
