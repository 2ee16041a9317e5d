// src/job_monitor/mod.rs
//! Job board monitoring pipeline

pub mod extractor;
pub mod monitor;
pub mod prompts;
pub mod relevance;
pub mod store;
pub mod summarizer;
pub mod url_builder;

#[cfg(test)]
mod testing;

pub use extractor::JobExtractor;
pub use monitor::{JobMonitor, MonitorRequest};
pub use relevance::RelevanceFilter;
pub use store::JobStore;
pub use summarizer::Summarizer;
pub use url_builder::build_search_url;
