// src/lib.rs
//! Job board monitor: scrapes search results, extracts and filters listings
//! with an LLM, remembers what was already seen and emails a digest of the rest.

pub mod cli;
pub mod core;
pub mod job_monitor;
pub mod types;

pub use crate::core::{ConfigManager, Settings};
pub use job_monitor::{JobMonitor, MonitorRequest};
pub use types::{JobListing, MonitorResult};
