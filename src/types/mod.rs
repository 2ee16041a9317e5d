// src/types/mod.rs
pub mod job;
pub mod response;

pub use job::{ApplicationType, JobArchive, JobListing, JobRun, SeenState};
pub use response::{LlmParse, MonitorResult};
