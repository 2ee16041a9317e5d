// src/job_monitor/summarizer.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use super::prompts;
use crate::core::ChatModel;
use crate::types::job::JobListing;

pub const NO_JOBS_SUMMARY: &str = "No jobs found matching your criteria.";

pub struct Summarizer {
    llm: Arc<dyn ChatModel>,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }

    /// Prose digest of the listings. Model failures are returned to the caller.
    pub async fn summarize(&self, jobs: &[JobListing]) -> Result<String> {
        if jobs.is_empty() {
            return Ok(NO_JOBS_SUMMARY.to_string());
        }

        info!("Generating summary for {} jobs...", jobs.len());

        let jobs_json =
            serde_json::to_string_pretty(jobs).context("Failed to serialize jobs for summary")?;
        let summary = self
            .llm
            .chat(&prompts::summary_prompt(&jobs_json), None)
            .await
            .context("Failed to generate job summary")?;

        Ok(summary.trim().to_string())
    }
}
