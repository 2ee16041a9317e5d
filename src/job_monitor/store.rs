// src/job_monitor/store.rs
//! Persistent seen-set and run history.
//!
//! Both files are read once at open and rewritten whole on every mutation.
//! Nothing is locked: one pipeline run at a time is assumed.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::FsOps;
use crate::types::job::{JobArchive, JobListing, JobRun, SeenState};

pub const JOBS_FILE: &str = "jobs.json";
pub const STATE_FILE: &str = "state.json";

pub struct JobStore {
    jobs_path: PathBuf,
    state_path: PathBuf,
    archive: JobArchive,
    state: SeenState,
}

impl JobStore {
    /// Load both collections from `data_dir`.
    ///
    /// Missing or unreadable files start empty rather than failing.
    pub async fn open(data_dir: &Path) -> Self {
        let jobs_path = data_dir.join(JOBS_FILE);
        let state_path = data_dir.join(STATE_FILE);

        let archive: JobArchive = FsOps::read_json_or_default(&jobs_path).await;
        let state: SeenState = FsOps::read_json_or_default(&state_path).await;

        debug!(
            "Store opened: {} runs, {} seen URLs",
            archive.history.len(),
            state.seen_urls.len()
        );

        Self {
            jobs_path,
            state_path,
            archive,
            state,
        }
    }

    /// Jobs whose URL has not been seen. Jobs without a URL are always new.
    pub fn get_new_jobs(&self, jobs: &[JobListing]) -> Vec<JobListing> {
        let new_jobs: Vec<JobListing> = jobs
            .iter()
            .filter(|job| match &job.url {
                Some(url) => !self.state.seen_urls.contains(url),
                None => true,
            })
            .cloned()
            .collect();

        info!("Found {} new jobs out of {} total", new_jobs.len(), jobs.len());
        new_jobs
    }

    /// Add URLs to the seen-set and persist it.
    pub async fn mark_jobs_seen<I, S>(&mut self, urls: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for url in urls {
            let url: String = url.into();
            if !url.is_empty() && self.state.seen_urls.insert(url) {
                added += 1;
            }
        }

        if added == 0 {
            debug!("No new URLs to mark as seen");
            return Ok(());
        }

        FsOps::write_json(&self.state_path, &self.state).await?;
        debug!("Marked {} jobs as seen", added);
        Ok(())
    }

    /// Append a run to history and make it the latest.
    pub async fn save_jobs(&mut self, jobs: Vec<JobListing>, keywords: &str) -> Result<()> {
        let run = JobRun::new(jobs, keywords);
        let count = run.count;

        self.archive.history.push(run.clone());
        self.archive.latest = Some(run);
        FsOps::write_json(&self.jobs_path, &self.archive).await?;

        info!("Saved {} jobs to storage", count);
        Ok(())
    }

    pub async fn update_last_run(&mut self) -> Result<()> {
        self.state.last_run = Some(Utc::now());
        FsOps::write_json(&self.state_path, &self.state).await
    }

    pub fn latest(&self) -> Option<&JobRun> {
        self.archive.latest.as_ref()
    }

    pub fn history(&self) -> &[JobRun] {
        &self.archive.history
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.state.last_run
    }

    pub fn seen_urls(&self) -> &BTreeSet<String> {
        &self.state.seen_urls
    }
}
