// src/job_monitor/monitor.rs
//! Runs one monitoring pass: scrape, extract, filter, dedup, summarize,
//! persist, notify.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::extractor::JobExtractor;
use super::relevance::RelevanceFilter;
use super::store::JobStore;
use super::summarizer::Summarizer;
use super::url_builder::build_search_url;
use crate::core::config_manager::{SearchConfig, Settings};
use crate::core::{
    render_job_digest, BrowserLauncher, BrowserSession, ChatModel, EmailNotifier, GroqClient,
    HttpBrowser, Notifier,
};
use crate::types::job::JobListing;
use crate::types::response::MonitorResult;

pub const NO_JOBS_FOUND: &str = "No jobs found.";
const SNAPSHOT_NAME: &str = "search_results";

/// Per-run overrides; unset fields fall back to the configured search.
#[derive(Debug, Clone)]
pub struct MonitorRequest {
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub filter_criteria: Option<String>,
    pub send_email: bool,
}

impl Default for MonitorRequest {
    fn default() -> Self {
        Self {
            keywords: None,
            location: None,
            filter_criteria: None,
            send_email: true,
        }
    }
}

pub struct JobMonitor {
    search: SearchConfig,
    settle: Duration,
    browser: Arc<dyn BrowserLauncher>,
    extractor: JobExtractor,
    relevance: RelevanceFilter,
    summarizer: Summarizer,
    notifier: Arc<dyn Notifier>,
    store: JobStore,
}

impl JobMonitor {
    pub async fn new(
        settings: &Settings,
        llm: Arc<dyn ChatModel>,
        browser: Arc<dyn BrowserLauncher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = JobStore::open(&settings.storage.data_dir).await;

        Self {
            search: settings.search.clone(),
            settle: Duration::from_secs(settings.browser.settle_secs),
            browser,
            extractor: JobExtractor::new(
                llm.clone(),
                &settings.search.board_url,
                settings.search.max_results,
            ),
            relevance: RelevanceFilter::new(llm.clone()),
            summarizer: Summarizer::new(llm),
            notifier,
            store,
        }
    }

    /// Wire the monitor to the configured model, HTTP browser and SMTP notifier.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let llm: Arc<dyn ChatModel> =
            Arc::new(GroqClient::new(&settings.llm).context("Failed to initialize LLM client")?);
        let browser: Arc<dyn BrowserLauncher> = Arc::new(HttpBrowser::new(
            settings.browser.clone(),
            settings.screenshots_dir(),
        ));
        let notifier: Arc<dyn Notifier> = Arc::new(EmailNotifier::new(settings.email.clone()));

        Ok(Self::new(settings, llm, browser, notifier).await)
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub async fn run(&mut self, request: MonitorRequest) -> Result<MonitorResult> {
        let keywords = request
            .keywords
            .unwrap_or_else(|| self.search.keywords.clone());
        let location = request
            .location
            .unwrap_or_else(|| self.search.location.clone());

        info!(
            "Starting job monitoring: keywords='{}', location='{}'",
            keywords, location
        );

        let url = build_search_url(&self.search.board_url, &keywords, &location);
        let html = self.scrape(&url).await?;

        let all_jobs = self.extractor.extract(&html).await?;
        if all_jobs.is_empty() {
            warn!("No jobs extracted from page");
            return Ok(MonitorResult::empty(NO_JOBS_FOUND));
        }

        let filtered_jobs = match request.filter_criteria.as_deref() {
            Some(criteria) => self.relevance.filter(all_jobs.clone(), criteria).await?,
            None => all_jobs.clone(),
        };

        // Dedup runs on the filtered set: jobs dropped by the filter are
        // never marked seen and can come back on a later run.
        let new_jobs = self.store.get_new_jobs(&filtered_jobs);
        let summary = self.summarizer.summarize(&new_jobs).await?;

        self.store.save_jobs(filtered_jobs.clone(), &keywords).await?;
        self.store
            .mark_jobs_seen(filtered_jobs.iter().filter_map(|job| job.url.clone()))
            .await?;
        self.store.update_last_run().await?;

        let notified = self
            .notify(&new_jobs, &keywords, &summary, request.send_email)
            .await;

        Ok(MonitorResult {
            jobs: all_jobs,
            filtered_jobs,
            new_jobs,
            summary,
            notified,
        })
    }

    /// Fetch the page markup. The session is closed on every path.
    async fn scrape(&self, url: &str) -> Result<String> {
        let mut session = self
            .browser
            .launch()
            .await
            .context("Failed to start browser")?;

        let outcome = self.capture(session.as_mut(), url).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {:#}", e);
        }
        outcome
    }

    async fn capture(&self, session: &mut dyn BrowserSession, url: &str) -> Result<String> {
        session.navigate(url).await?;

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        session.screenshot(Some(SNAPSHOT_NAME)).await?;
        session.get_html().await
    }

    async fn notify(
        &self,
        new_jobs: &[JobListing],
        keywords: &str,
        summary: &str,
        send_email: bool,
    ) -> bool {
        if new_jobs.is_empty() {
            info!("No new jobs found");
            return false;
        }

        if !send_email {
            info!("Found {} new jobs (email disabled)", new_jobs.len());
            info!("Summary:\n{}", summary);
            return false;
        }

        let (subject, body) = render_job_digest(new_jobs, keywords, summary);
        self.notifier.send(&subject, &body).await
    }
}
