// src/core/browser.rs
//! Browser session boundary and a plain HTTP implementation of it

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config_manager::BrowserConfig;
use crate::core::FsOps;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Acquires a fresh browser session.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// A scoped page session. Callers must `close` it on every exit path.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;
    async fn get_html(&mut self) -> Result<String>;
    async fn screenshot(&mut self, name: Option<&str>) -> Result<PathBuf>;
    async fn evaluate(&mut self, script: &str) -> Result<Value>;
    async fn close(&mut self) -> Result<()>;
}

// ===== HTTP Browser =====

/// Fetches pages over plain HTTP. Nothing is rendered, so there is no
/// display mode and `headless` has no effect on this session.
pub struct HttpBrowser {
    config: BrowserConfig,
    snapshot_dir: PathBuf,
}

impl HttpBrowser {
    pub fn new(config: BrowserConfig, snapshot_dir: PathBuf) -> Self {
        Self {
            config,
            snapshot_dir,
        }
    }
}

#[async_trait]
impl BrowserLauncher for HttpBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        info!("Starting HTTP browser session...");

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Box::new(HttpSession::new(client, self.snapshot_dir.clone())))
    }
}

pub struct HttpSession {
    client: Client,
    snapshot_dir: PathBuf,
    current_url: Option<String>,
    html: Option<String>,
}

impl HttpSession {
    fn new(client: Client, snapshot_dir: PathBuf) -> Self {
        Self {
            client,
            snapshot_dir,
            current_url: None,
            html: None,
        }
    }

    fn page(&self) -> Result<&str> {
        self.html
            .as_deref()
            .context("No page loaded; call navigate first")
    }

    fn snapshot_path(&self, name: Option<&str>) -> PathBuf {
        let file_name = match name {
            Some(name) => Path::new(name)
                .with_extension("html")
                .to_string_lossy()
                .into_owned(),
            None => FsOps::timestamped_name("snapshot", "html"),
        };
        self.snapshot_dir.join(file_name)
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        info!("Navigating to: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Navigation to {} failed with HTTP {}", url, status);
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .context("Failed to read page body")?;

        debug!("Page loaded: {} ({} bytes)", final_url, html.len());
        self.current_url = Some(final_url);
        self.html = Some(html);
        Ok(())
    }

    async fn get_html(&mut self) -> Result<String> {
        self.page().map(str::to_string)
    }

    /// Stores the current page markup; a plain HTTP session has no renderer.
    async fn screenshot(&mut self, name: Option<&str>) -> Result<PathBuf> {
        let html = self.page()?.to_string();
        let path = self.snapshot_path(name);
        FsOps::write_file_atomic(&path, &html).await?;
        info!("Page snapshot saved: {}", path.display());
        Ok(path)
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value> {
        match script.trim().trim_end_matches(';') {
            "document.title" => {
                let document = Html::parse_document(self.page()?);
                let selector = Selector::parse("title")
                    .map_err(|e| anyhow::anyhow!("Invalid selector: {}", e))?;
                let title = document
                    .select(&selector)
                    .next()
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .unwrap_or_default();
                Ok(Value::String(title))
            }
            "document.URL" | "window.location.href" | "location.href" => Ok(self
                .current_url
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null)),
            other => anyhow::bail!("Script evaluation is not supported by the HTTP browser: {}", other),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.current_url = None;
        self.html = None;
        info!("Browser closed");
        Ok(())
    }
}
