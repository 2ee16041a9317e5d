// src/core/config_manager.rs
//! Configuration loading: defaults, then `config.yaml`, then `.env` and the
//! process environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::FsOps;

const CONFIG_FILE: &str = "config.yaml";
const CONFIG_PATH_VAR: &str = "JOB_SCOUT_CONFIG";

// ===== Settings =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmConfig,
    pub email: EmailConfig,
    pub browser: BrowserConfig,
    pub search: SearchConfig,
    pub storage: StorageConfig,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            temperature: 0.1,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub email_from: Option<String>,
    pub email_to: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_user: None,
            smtp_password: None,
            email_from: None,
            email_to: None,
        }
    }
}

impl EmailConfig {
    /// Sender address, falling back to the SMTP user.
    pub fn sender(&self) -> Option<&str> {
        self.email_from.as_deref().or(self.smtp_user.as_deref())
    }

    /// All credentials and addresses required for sending are present.
    pub fn is_complete(&self) -> bool {
        self.smtp_user.is_some()
            && self.smtp_password.is_some()
            && self.sender().is_some()
            && self.email_to.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Navigation timeout in milliseconds.
    pub timeout_ms: u64,
    /// Pause after navigation before the page is read.
    pub settle_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_ms: 30_000,
            settle_secs: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub keywords: String,
    pub location: String,
    pub max_results: usize,
    pub board_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: "python developer,software engineer".to_string(),
            location: "remote".to_string(),
            max_results: 20,
            board_url: "https://www.indeed.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            logs_dir: PathBuf::from("./logs"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogLevel(pub String);

impl Default for LogLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl Settings {
    /// Search keywords split on commas.
    pub fn keywords_list(&self) -> Vec<String> {
        self.search
            .keywords
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }

    pub fn email_ready(&self) -> bool {
        self.email.is_complete()
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.storage.data_dir.join("screenshots")
    }
}

// ===== Loading =====

pub struct ConfigManager;

impl ConfigManager {
    /// Load settings from `config.yaml` (optional), `.env` and the environment.
    pub fn load() -> Result<Settings> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();

        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));

        let yaml = Self::read_config_file(&path)?;
        let settings = Self::from_sources(yaml.as_deref(), |key| std::env::var(key).ok())?;

        info!(
            "Configuration loaded (data dir: {})",
            settings.storage.data_dir.display()
        );
        Ok(settings)
    }

    fn read_config_file(path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        info!("Reading configuration file: {}", path.display());
        std::fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Build settings from an optional YAML document and an environment lookup.
    pub fn from_sources<F>(yaml: Option<&str>, env: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match yaml {
            Some(content) if !content.trim().is_empty() => {
                serde_yaml::from_str::<Settings>(content).context("Failed to parse config.yaml")?
            }
            _ => Settings::default(),
        };

        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("GROQ_API_KEY") {
            settings.llm.api_key = Some(v);
        }
        if let Some(v) = var("LLM_MODEL") {
            settings.llm.model = v;
        }
        if let Some(v) = var("LLM_BASE_URL") {
            settings.llm.base_url = v;
        }
        if let Some(v) = var("LLM_TEMPERATURE") {
            settings.llm.temperature = parse_number("LLM_TEMPERATURE", &v)?;
        }

        if let Some(v) = var("EMAIL_ENABLED") {
            settings.email.enabled = parse_bool("EMAIL_ENABLED", &v)?;
        }
        if let Some(v) = var("SMTP_HOST") {
            settings.email.smtp_host = v;
        }
        if let Some(v) = var("SMTP_PORT") {
            settings.email.smtp_port = parse_number("SMTP_PORT", &v)?;
        }
        if let Some(v) = var("SMTP_USER") {
            settings.email.smtp_user = Some(v);
        }
        if let Some(v) = var("SMTP_PASSWORD") {
            settings.email.smtp_password = Some(v);
        }
        if let Some(v) = var("EMAIL_FROM") {
            settings.email.email_from = Some(v);
        }
        if let Some(v) = var("EMAIL_TO") {
            settings.email.email_to = Some(v);
        }

        if let Some(v) = var("BROWSER_HEADLESS") {
            settings.browser.headless = parse_bool("BROWSER_HEADLESS", &v)?;
        }
        if let Some(v) = var("BROWSER_TIMEOUT") {
            settings.browser.timeout_ms = parse_number("BROWSER_TIMEOUT", &v)?;
        }
        if let Some(v) = var("PAGE_SETTLE_SECS") {
            settings.browser.settle_secs = parse_number("PAGE_SETTLE_SECS", &v)?;
        }

        if let Some(v) = var("JOB_SEARCH_KEYWORDS") {
            settings.search.keywords = v;
        }
        if let Some(v) = var("JOB_LOCATION") {
            settings.search.location = v;
        }
        if let Some(v) = var("JOB_MAX_RESULTS") {
            settings.search.max_results = parse_number("JOB_MAX_RESULTS", &v)?;
        }
        if let Some(v) = var("JOB_BOARD_URL") {
            settings.search.board_url = v;
        }

        if let Some(v) = var("DATA_DIR") {
            settings.storage.data_dir = PathBuf::from(v);
        }
        if let Some(v) = var("LOGS_DIR") {
            settings.storage.logs_dir = PathBuf::from(v);
        }
        if let Some(v) = var("LOG_LEVEL") {
            settings.log_level = LogLevel(v.to_lowercase());
        }

        Ok(settings)
    }

    /// Ensure the data and logs directories exist
    pub async fn ensure_directories(settings: &Settings) -> Result<()> {
        FsOps::ensure_dir_exists(&settings.storage.data_dir).await?;
        FsOps::ensure_dir_exists(&settings.storage.logs_dir).await?;
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{} must be a boolean, got '{}'", key, other),
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("{} must be a number, got '{}'", key, value))
}
