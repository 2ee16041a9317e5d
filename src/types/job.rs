// src/types/job.rs
//! Job records shared by the pipeline, the store and the notifier

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder handed to the model for cards without an anchor.
pub const UNRESOLVED_URL: &str = "N/A";

// ===== Job Listing =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationType {
    Email,
    Url,
    #[default]
    Unknown,
}

impl ApplicationType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "email" | "e-mail" | "mail" => Self::Email,
            "url" | "website" | "web" | "link" => Self::Url,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Email => "email",
            Self::Url => "url",
            Self::Unknown => "unknown",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobListing {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary: Option<String>,
    pub posted_date: Option<String>,
    /// Identity key for deduplication, always absolute when present.
    pub url: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub application_type: ApplicationType,
    pub application_target: Option<String>,
}

impl JobListing {
    /// Build a listing from one element of the model's JSON array.
    ///
    /// Returns `None` for elements that are not objects. Everything else is
    /// normalized: blank strings become `None`, numbers are stringified,
    /// relative URLs are resolved against `origin`, and the
    /// application type/target pair is repaired so that an `email` type
    /// always carries an address.
    pub fn from_llm_value(value: &Value, origin: &str) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| object.get(key).and_then(text_field);

        let url = text("url").and_then(|raw| resolve_url(&raw, origin));

        let mut job = Self {
            title: text("title"),
            company: text("company"),
            location: text("location"),
            job_type: text("job_type"),
            salary: text("salary"),
            posted_date: text("posted_date"),
            url,
            description: text("description"),
            application_type: text("application_type")
                .map(|raw| ApplicationType::parse(&raw))
                .unwrap_or_default(),
            application_target: text("application_target"),
        };
        job.repair_application();
        Some(job)
    }

    /// Enforce the application type/target pairing.
    pub fn repair_application(&mut self) {
        if self.application_type == ApplicationType::Email
            && !self
                .application_target
                .as_deref()
                .is_some_and(|target| target.contains('@'))
        {
            self.application_type = ApplicationType::Url;
            self.application_target = None;
        }

        if self.application_type == ApplicationType::Url && self.application_target.is_none() {
            match &self.url {
                Some(url) => self.application_target = Some(url.clone()),
                None => self.application_type = ApplicationType::Unknown,
            }
        }
    }

    /// Whether the call-to-action should be a mail link.
    pub fn applies_by_email(&self) -> bool {
        self.application_type == ApplicationType::Email
            && self
                .application_target
                .as_deref()
                .is_some_and(|target| target.contains('@'))
    }

    pub fn title_or_na(&self) -> &str {
        self.title.as_deref().unwrap_or("N/A")
    }

    pub fn company_or_na(&self) -> &str {
        self.company.as_deref().unwrap_or("N/A")
    }

    pub fn location_or_na(&self) -> &str {
        self.location.as_deref().unwrap_or("N/A")
    }
}

fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Resolve a card href against the job board origin.
///
/// Returns `None` for the unresolved placeholder.
pub fn resolve_url(raw: &str, origin: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(UNRESOLVED_URL) {
        return None;
    }
    if raw.starts_with('/') && !raw.starts_with("//") {
        return Some(format!("{}{}", origin.trim_end_matches('/'), raw));
    }
    Some(raw.to_string())
}

// ===== Persisted Records =====

/// One pipeline execution's output, appended to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub keywords: String,
    pub count: usize,
    pub jobs: Vec<JobListing>,
}

impl JobRun {
    pub fn new(jobs: Vec<JobListing>, keywords: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            keywords: keywords.to_string(),
            count: jobs.len(),
            jobs,
        }
    }
}

/// Contents of `jobs.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobArchive {
    #[serde(default)]
    pub history: Vec<JobRun>,
    #[serde(default)]
    pub latest: Option<JobRun>,
}

/// Contents of `state.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeenState {
    #[serde(default)]
    pub seen_urls: BTreeSet<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub last_run: Option<DateTime<Utc>>,
}

// ===== Timestamps =====

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

/// A missing or unreadable `last_run` becomes `None` instead of rejecting
/// the whole state document.
fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const ORIGIN: &str = "https://www.indeed.com";

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("/viewjob?jk=1", ORIGIN),
            Some("https://www.indeed.com/viewjob?jk=1".to_string())
        );
        assert_eq!(
            resolve_url("https://example.com/a", ORIGIN),
            Some("https://example.com/a".to_string())
        );
        assert_eq!(resolve_url("N/A", ORIGIN), None);
        assert_eq!(resolve_url("  ", ORIGIN), None);
    }

    #[test]
    fn test_from_llm_value_normalizes_fields() {
        let value = json!({
            "title": "Rust Engineer",
            "company": "",
            "location": null,
            "salary": 120000,
            "url": "/viewjob?jk=abc",
            "description": "Build things",
            "application_type": "URL"
        });

        let job = JobListing::from_llm_value(&value, ORIGIN).unwrap();
        assert_eq!(job.title.as_deref(), Some("Rust Engineer"));
        assert_eq!(job.company, None);
        assert_eq!(job.location, None);
        assert_eq!(job.salary.as_deref(), Some("120000"));
        assert_eq!(
            job.url.as_deref(),
            Some("https://www.indeed.com/viewjob?jk=abc")
        );
        assert_eq!(job.application_type, ApplicationType::Url);
        assert_eq!(job.application_target, job.url);
    }

    #[test]
    fn test_email_without_address_is_repaired() {
        let value = json!({
            "url": "https://jobs.example.com/1",
            "application_type": "email",
            "application_target": "apply on our site"
        });
        let job = JobListing::from_llm_value(&value, ORIGIN).unwrap();
        assert_eq!(job.application_type, ApplicationType::Url);
        assert_eq!(
            job.application_target.as_deref(),
            Some("https://jobs.example.com/1")
        );

        let value = json!({ "application_type": "email", "application_target": null });
        let job = JobListing::from_llm_value(&value, ORIGIN).unwrap();
        assert_eq!(job.application_type, ApplicationType::Unknown);
        assert_eq!(job.application_target, None);
    }

    #[test]
    fn test_email_with_address_is_kept() {
        let value = json!({
            "url": "https://jobs.example.com/2",
            "application_type": "email",
            "application_target": "hr@example.com"
        });
        let job = JobListing::from_llm_value(&value, ORIGIN).unwrap();
        assert!(job.applies_by_email());
        assert_eq!(job.application_target.as_deref(), Some("hr@example.com"));
    }

    #[test]
    fn test_non_object_is_skipped() {
        assert!(JobListing::from_llm_value(&json!("job"), ORIGIN).is_none());
        assert!(JobListing::from_llm_value(&json!(3), ORIGIN).is_none());
    }

    #[test]
    fn test_archive_accepts_partial_files() {
        let archive: JobArchive = serde_json::from_str("{}").unwrap();
        assert!(archive.history.is_empty());
        assert!(archive.latest.is_none());

        let state: SeenState = serde_json::from_str(r#"{"seen_urls": ["a", "a", "b"]}"#).unwrap();
        assert_eq!(state.seen_urls.len(), 2);
        assert!(state.last_run.is_none());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = DateTime::parse_from_rfc3339("2025-01-01T12:00:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parse_timestamp("2025-01-01T12:00:00.123456"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-01T12:00:00.123456+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-01 12:00:00.123456"), Some(expected));
        assert!(parse_timestamp("2025-01-01T12:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_state_tolerates_naive_and_bad_last_run() {
        let state: SeenState = serde_json::from_str(
            r#"{"seen_urls": ["https://a"], "last_run": "2025-01-01T12:00:00.123456"}"#,
        )
        .unwrap();
        assert_eq!(state.seen_urls.len(), 1);
        assert!(state.last_run.is_some());

        for last_run in [r#""not a date""#, "42", "null"] {
            let raw = format!(r#"{{"seen_urls": ["https://a"], "last_run": {}}}"#, last_run);
            let state: SeenState = serde_json::from_str(&raw).unwrap();
            assert_eq!(state.seen_urls.len(), 1);
            assert!(state.last_run.is_none());
        }
    }

    #[test]
    fn test_run_accepts_naive_timestamp() {
        let archive: JobArchive = serde_json::from_str(
            r#"{"history": [{"timestamp": "2025-01-01T12:00:00.5", "keywords": "k", "count": 0, "jobs": []}]}"#,
        )
        .unwrap();
        assert_eq!(archive.history.len(), 1);
    }

    proptest! {
        #[test]
        fn test_application_target_invariant(
            kind in prop_oneof![
                Just("email".to_string()),
                Just("Email".to_string()),
                Just("url".to_string()),
                Just("website".to_string()),
                ".{0,12}",
            ],
            target in proptest::option::of(prop_oneof![
                "[a-z]{1,8}@[a-z]{1,8}\\.com",
                "https://[a-z]{1,8}\\.com/[a-z0-9]{0,6}",
                ".{0,20}",
            ]),
            url in proptest::option::of(prop_oneof![
                "/viewjob\\?jk=[0-9]{1,4}",
                "https://[a-z]{1,8}\\.com/[a-z0-9]{0,6}",
                Just(UNRESOLVED_URL.to_string()),
                Just(String::new()),
            ]),
        ) {
            let value = json!({
                "title": "Job",
                "url": url,
                "application_type": kind,
                "application_target": target,
            });
            let job = JobListing::from_llm_value(&value, ORIGIN).unwrap();

            if job.application_type == ApplicationType::Email {
                prop_assert!(job.application_target.as_deref().is_some_and(|t| t.contains('@')));
                prop_assert!(job.applies_by_email());
            }
            if job.application_type == ApplicationType::Url {
                prop_assert!(job.application_target.is_some());
            }
            if let Some(url) = job.url.as_deref() {
                prop_assert!(url.starts_with("http"));
            }
        }
    }
}
