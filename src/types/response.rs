// src/types/response.rs
use serde::{Deserialize, Serialize};

use crate::types::job::JobListing;

// ===== Model Reply Outcomes =====

/// Outcome of interpreting a model reply.
///
/// Each caller decides what `Unparsed` falls back to.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmParse<T> {
    Parsed(T),
    Unparsed(String),
}

impl<T> LlmParse<T> {
    pub fn unparsed(reason: impl Into<String>) -> Self {
        Self::Unparsed(reason.into())
    }

    pub fn unwrap_or_else(self, fallback: impl FnOnce(String) -> T) -> T {
        match self {
            Self::Parsed(value) => value,
            Self::Unparsed(reason) => fallback(reason),
        }
    }
}

// ===== Pipeline Results =====

/// Result record of one monitor run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorResult {
    pub jobs: Vec<JobListing>,
    pub filtered_jobs: Vec<JobListing>,
    pub new_jobs: Vec<JobListing>,
    pub summary: String,
    #[serde(default)]
    pub notified: bool,
}

impl MonitorResult {
    pub fn empty(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            ..Self::default()
        }
    }
}

// ===== LLM Wire Types =====

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatReply,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatReply {
    pub content: Option<String>,
}
