// src/core/llm_client.rs
//! Chat model boundary and the OpenAI-compatible HTTP client behind it

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::core::config_manager::LlmConfig;
use crate::types::response::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";

/// Stateless prompt-in, text-out model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, prompt: &str, system_message: Option<&str>) -> Result<String>;
}

pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GroqClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("GROQ_API_KEY is not configured")?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        info!(
            "LLM client initialized: {} (temp={})",
            config.model, config.temperature
        );

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    async fn chat(&self, prompt: &str, system_message: Option<&str>) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_message {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request = ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages,
        };

        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_ENDPOINT);
        debug!("Sending prompt to LLM (length={} chars)", prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to LLM API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("LLM API error {}: {}", status, error_text);
            anyhow::bail!("LLM API returned error {}: {}", status, error_text);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse LLM API response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("LLM API response contained no message")?;

        debug!("LLM response received (length={} chars)", content.len());
        Ok(content)
    }
}
