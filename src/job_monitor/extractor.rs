// src/job_monitor/extractor.rs
//! Turns raw search-page markup into job listings with the chat model.
//!
//! Each candidate card is handed to the model together with the URL we
//! resolved for it, so the model copies a known URL instead of inventing one.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::prompts;
use crate::core::ChatModel;
use crate::types::job::{resolve_url, JobListing, UNRESOLVED_URL};
use crate::types::response::LlmParse;

/// Upper bound on cards sent to the model.
pub const MAX_JOB_CARDS: usize = 20;
/// Upper bound on markup characters per card.
pub const MAX_CARD_CHARS: usize = 1000;

pub struct JobExtractor {
    llm: Arc<dyn ChatModel>,
    origin: String,
    max_results: usize,
}

impl JobExtractor {
    pub fn new(llm: Arc<dyn ChatModel>, origin: &str, max_results: usize) -> Self {
        Self {
            llm,
            origin: origin.trim_end_matches('/').to_string(),
            max_results,
        }
    }

    /// Extract listings from a page.
    ///
    /// A reply without a usable JSON array yields an empty list; only
    /// transport failures from the model are errors.
    pub async fn extract(&self, html: &str) -> Result<Vec<JobListing>> {
        info!("Extracting jobs from HTML using LLM...");

        let blocks = build_job_blocks(html, &self.origin);
        if blocks.is_empty() {
            warn!("No job cards found in page markup");
            return Ok(Vec::new());
        }

        let prompt = prompts::extraction_prompt(&blocks.join("\n"));
        let response = self.llm.chat(&prompt, None).await?;

        let jobs = self
            .parse_response(&response)
            .unwrap_or_else(|reason| {
                warn!("Could not parse extraction reply: {}", reason);
                debug!("LLM response: {}", truncate_chars(&response, 500));
                Vec::new()
            });

        info!("Extracted {} jobs from HTML", jobs.len());
        Ok(jobs)
    }

    /// Parse the outermost JSON array in a model reply.
    pub fn parse_response(&self, response: &str) -> LlmParse<Vec<JobListing>> {
        let (start, end) = match (response.find('['), response.rfind(']')) {
            (Some(start), Some(end)) if end > start => (start, end),
            _ => return LlmParse::unparsed("no JSON array found in reply"),
        };

        let items: Vec<Value> = match serde_json::from_str(&response[start..=end]) {
            Ok(items) => items,
            Err(e) => return LlmParse::unparsed(format!("invalid JSON array: {}", e)),
        };

        let mut jobs: Vec<JobListing> = items
            .iter()
            .filter_map(|item| JobListing::from_llm_value(item, &self.origin))
            .collect();

        if jobs.len() > self.max_results {
            debug!("Capping {} jobs at {}", jobs.len(), self.max_results);
            jobs.truncate(self.max_results);
        }

        LlmParse::Parsed(jobs)
    }
}

/// Build the `JOB i` blocks for the candidate cards of a page.
pub fn build_job_blocks(html: &str, origin: &str) -> Vec<String> {
    let mut document = Html::parse_document(html);
    strip_non_content(&mut document);

    let (Ok(card_selector), Ok(link_selector)) =
        (Selector::parse("div[class]"), Selector::parse("a[href]"))
    else {
        return Vec::new();
    };

    let cards: Vec<ElementRef> = document
        .select(&card_selector)
        .filter(|el| {
            el.value()
                .attr("class")
                .is_some_and(|class| class.to_lowercase().contains("job"))
        })
        .collect();

    info!("Found {} job cards in HTML", cards.len());

    cards
        .into_iter()
        .take(MAX_JOB_CARDS)
        .enumerate()
        .map(|(i, card)| {
            let url = card
                .select(&link_selector)
                .next()
                .and_then(|link| link.value().attr("href"))
                .and_then(|href| resolve_url(href, origin))
                .unwrap_or_else(|| UNRESOLVED_URL.to_string());

            format!(
                "\nJOB {}:\nURL: {}\nHTML:\n{}\n---",
                i + 1,
                url,
                truncate_chars(&card.html(), MAX_CARD_CHARS)
            )
        })
        .collect()
}

fn strip_non_content(document: &mut Html) {
    let Ok(selector) = Selector::parse("script, style, noscript") else {
        return;
    };
    let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
