// src/job_monitor/relevance.rs
//! Narrows listings to those matching free-text criteria.
//!
//! Ambiguous replies keep every job: dropping jobs over a parsing problem is
//! worse than sending an unfiltered digest.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::prompts;
use crate::core::ChatModel;
use crate::types::job::JobListing;
use crate::types::response::LlmParse;

const DESCRIPTION_PREVIEW_CHARS: usize = 200;

pub struct RelevanceFilter {
    llm: Arc<dyn ChatModel>,
}

impl RelevanceFilter {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }

    pub async fn filter(&self, jobs: Vec<JobListing>, criteria: &str) -> Result<Vec<JobListing>> {
        let criteria = criteria.trim();
        if criteria.is_empty() || jobs.is_empty() {
            return Ok(jobs);
        }

        info!("Filtering {} jobs with criteria: {}", jobs.len(), criteria);

        let prompt = prompts::filter_prompt(criteria, &describe_jobs(&jobs));
        let response = self.llm.chat(&prompt, None).await?;

        match parse_selection(&response, jobs.len()) {
            LlmParse::Parsed(indices) => {
                if indices.is_empty() {
                    info!("No jobs matched criteria");
                }
                let filtered: Vec<JobListing> =
                    indices.into_iter().map(|i| jobs[i].clone()).collect();
                info!("Filtered to {} relevant jobs", filtered.len());
                Ok(filtered)
            }
            LlmParse::Unparsed(reason) => {
                warn!(
                    "Failed to parse filter response, returning all jobs: {}",
                    reason
                );
                debug!("Filter response: {}", response);
                Ok(jobs)
            }
        }
    }
}

/// Numbered listing shown to the model, one job per entry.
pub fn describe_jobs(jobs: &[JobListing]) -> String {
    jobs.iter()
        .enumerate()
        .map(|(i, job)| {
            let mut line = format!(
                "{}. {} at {} - {}",
                i + 1,
                job.title_or_na(),
                job.company_or_na(),
                job.location_or_na()
            );
            if let Some(description) = job.description.as_deref() {
                let preview: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
                line.push_str("\n   ");
                line.push_str(&preview);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Interpret the filter reply as zero-based indices into a list of `job_count` jobs.
///
/// `none` anywhere in the reply selects nothing. Otherwise comma-separated
/// 1-based numbers are kept in reply order; out-of-range and repeated numbers
/// are dropped. A reply with no usable number, or a malformed numeric token,
/// is `Unparsed`.
pub fn parse_selection(response: &str, job_count: usize) -> LlmParse<Vec<usize>> {
    if response.to_lowercase().contains("none") {
        return LlmParse::Parsed(Vec::new());
    }

    let mut numbers = Vec::new();
    for token in response.split(',').map(str::trim) {
        let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() || !compact.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        // "1 2" looks numeric once spaces are ignored but is not one number.
        match token.parse::<usize>() {
            Ok(n) => numbers.push(n),
            Err(e) => return LlmParse::unparsed(format!("bad index '{}': {}", token, e)),
        }
    }

    if numbers.is_empty() {
        return LlmParse::unparsed("no job numbers in reply");
    }

    let mut indices: Vec<usize> = Vec::with_capacity(numbers.len());
    for n in numbers {
        if n == 0 || n > job_count {
            continue;
        }
        let index = n - 1;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    LlmParse::Parsed(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_monitor::testing::{sample_job, ScriptedModel};

    fn jobs(n: usize) -> Vec<JobListing> {
        (1..=n).map(sample_job).collect()
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1, 3", 3), LlmParse::Parsed(vec![0, 2]));
        assert_eq!(parse_selection(" 2 ,1,2 ", 3), LlmParse::Parsed(vec![1, 0]));
        assert_eq!(parse_selection("1, 7, 0", 3), LlmParse::Parsed(vec![0]));
        assert_eq!(parse_selection("None of these match.", 3), LlmParse::Parsed(vec![]));
        assert_eq!(parse_selection("NONE", 3), LlmParse::Parsed(vec![]));
        assert_eq!(parse_selection("99", 3), LlmParse::Parsed(vec![]));
    }

    #[test]
    fn test_parse_selection_unparsed() {
        assert!(matches!(parse_selection("", 3), LlmParse::Unparsed(_)));
        assert!(matches!(parse_selection("the first and third", 3), LlmParse::Unparsed(_)));
        assert!(matches!(parse_selection("1 2", 3), LlmParse::Unparsed(_)));
        assert!(matches!(
            parse_selection("99999999999999999999999", 3),
            LlmParse::Unparsed(_)
        ));
    }

    #[test]
    fn test_describe_jobs_truncates_description() {
        let mut job = sample_job(1);
        job.description = Some("d".repeat(500));
        let text = describe_jobs(&[job, sample_job(2)]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "1. Job 1 at Company 1 - Remote");
        assert_eq!(lines[1].trim().len(), DESCRIPTION_PREVIEW_CHARS);
        assert!(lines[2].starts_with("2. Job 2 at Company 2"));
    }

    #[tokio::test]
    async fn test_empty_criteria_or_jobs_skip_model() {
        let model = ScriptedModel::new(&[]);
        let filter = RelevanceFilter::new(model.clone());

        assert_eq!(filter.filter(jobs(2), "  ").await.unwrap(), jobs(2));
        assert!(filter.filter(Vec::new(), "remote only").await.unwrap().is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_filter_selects_in_reply_order() {
        let model = ScriptedModel::new(&["3, 1"]);
        let filter = RelevanceFilter::new(model.clone());

        let filtered = filter.filter(jobs(3), "senior roles").await.unwrap();
        assert_eq!(filtered, vec![sample_job(3), sample_job(1)]);
        assert!(model.prompts()[0].contains("Criteria: senior roles"));
    }

    #[tokio::test]
    async fn test_filter_none_returns_empty() {
        let filter = RelevanceFilter::new(ScriptedModel::new(&["none"]));
        assert!(filter.filter(jobs(3), "python").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_fails_open_on_malformed_replies() {
        for reply in ["", "garbage!!", "I think job two", "1 2", "??, ??"] {
            let filter = RelevanceFilter::new(ScriptedModel::new(&[reply]));
            let filtered = filter.filter(jobs(4), "rust").await.unwrap();
            assert_eq!(filtered, jobs(4), "reply {:?} should keep all jobs", reply);
        }
    }

    #[tokio::test]
    async fn test_filter_propagates_transport_errors() {
        let filter = RelevanceFilter::new(ScriptedModel::failing("timeout"));
        assert!(filter.filter(jobs(2), "rust").await.is_err());
    }
}
