// src/job_monitor/testing.rs
//! Scripted collaborators for pipeline tests

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::core::{BrowserLauncher, BrowserSession, ChatModel, Notifier};
use crate::types::job::{ApplicationType, JobListing};

pub fn sample_job(n: usize) -> JobListing {
    let url = format!("https://www.indeed.com/viewjob?jk={}", n);
    JobListing {
        title: Some(format!("Job {}", n)),
        company: Some(format!("Company {}", n)),
        location: Some("Remote".to_string()),
        url: Some(url.clone()),
        application_type: ApplicationType::Url,
        application_target: Some(url),
        ..JobListing::default()
    }
}

// ===== Chat Model =====

pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([Err(message.to_string())])),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, prompt: &str, _system_message: Option<&str>) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => anyhow::bail!("{}", message),
            None => anyhow::bail!("no scripted reply left"),
        }
    }
}

// ===== Browser =====

#[derive(Default)]
pub struct BrowserLog {
    pub launched: usize,
    pub closed: usize,
    pub visited: Vec<String>,
    pub snapshots: Vec<String>,
}

pub struct StaticBrowser {
    html: String,
    fail_navigation: bool,
    pub log: Arc<Mutex<BrowserLog>>,
}

impl StaticBrowser {
    pub fn serving(html: &str) -> Arc<Self> {
        Arc::new(Self {
            html: html.to_string(),
            fail_navigation: false,
            log: Arc::new(Mutex::new(BrowserLog::default())),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            html: String::new(),
            fail_navigation: true,
            log: Arc::new(Mutex::new(BrowserLog::default())),
        })
    }
}

#[async_trait]
impl BrowserLauncher for StaticBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        self.log.lock().unwrap().launched += 1;
        Ok(Box::new(StaticSession {
            html: self.html.clone(),
            fail_navigation: self.fail_navigation,
            loaded: false,
            log: self.log.clone(),
        }))
    }
}

struct StaticSession {
    html: String,
    fail_navigation: bool,
    loaded: bool,
    log: Arc<Mutex<BrowserLog>>,
}

#[async_trait]
impl BrowserSession for StaticSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.log.lock().unwrap().visited.push(url.to_string());
        if self.fail_navigation {
            anyhow::bail!("net::ERR_NAME_NOT_RESOLVED");
        }
        self.loaded = true;
        Ok(())
    }

    async fn get_html(&mut self) -> Result<String> {
        if !self.loaded {
            anyhow::bail!("no page loaded");
        }
        Ok(self.html.clone())
    }

    async fn screenshot(&mut self, name: Option<&str>) -> Result<PathBuf> {
        let name = name.unwrap_or("snapshot").to_string();
        self.log.lock().unwrap().snapshots.push(name.clone());
        Ok(PathBuf::from(name))
    }

    async fn evaluate(&mut self, _script: &str) -> Result<Value> {
        Ok(Value::Null)
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }
}

// ===== Notifier =====

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, subject: &str, html_body: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), html_body.to_string()));
        true
    }
}
