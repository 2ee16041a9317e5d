// src/core/mod.rs
//! Configuration, file system helpers and the collaborator boundaries

pub mod browser;
pub mod config_manager;
pub mod fs_ops;
pub mod llm_client;
pub mod notifier;

pub use browser::{BrowserLauncher, BrowserSession, HttpBrowser};
pub use config_manager::{ConfigManager, Settings};
pub use fs_ops::FsOps;
pub use llm_client::{ChatModel, GroqClient};
pub use notifier::{render_job_digest, EmailNotifier, Notifier};
