// src/cli.rs
//! Command line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use crate::core::{
    BrowserLauncher, ChatModel, EmailNotifier, GroqClient, HttpBrowser, Settings,
};
use crate::job_monitor::{JobMonitor, JobStore, MonitorRequest};
use crate::types::job::{JobListing, JobRun};
use crate::types::response::MonitorResult;

const NEW_JOBS_SHOWN: usize = 10;

#[derive(Parser)]
#[command(name = "job-scout")]
#[command(about = "Watch a job board and get notified about new, relevant postings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one monitoring pass
    Monitor {
        /// Search keywords (defaults to the configured keywords)
        #[arg(short, long)]
        keywords: Option<String>,
        /// Search location (defaults to the configured location)
        #[arg(short, long)]
        location: Option<String>,
        /// Free-text relevance criteria applied by the LLM
        #[arg(short, long)]
        filter: Option<String>,
        /// Do not send the email digest
        #[arg(long)]
        no_email: bool,
    },
    /// Validate the loaded configuration
    ConfigCheck,
    /// Show jobs from the latest run
    ShowJobs {
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
        /// List past runs instead of jobs
        #[arg(long)]
        history: bool,
    },
    /// Send a prompt to the LLM
    TestLlm {
        #[arg(short, long, default_value = "Say hello in one short sentence.")]
        prompt: String,
    },
    /// Fetch a page with the browser and snapshot it
    TestBrowser {
        #[arg(short, long, default_value = "https://www.indeed.com")]
        url: String,
    },
    /// Send a test email with the configured SMTP settings
    TestEmail,
}

pub async fn handle_command(cli: Cli, settings: Settings) -> Result<()> {
    match cli.command {
        Command::Monitor {
            keywords,
            location,
            filter,
            no_email,
        } => {
            let mut monitor = JobMonitor::from_settings(&settings).await?;
            let result = monitor
                .run(MonitorRequest {
                    keywords,
                    location,
                    filter_criteria: filter,
                    send_email: !no_email,
                })
                .await?;
            print_monitor_result(&result);
        }

        Command::ConfigCheck => {
            let problems = config_problems(&settings);
            print_config(&settings);
            if problems.is_empty() {
                println!("\n✅ Configuration looks good");
            } else {
                println!();
                for problem in &problems {
                    println!("❌ {}", problem);
                }
                anyhow::bail!("{} configuration problem(s) found", problems.len());
            }
        }

        Command::ShowJobs { limit, history } => {
            let store = JobStore::open(&settings.storage.data_dir).await;
            if history {
                print_history(store.history(), limit);
            } else {
                match store.latest() {
                    Some(run) => print_run(run, limit),
                    None => println!("No jobs stored yet. Run `job-scout monitor` first."),
                }
            }
            if let Some(last_run) = store.last_run() {
                println!("\nLast run: {}", last_run.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }

        Command::TestLlm { prompt } => {
            let client = GroqClient::new(&settings.llm)?;
            info!("Testing LLM with prompt: {}", prompt);
            let reply = client.chat(&prompt, None).await?;
            println!("✅ LLM replied:\n{}", reply.trim());
        }

        Command::TestBrowser { url } => {
            let browser = HttpBrowser::new(settings.browser.clone(), settings.screenshots_dir());
            let mut session = browser.launch().await?;

            let outcome = async {
                session.navigate(&url).await?;
                let title = session.evaluate("document.title").await?;
                let path = session.screenshot(Some("test_browser")).await?;
                Ok::<_, anyhow::Error>((title, path))
            }
            .await;

            if let Err(e) = session.close().await {
                warn!("Failed to close browser session: {:#}", e);
            }

            let (title, path) = outcome.with_context(|| format!("Browser test failed for {}", url))?;
            println!("✅ Loaded {}", url);
            println!("   Title: {}", title.as_str().unwrap_or_default());
            println!("   Snapshot: {}", path.display());
        }

        Command::TestEmail => {
            let notifier = EmailNotifier::new(settings.email.clone());
            let sent = notifier
                .send_plain(
                    "job-scout test email",
                    "This is a test message from job-scout. Email notifications are working.",
                )
                .await;
            if sent {
                println!("✅ Test email sent");
            } else {
                error!("Test email was not sent");
                anyhow::bail!("Test email was not sent; check the email settings");
            }
        }
    }

    Ok(())
}

// ===== Output =====

fn print_monitor_result(result: &MonitorResult) {
    println!("\n📊 Results");
    println!("   Total jobs found: {}", result.jobs.len());
    println!("   After filtering:  {}", result.filtered_jobs.len());
    println!("   New jobs:         {}", result.new_jobs.len());
    println!("   Email sent:       {}", if result.notified { "yes" } else { "no" });

    if !result.new_jobs.is_empty() {
        println!("\n🆕 New jobs");
        print_job_table(&result.new_jobs, NEW_JOBS_SHOWN);
    }

    println!("\n📝 Summary\n{}", result.summary);
}

fn print_run(run: &JobRun, limit: usize) {
    println!(
        "Latest run: {} ({} jobs, keywords: {})",
        run.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        run.count,
        run.keywords
    );
    print_job_table(&run.jobs, limit);
}

fn print_history(history: &[JobRun], limit: usize) {
    if history.is_empty() {
        println!("No runs recorded yet.");
        return;
    }
    println!("{:<22} {:>5}  Keywords", "Timestamp", "Jobs");
    for run in history.iter().rev().take(limit) {
        println!(
            "{:<22} {:>5}  {}",
            run.timestamp.format("%Y-%m-%d %H:%M:%S"),
            run.count,
            run.keywords
        );
    }
}

fn print_job_table(jobs: &[JobListing], limit: usize) {
    for line in job_table(jobs, limit) {
        println!("{}", line);
    }
}

fn job_table(jobs: &[JobListing], limit: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<3} {:<40} {:<25} {:<20} {:<6}",
        "#", "Title", "Company", "Location", "Apply"
    )];

    for (i, job) in jobs.iter().take(limit).enumerate() {
        lines.push(format!(
            "{:<3} {:<40} {:<25} {:<20} {:<6}",
            i + 1,
            clip(job.title_or_na(), 40),
            clip(job.company_or_na(), 25),
            clip(job.location_or_na(), 20),
            job.application_type
        ));
    }

    if jobs.len() > limit {
        lines.push(format!("... and {} more", jobs.len() - limit));
    }
    lines
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

// ===== Config Check =====

fn print_config(settings: &Settings) {
    println!("🔧 Configuration");
    println!(
        "   LLM:      {} @ {} (key: {})",
        settings.llm.model,
        settings.llm.base_url,
        if settings.llm.api_key.is_some() { "set" } else { "missing" }
    );
    println!(
        "   Search:   '{}' in '{}' (max {}) on {}",
        settings.search.keywords,
        settings.search.location,
        settings.search.max_results,
        settings.search.board_url
    );
    println!(
        "   Browser:  headless={} timeout={}ms settle={}s",
        settings.browser.headless, settings.browser.timeout_ms, settings.browser.settle_secs
    );
    println!(
        "   Email:    enabled={} via {}:{} to {}",
        settings.email.enabled,
        settings.email.smtp_host,
        settings.email.smtp_port,
        settings.email.email_to.as_deref().unwrap_or("-")
    );
    println!("   Data dir: {}", settings.storage.data_dir.display());
    println!("   Logs dir: {}", settings.storage.logs_dir.display());
}

fn config_problems(settings: &Settings) -> Vec<String> {
    let mut problems = Vec::new();

    if settings.llm.api_key.is_none() {
        problems.push("GROQ_API_KEY is not set".to_string());
    }
    if settings.keywords_list().is_empty() {
        problems.push("JOB_SEARCH_KEYWORDS is empty".to_string());
    }
    if settings.search.max_results == 0 {
        problems.push("JOB_MAX_RESULTS must be greater than zero".to_string());
    }
    if settings.email.enabled && !settings.email_ready() {
        problems.push(
            "Email is enabled but SMTP_USER, SMTP_PASSWORD or EMAIL_TO is missing".to_string(),
        );
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigManager;
    use crate::types::job::ApplicationType;

    #[test]
    fn test_monitor_arguments() {
        let cli = Cli::try_parse_from([
            "job-scout", "monitor", "-k", "rust developer", "-f", "remote only", "--no-email",
        ])
        .unwrap();

        match cli.command {
            Command::Monitor {
                keywords,
                location,
                filter,
                no_email,
            } => {
                assert_eq!(keywords.as_deref(), Some("rust developer"));
                assert!(location.is_none());
                assert_eq!(filter.as_deref(), Some("remote only"));
                assert!(no_email);
            }
            _ => panic!("expected monitor command"),
        }
    }

    #[test]
    fn test_show_jobs_defaults() {
        let cli = Cli::try_parse_from(["job-scout", "show-jobs"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::ShowJobs {
                limit: 10,
                history: false
            }
        ));
        assert!(Cli::try_parse_from(["job-scout", "unknown"]).is_err());
    }

    #[test]
    fn test_job_table_clips_and_counts_remainder() {
        let jobs: Vec<JobListing> = (0..3)
            .map(|i| JobListing {
                title: Some(format!("{} {}", "Very long title".repeat(5), i)),
                application_type: ApplicationType::Email,
                ..JobListing::default()
            })
            .collect();

        let lines = job_table(&jobs, 2);
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("..."));
        assert!(lines[1].contains("N/A"));
        assert!(lines[1].trim_end().ends_with("email"));
        assert_eq!(lines[3], "... and 1 more");
    }

    #[test]
    fn test_config_problems() {
        let settings = ConfigManager::from_sources(None, |_| None).unwrap();
        assert_eq!(config_problems(&settings), vec!["GROQ_API_KEY is not set"]);

        let settings = ConfigManager::from_sources(None, |key| match key {
            "GROQ_API_KEY" => Some("gsk_test".to_string()),
            "EMAIL_ENABLED" => Some("true".to_string()),
            _ => None,
        })
        .unwrap();
        let problems = config_problems(&settings);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("Email is enabled"));
    }
}
