// src/core/notifier.rs
//! Notification boundary, SMTP delivery and the job digest email

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{error, info};

use crate::core::config_manager::EmailConfig;
use crate::types::job::JobListing;

/// Delivers a notification. Never fails loudly: returns whether it was sent.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, html_body: &str) -> bool;
}

pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a plain-text message, used to check the SMTP setup.
    pub async fn send_plain(&self, subject: &str, body: &str) -> bool {
        self.dispatch(subject, body, ContentType::TEXT_PLAIN).await
    }

    async fn dispatch(&self, subject: &str, body: &str, content_type: ContentType) -> bool {
        if !self.config.enabled {
            info!("Email disabled, printing to console instead:");
            Self::log_fallback(subject, body);
            return false;
        }

        if !self.config.is_complete() {
            error!("Email configuration incomplete, cannot send email");
            Self::log_fallback(subject, body);
            return false;
        }

        match self.deliver(subject, body, content_type).await {
            Ok(()) => {
                info!("Email sent successfully");
                true
            }
            Err(e) => {
                error!("Failed to send email: {:#}", e);
                Self::log_fallback(subject, body);
                false
            }
        }
    }

    async fn deliver(&self, subject: &str, body: &str, content_type: ContentType) -> Result<()> {
        let message = self.build_message(subject, body, content_type)?;
        let transport = self.build_transport()?;

        info!(
            "Sending email to {}...",
            self.config.email_to.as_deref().unwrap_or_default()
        );

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .context("Email task failed to execute")?
            .context("SMTP transport error")?;
        Ok(())
    }

    fn build_message(&self, subject: &str, body: &str, content_type: ContentType) -> Result<Message> {
        let from: Mailbox = self
            .config
            .sender()
            .context("No sender address configured")?
            .parse()
            .context("Invalid sender address")?;
        let to: Mailbox = self
            .config
            .email_to
            .as_deref()
            .context("No recipient address configured")?
            .parse()
            .context("Invalid recipient address")?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(content_type)
            .body(body.to_string())
            .context("Failed to build email message")
    }

    fn build_transport(&self) -> Result<SmtpTransport> {
        let user = self.config.smtp_user.clone().unwrap_or_default();
        let password = self.config.smtp_password.clone().unwrap_or_default();

        Ok(SmtpTransport::starttls_relay(&self.config.smtp_host)
            .with_context(|| format!("Invalid SMTP host: {}", self.config.smtp_host))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(user, password))
            .build())
    }

    fn log_fallback(subject: &str, body: &str) {
        info!("Subject: {}", subject);
        info!("Body:\n{}", body);
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, subject: &str, html_body: &str) -> bool {
        self.dispatch(subject, html_body, ContentType::TEXT_HTML).await
    }
}

// ===== Digest Rendering =====

/// Subject line and HTML body for a batch of new jobs.
pub fn render_job_digest(jobs: &[JobListing], keywords: &str, summary: &str) -> (String, String) {
    let subject = format!("🔔 {} New Job(s) Found - {}", jobs.len(), keywords);

    let mut body = String::from(
        r#"<html>
<head>
<style>
  body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
  .header { background: #667eea; color: white; padding: 20px; border-radius: 8px; }
  .summary { white-space: pre-wrap; margin: 15px 0; }
  .job { background: #f8f9fa; padding: 15px; margin: 15px 0; border-left: 4px solid #667eea; border-radius: 4px; }
  .job-title { font-size: 18px; font-weight: bold; color: #2c3e50; }
  .company { color: #7f8c8d; font-size: 14px; }
  .details { margin: 10px 0; font-size: 14px; }
  .label { font-weight: bold; color: #34495e; }
  .button { background-color: #667eea; color: white; padding: 10px 15px; border-radius: 5px; text-decoration: none; display: inline-block; }
  .footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd; color: #7f8c8d; font-size: 12px; }
</style>
</head>
<body>
"#,
    );

    body.push_str(&format!(
        "<div class=\"header\">\n<h1>New Job Opportunities Found!</h1>\n<p>Found {} new job(s) matching: <strong>{}</strong></p>\n<p>{}</p>\n</div>\n",
        jobs.len(),
        escape_html(keywords),
        chrono::Local::now().format("%B %d, %Y at %I:%M %p")
    ));

    if !summary.trim().is_empty() {
        body.push_str(&format!(
            "<div class=\"summary\">{}</div>\n",
            escape_html(summary.trim())
        ));
    }

    for (i, job) in jobs.iter().enumerate() {
        body.push_str(&render_job(i + 1, job));
    }

    body.push_str(
        "<div class=\"footer\">\n<p>This email was generated automatically by job-scout.</p>\n<p>To stop receiving these notifications, disable email in your configuration.</p>\n</div>\n</body>\n</html>\n",
    );

    (subject, body)
}

fn render_job(index: usize, job: &JobListing) -> String {
    let title = escape_html(job.title_or_na());
    let url = job.url.as_deref().unwrap_or("#");

    let call_to_action = if job.applies_by_email() {
        let address = job.application_target.as_deref().unwrap_or_default();
        let subject = urlencoding::encode(&format!("Application for {}", job.title_or_na())).into_owned();
        format!(
            "<a class=\"button\" href=\"mailto:{}?subject={}\">Apply via Email</a>\n<div style=\"margin-top: 8px; font-size: 12px;\"><a href=\"{}\" target=\"_blank\">View Job Details</a></div>",
            escape_html(address),
            escape_html(&subject),
            escape_html(url)
        )
    } else {
        let target = job.application_target.as_deref().unwrap_or(url);
        format!(
            "<a class=\"button\" href=\"{}\" target=\"_blank\">Apply on Website</a>",
            escape_html(target)
        )
    };

    format!(
        r#"<div class="job">
  <div class="job-title">{index}. {title}</div>
  <div class="company">{company}</div>
  <div class="details">
    <span class="label">Location:</span> {location} &nbsp;|&nbsp;
    <span class="label">Type:</span> {job_type} &nbsp;|&nbsp;
    <span class="label">Salary:</span> {salary}
  </div>
  <div class="details"><span class="label">Posted:</span> {posted}</div>
  <div class="details"><p>{description}</p></div>
  <div style="margin-top: 15px;">
    {call_to_action}
  </div>
</div>
"#,
        index = index,
        title = title,
        company = escape_html(job.company_or_na()),
        location = escape_html(job.location_or_na()),
        job_type = escape_html(job.job_type.as_deref().unwrap_or("N/A")),
        salary = escape_html(job.salary.as_deref().unwrap_or("Not specified")),
        posted = escape_html(job.posted_date.as_deref().unwrap_or("N/A")),
        description = escape_html(
            job.description
                .as_deref()
                .unwrap_or("No description available")
        ),
        call_to_action = call_to_action,
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::job::ApplicationType;

    fn job(application_type: ApplicationType, target: Option<&str>) -> JobListing {
        JobListing {
            title: Some("Rust <Dev>".to_string()),
            company: Some("Acme".to_string()),
            url: Some("https://www.indeed.com/viewjob?jk=1".to_string()),
            application_type,
            application_target: target.map(str::to_string),
            ..JobListing::default()
        }
    }

    #[test]
    fn test_digest_subject_and_escaping() {
        let jobs = vec![job(ApplicationType::Url, None)];
        let (subject, body) = render_job_digest(&jobs, "rust developer", "One great role.");

        assert_eq!(subject, "🔔 1 New Job(s) Found - rust developer");
        assert!(body.contains("Rust &lt;Dev&gt;"));
        assert!(body.contains("One great role."));
        assert!(body.contains("Not specified"));
    }

    #[test]
    fn test_email_call_to_action_requires_address() {
        let with_address = job(ApplicationType::Email, Some("hr@acme.com"));
        let (_, body) = render_job_digest(&[with_address], "rust", "");
        assert!(body.contains(
            "href=\"mailto:hr@acme.com?subject=Application%20for%20Rust%20%3CDev%3E\""
        ));

        // Constructed directly, bypassing the extraction repair.
        let without_address = job(ApplicationType::Email, Some("see website"));
        let (_, body) = render_job_digest(&[without_address], "rust", "");
        assert!(!body.contains("mailto:"));
        assert!(body.contains("Apply on Website"));
    }

    #[test]
    fn test_website_call_to_action_falls_back_to_job_url() {
        let (_, body) = render_job_digest(&[job(ApplicationType::Unknown, None)], "rust", "");
        assert!(body.contains("href=\"https://www.indeed.com/viewjob?jk=1\""));
    }

    #[tokio::test]
    async fn test_disabled_notifier_returns_false() {
        let notifier = EmailNotifier::new(EmailConfig::default());
        assert!(!notifier.send("subject", "<p>body</p>").await);
    }

    #[tokio::test]
    async fn test_incomplete_credentials_return_false() {
        let notifier = EmailNotifier::new(EmailConfig {
            enabled: true,
            ..EmailConfig::default()
        });
        assert!(!notifier.send_plain("subject", "body").await);
    }
}
