use super::message;
use super::types::{FailureRecord, RunReport};
use crate::utils::config::NotifyConfig;
use anyhow::{anyhow, Context, Result};
use serde_json::json;

const SLACK_UPLOAD_URL: &str = "https://slack.com/api/files.upload";
const SLACK_UPLOAD_CHANNEL: &str = "#general";

/// Posts the run summary to whichever chat targets the environment configures.
///
/// Runs strictly after the tests; a delivery failure is logged and never turns
/// into a test-run failure.
pub struct NotificationDispatcher {
    http: reqwest::Client,
    config: NotifyConfig,
}

impl NotificationDispatcher {
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(NotifyConfig::from_env())
    }

    /// Fan the report out to all configured targets.
    pub async fn dispatch(&self, report: &RunReport) {
        let text = message::compose(&report.summary, &report.failures);

        if let Some(url) = self.config.slack_webhook_url.clone() {
            if let Err(e) = self.post_json(&url, &json!({ "text": text })).await {
                log::error!("failed to post to Slack webhook: {}", e);
            }
            if let Some(token) = self.config.slack_bot_token.clone() {
                self.upload_failure_attachments(&url, &token, &report.failures)
                    .await;
            }
        }

        if let Some(url) = self.config.teams_webhook_url.clone() {
            let card = teams_card(&text, &report.failures);
            if let Err(e) = self.post_json(&url, &card).await {
                log::error!("failed to post to Teams webhook: {}", e);
            }
        }
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<()> {
        let res = self.http.post(url).json(body).send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("HTTP {}: {}", status.as_u16(), body));
        }
        Ok(())
    }

    /// Upload every failure screenshot to the Slack rich API and follow each
    /// successful upload with a permalink message. Uploads are independent;
    /// one failing upload never blocks the rest.
    async fn upload_failure_attachments(
        &self,
        webhook_url: &str,
        token: &str,
        failures: &[FailureRecord],
    ) {
        for failure in failures {
            for attachment in &failure.attachments {
                let title = format!("screenshot - {}", failure.title);
                match self.upload_file(token, &attachment.path, &title).await {
                    Ok(Some(permalink)) => {
                        let follow_up = json!({
                            "text": format!("Screenshot for *{}*: {}", failure.title, permalink)
                        });
                        if let Err(e) = self.post_json(webhook_url, &follow_up).await {
                            log::error!("failed to post screenshot link: {}", e);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => log::error!("uploadFileToSlack failed: {}", e),
                }
            }
        }
    }

    /// Multipart upload of one file. Returns the permalink when the API
    /// provides one.
    async fn upload_file(&self, token: &str, path: &str, title: &str) -> Result<Option<String>> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read attachment {}", path))?;
        let filename = message::basename(path);

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename),
            )
            .text("title", title.to_string())
            .text("channels", SLACK_UPLOAD_CHANNEL);

        let res = self
            .http
            .post(SLACK_UPLOAD_URL)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let body: serde_json::Value = res.json().await?;
        if body.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            return Err(anyhow!("slack upload rejected: {}", body));
        }
        Ok(body
            .get("file")
            .and_then(|f| f.get("permalink"))
            .and_then(|p| p.as_str())
            .map(String::from))
    }
}

/// Build the Teams MessageCard payload for the alternate chat provider.
fn teams_card(text: &str, failures: &[FailureRecord]) -> serde_json::Value {
    let mut card = json!({
        "@type": "MessageCard",
        "@context": "http://schema.org/extensions",
        "summary": text,
        "title": "Booking Test Results",
        "text": text,
    });
    if !failures.is_empty() {
        let facts: Vec<serde_json::Value> = failures
            .iter()
            .take(5)
            .map(|f| {
                let first_line = f
                    .errors
                    .first()
                    .map(|e| e.lines().next().unwrap_or("").to_string())
                    .unwrap_or_default();
                json!({ "name": f.title, "value": first_line })
            })
            .collect();
        card["sections"] = json!([{ "facts": facts }]);
    }
    card
}

/// Connectivity check: post a canned message to the Slack webhook.
pub async fn check_webhook(url: &str) -> Result<()> {
    let message = json!({
        "text": format!(
            ":test_tube: Webhook check\n:white_check_mark: Connection successful!\n:stopwatch: Test time: {}",
            chrono::Local::now().to_rfc3339()
        )
    });
    let res = reqwest::Client::new()
        .post(url)
        .json(&message)
        .send()
        .await
        .context("failed to reach webhook")?;
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(anyhow!("webhook rejected: HTTP {}: {}", status.as_u16(), body));
    }
    Ok(())
}
