use super::{truncate_chars, JobAlert, Notifier};
use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

/// Embed accent colour (soft blue).
const EMBED_COLOR: u32 = 5_814_783;
// Discord rejects embed titles over 256 chars.
const MAX_TITLE_CHARS: usize = 256;
/// Longest rate-limit pause honoured before giving up on the wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
    backoff_base_ms: u64,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    pub fn with_backoff_ms(mut self, base_ms: u64) -> Self {
        self.backoff_base_ms = base_ms;
        self
    }

    /// `base * 2^(attempt-1)`, saturating instead of overflowing.
    fn backoff_delay(&self, attempt: u8) -> Duration {
        let factor = 1u64
            .checked_shl(u32::from(attempt.saturating_sub(1)))
            .unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

/// 5xx and 429 may succeed later; any other 4xx will not.
fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Discord sends `Retry-After` in (possibly fractional) seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs: f64 = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(secs.min(MAX_RETRY_AFTER.as_secs_f64())))
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, alert: &JobAlert) -> Result<()> {
        let payload = DiscordWebhookPayload::for_alert(alert);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    let status = rsp.status();
                    if status.is_success() {
                        return Ok(());
                    }
                    if is_retryable(status) && attempt < self.max_retries {
                        let wait = if status == StatusCode::TOO_MANY_REQUESTS {
                            retry_after(rsp.headers())
                                .unwrap_or_else(|| self.backoff_delay(attempt))
                        } else {
                            self.backoff_delay(attempt)
                        };
                        tracing::debug!(
                            %status,
                            attempt,
                            wait_ms = wait.as_millis() as u64,
                            "discord: retrying"
                        );
                        tokio::time::sleep(wait).await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook HTTP error: {status}"));
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.backoff_delay(attempt)).await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook request failed: {}", e.without_url()));
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    color: u32,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn for_alert(alert: &JobAlert) -> Self {
        let title = truncate_chars(&format!("🚀 New Job: {}", alert.title), MAX_TITLE_CHARS);
        let description = format!(
            "**Company:** {}\n**Location:** {}\n**Matched:** {}",
            alert.company,
            alert.location,
            alert.matched_str()
        );
        // Discord refuses the whole embed if `url` is not a valid link.
        let url = (!alert.url.is_empty()).then(|| alert.url.clone());

        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title,
                description,
                url,
                color: EMBED_COLOR,
                timestamp: Utc::now().to_rfc3339(),
            }],
        }
    }
}
