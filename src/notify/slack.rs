use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{JobAlert, Notifier};

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

fn render_text(alert: &JobAlert) -> String {
    let headline = if alert.url.is_empty() {
        format!("*New Job:* {}", alert.title)
    } else {
        format!("*New Job:* <{}|{}>", alert.url, alert.title)
    };
    format!(
        "{headline}\n*Company:* {}\n*Location:* {}\n*Matched:* {}",
        alert.company,
        alert.location,
        alert.matched_str()
    )
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, alert: &JobAlert) -> Result<()> {
        let body = serde_json::json!({ "text": render_text(alert) });

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("slack post")?
            .error_for_status()
            .map_err(|e| e.without_url())
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
