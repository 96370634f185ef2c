// src/notify/log.rs
use anyhow::Result;

use super::{JobAlert, Notifier};

/// Dry-run sink: alerts go to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, alert: &JobAlert) -> Result<()> {
        tracing::info!(
            target: "notify",
            id = %alert.posting_id,
            title = %alert.title,
            company = %alert.company,
            location = %alert.location,
            url = %alert.url,
            matched = %alert.matched_str(),
            "dry-run alert"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
