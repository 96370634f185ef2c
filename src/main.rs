//! Job alert bot — binary entrypoint.
//! Runs the pipeline once and exits; scheduling is left to cron/CI.

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use job_alert_bot::BotConfig;

/// Compact logs by default, JSON lines when LOG_FORMAT=json.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("job_alert_bot=info,notify=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = BotConfig::from_env().context("loading configuration")?;
    if cfg.is_dry_run() {
        tracing::info!("dry run: alerts are logged, not sent");
    }

    let summary = job_alert_bot::run(&cfg).await?;
    if summary.scopes_failed == summary.scopes && summary.scopes > 0 {
        tracing::warn!("every scope failed to fetch; check Adzuna credentials/connectivity");
    }
    Ok(())
}
