//! Sends one sample alert through the configured notifier to check the webhook.

use job_alert_bot::{notify, BotConfig, JobAlert};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = BotConfig::from_env()?;
    let notifier = notify::from_config(&cfg);

    let alert = JobAlert {
        posting_id: "demo".into(),
        title: "DevOps Engineer (demo)".into(),
        company: "Example Ltd".into(),
        location: cfg
            .search
            .scopes
            .first()
            .cloned()
            .unwrap_or_else(|| "Remote".into()),
        url: "https://www.adzuna.com/".into(),
        matched: cfg.search.keywords.iter().take(2).cloned().collect(),
    };

    notifier.send(&alert).await?;
    println!("notify-demo sent via {}", notifier.name());
    Ok(())
}
