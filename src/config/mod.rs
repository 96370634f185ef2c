//! Run configuration, built once at startup and passed by reference.
//!
//! Secrets come from the environment (plus `.env` when present);
//! search parameters come from an optional settings file plus env overrides.

pub mod settings;

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

use crate::matcher::KeywordSet;
use crate::pipeline::MarkSeenPolicy;
pub use settings::{load_settings_default, load_settings_from, SearchSettings};

pub const ENV_ADZUNA_ID: &str = "ADZUNA_ID";
pub const ENV_ADZUNA_KEY: &str = "ADZUNA_KEY";
pub const ENV_DISCORD_WEBHOOK: &str = "DISCORD_WEBHOOK";
pub const ENV_SLACK_WEBHOOK: &str = "SLACK_WEBHOOK_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdzunaCredentials {
    pub app_id: String,
    pub app_key: String,
}

/// Where alerts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierKind {
    Discord { webhook: String },
    Slack { webhook: String },
    /// Dry run: log only, nothing leaves the process.
    Log,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub adzuna: AdzunaCredentials,
    pub search: SearchSettings,
    pub notifier: NotifierKind,
    pub mark_seen: MarkSeenPolicy,
}

impl BotConfig {
    /// `.env` (if any), settings file (see [`load_settings_default`]) and
    /// process environment. Variables already set win over `.env`.
    pub fn from_env() -> Result<Self> {
        // absent file is fine; dev machines use it, CI sets real env vars
        let _ = dotenvy::dotenv();
        let search = load_settings_default()?;
        Self::from_lookup(search, |k| std::env::var(k).ok())
    }

    /// Build from `search` and an env-like lookup. Blank values count as unset.
    pub fn from_lookup<F>(mut search: SearchSettings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let require = |k: &str| get(k).ok_or_else(|| anyhow!("missing required env var {k}"));

        let adzuna = AdzunaCredentials {
            app_id: require(ENV_ADZUNA_ID)?,
            app_key: require(ENV_ADZUNA_KEY)?,
        };

        if let Some(v) = get("JOB_BOT_SCOPES") {
            search.scopes = settings::split_csv(&v);
        }
        if let Some(v) = get("JOB_BOT_KEYWORDS") {
            search.keywords = settings::split_csv(&v);
        }
        if let Some(v) = get("SEEN_JOBS_PATH") {
            search.ledger_path = PathBuf::from(v.trim());
        }
        let search = search.sanitize()?;

        let dry_run = get("JOB_BOT_DRY_RUN").is_some_and(|v| is_truthy(&v));
        let notifier = if dry_run {
            NotifierKind::Log
        } else {
            let kind = get("JOB_BOT_NOTIFIER")
                .unwrap_or_else(|| "discord".to_string())
                .trim()
                .to_ascii_lowercase();
            match kind.as_str() {
                "discord" => NotifierKind::Discord {
                    webhook: require(ENV_DISCORD_WEBHOOK)?,
                },
                "slack" => NotifierKind::Slack {
                    webhook: require(ENV_SLACK_WEBHOOK)?,
                },
                "log" => NotifierKind::Log,
                other => bail!("unsupported JOB_BOT_NOTIFIER: {other}"),
            }
        };

        let mark_seen = match get("JOB_BOT_MARK_SEEN") {
            None => MarkSeenPolicy::default(),
            Some(v) => v.parse()?,
        };

        Ok(Self {
            adzuna,
            search,
            notifier,
            mark_seen,
        })
    }

    pub fn keyword_set(&self) -> KeywordSet {
        KeywordSet::new(&self.search.keywords)
    }

    pub fn is_dry_run(&self) -> bool {
        self.notifier == NotifierKind::Log
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
