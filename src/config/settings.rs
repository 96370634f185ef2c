// src/config/settings.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "JOB_BOT_CONFIG_PATH";

fn default_api_base_url() -> String {
    "https://api.adzuna.com".to_string()
}
fn default_country() -> String {
    "in".to_string()
}
fn default_role() -> String {
    "devops".to_string()
}
fn default_scopes() -> Vec<String> {
    vec!["chennai".into(), "bangalore".into(), "remote".into()]
}
fn default_keywords() -> Vec<String> {
    vec![
        "aws".into(),
        "kubernetes".into(),
        "docker".into(),
        "terraform".into(),
    ]
}
fn default_results_per_page() -> u32 {
    20
}
fn default_ledger_path() -> PathBuf {
    PathBuf::from("seen_jobs.txt")
}
fn default_fetch_timeout_secs() -> u64 {
    15
}

/// Non-secret search parameters. Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Adzuna API host; overridable for proxies and mock servers.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Adzuna country code, e.g. "in", "gb".
    #[serde(default = "default_country")]
    pub country: String,
    /// Fixed role term sent as `what`.
    #[serde(default = "default_role")]
    pub role: String,
    /// Locations queried in this order, one request each.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            country: default_country(),
            role: default_role(),
            scopes: default_scopes(),
            keywords: default_keywords(),
            results_per_page: default_results_per_page(),
            ledger_path: default_ledger_path(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl SearchSettings {
    /// Trim lists, lowercase keywords, reject settings that cannot produce a run.
    pub fn sanitize(mut self) -> Result<Self> {
        self.scopes = clean_list(self.scopes, false);
        self.keywords = clean_list(self.keywords, true);
        self.country = self.country.trim().to_ascii_lowercase();
        self.role = self.role.trim().to_string();
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        if self.api_base_url.is_empty() {
            self.api_base_url = default_api_base_url();
        }

        if self.scopes.is_empty() {
            return Err(anyhow!("no search scopes configured"));
        }
        if self.keywords.is_empty() {
            return Err(anyhow!("no keywords configured"));
        }
        if self.country.is_empty() {
            return Err(anyhow!("country must not be empty"));
        }
        if self.results_per_page == 0 {
            self.results_per_page = default_results_per_page();
        }
        if self.fetch_timeout_secs == 0 {
            self.fetch_timeout_secs = default_fetch_timeout_secs();
        }
        Ok(self)
    }
}

/// Load settings from an explicit path. Supports TOML or JSON formats.
pub fn load_settings_from(path: &Path) -> Result<SearchSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_settings(&content, ext.as_str())
        .with_context(|| format!("parsing settings in {}", path.display()))
}

/// Load settings using env var + fallbacks:
/// 1) $JOB_BOT_CONFIG_PATH
/// 2) config/job_bot.toml
/// 3) config/job_bot.json
/// 4) built-in defaults
pub fn load_settings_default() -> Result<SearchSettings> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_settings_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/job_bot.toml");
    if toml_p.exists() {
        return load_settings_from(&toml_p);
    }
    let json_p = PathBuf::from("config/job_bot.json");
    if json_p.exists() {
        return load_settings_from(&json_p);
    }
    Ok(SearchSettings::default())
}

fn parse_settings(s: &str, hint_ext: &str) -> Result<SearchSettings> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => serde_json::from_str(s)
            .or_else(|_| toml::from_str(s))
            .map_err(|e| anyhow!("unsupported settings format: {e}")),
    }
}

/// Trim, drop empties and repeats. Order is kept: scopes are queried in
/// declared order and keywords are reported in declared order.
pub fn clean_list(items: Vec<String>, lowercase: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        let t = if lowercase {
            t.to_lowercase()
        } else {
            t.to_string()
        };
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Split a comma-separated env value.
pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',').map(str::to_string).collect()
}
