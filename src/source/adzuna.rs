// src/source/adzuna.rs
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::config::BotConfig;
use crate::source::types::{is_usable_id, FetchError, FetchOutcome, ListingSource, Posting};

/// Adzuna job search, first page only, one request per scope.
pub struct AdzunaSource {
    base_url: String,
    app_id: String,
    app_key: String,
    country: String,
    role: String,
    results_per_page: u32,
    timeout: Duration,
    client: Client,
}

impl AdzunaSource {
    pub fn from_config(cfg: &BotConfig) -> Self {
        Self {
            base_url: cfg.search.api_base_url.clone(),
            app_id: cfg.adzuna.app_id.clone(),
            app_key: cfg.adzuna.app_key.clone(),
            country: cfg.search.country.clone(),
            role: cfg.search.role.clone(),
            results_per_page: cfg.search.results_per_page,
            timeout: Duration::from_secs(cfg.search.fetch_timeout_secs),
            client: Client::new(),
        }
    }

    /// Point the source at another host (mock servers, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn search_url(&self) -> String {
        format!(
            "{}/v1/api/jobs/{}/search/1",
            self.base_url.trim_end_matches('/'),
            self.country
        )
    }

    async fn request(&self, scope: &str) -> Result<(Vec<Posting>, usize), FetchError> {
        let per_page = self.results_per_page.to_string();
        let params = [
            ("app_id", self.app_id.as_str()),
            ("app_key", self.app_key.as_str()),
            ("results_per_page", per_page.as_str()),
            ("what", self.role.as_str()),
            ("where", scope),
            ("content-type", "application/json"),
        ];

        // `without_url` keeps the app_key out of logs.
        let rsp = self
            .client
            .get(self.search_url())
            .timeout(self.timeout)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let status = rsp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = rsp
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let (postings, dropped) = parse_results(&body)?;
        if dropped > 0 {
            tracing::warn!(scope, dropped, "adzuna: records without usable id skipped");
        }
        Ok((postings, dropped))
    }
}

#[async_trait]
impl ListingSource for AdzunaSource {
    async fn fetch(&self, scope: &str) -> FetchOutcome {
        let t0 = Instant::now();
        let outcome = match self.request(scope).await {
            Ok((postings, dropped)) => FetchOutcome::Fetched { postings, dropped },
            Err(e) => FetchOutcome::Failed(e),
        };
        histogram!("jobs_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        outcome
    }

    fn name(&self) -> &'static str {
        "Adzuna"
    }
}

/// Parse an Adzuna search payload.
///
/// Returns the usable postings and the number of records dropped for lacking
/// an id. Only a payload that is not JSON, or whose `results` is not an
/// array, is an error; individual bad fields fall back to `""`.
pub fn parse_results(body: &str) -> Result<(Vec<Posting>, usize), FetchError> {
    let root: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let results = match root.get("results") {
        None | Some(Value::Null) => return Ok((Vec::new(), 0)),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(FetchError::Decode("`results` is not an array".into())),
    };

    let mut out = Vec::with_capacity(results.len());
    let mut dropped = 0usize;
    for item in results {
        match posting_from_value(item) {
            Some(p) => out.push(p),
            None => dropped += 1,
        }
    }

    counter!("jobs_fetched_total").increment(out.len() as u64);
    counter!("jobs_invalid_total").increment(dropped as u64);
    Ok((out, dropped))
}

fn posting_from_value(item: &Value) -> Option<Posting> {
    let id = normalize_id(item.get("id"))?;
    Some(Posting {
        id,
        title: text_field(item.get("title")),
        description: text_field(item.get("description")),
        company_name: text_field(item.get("company").and_then(|c| c.get("display_name"))),
        location_name: text_field(item.get("location").and_then(|l| l.get("display_name"))),
        url: text_field(item.get("redirect_url")),
    })
}

/// Adzuna sends ids as strings, but some endpoints return integers.
/// Both normalize to the same string so the ledger sees one identity.
/// Ids spanning lines cannot live in the line-per-id ledger and are dropped.
fn normalize_id(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => {
            let t = s.trim();
            is_usable_id(t).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}
