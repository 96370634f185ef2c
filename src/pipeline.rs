// src/pipeline.rs
//! Match-and-notify: one linear pass over all scopes per invocation.

use anyhow::{anyhow, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::str::FromStr;

use crate::ledger::{Ledger, LedgerStore};
use crate::matcher::{KeywordSet, MatchResult};
use crate::notify::{JobAlert, Notifier};
use crate::source::{is_usable_id, FetchOutcome, ListingSource};

/// One-time metrics registration (so series carry descriptions).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("jobs_fetched_total", "Postings parsed from the listing source.");
        describe_counter!(
            "jobs_fetch_errors_total",
            "Scopes whose fetch failed and contributed zero postings."
        );
        describe_counter!("jobs_invalid_total", "Postings dropped for lacking a usable id.");
        describe_counter!(
            "jobs_seen_skipped_total",
            "Postings skipped because their id was already notified."
        );
        describe_counter!("jobs_unmatched_total", "Postings with no keyword hit.");
        describe_counter!("jobs_notified_total", "Alerts accepted by the notifier.");
        describe_counter!("jobs_notify_errors_total", "Alerts the notifier failed to deliver.");
        describe_histogram!("jobs_fetch_ms", "Listing fetch time in milliseconds.");
        describe_gauge!("job_bot_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// When a dispatched alert's id is written to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkSeenPolicy {
    /// Only after the notifier confirmed delivery. A failed send is retried
    /// on the next run: a duplicate alert is possible, a lost one is not.
    #[default]
    AfterDelivery,
    /// After every attempt, delivered or not. Never duplicates, may lose.
    OnAttempt,
}

impl FromStr for MarkSeenPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delivered" | "after_delivery" | "success" => Ok(Self::AfterDelivery),
            "attempt" | "on_attempt" | "attempted" => Ok(Self::OnAttempt),
            other => Err(anyhow!("unknown mark-seen policy: {other}")),
        }
    }
}

/// Counts for one run. Logged at the end, handy in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scopes: usize,
    pub scopes_failed: usize,
    pub fetched: usize,
    pub invalid: usize,
    pub skipped_seen: usize,
    pub unmatched: usize,
    pub notified: usize,
    pub notify_failed: usize,
    pub flushed: usize,
}

pub struct Pipeline<'a> {
    source: &'a dyn ListingSource,
    notifier: &'a dyn Notifier,
    keywords: &'a KeywordSet,
    policy: MarkSeenPolicy,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        source: &'a dyn ListingSource,
        notifier: &'a dyn Notifier,
        keywords: &'a KeywordSet,
    ) -> Self {
        Self {
            source,
            notifier,
            keywords,
            policy: MarkSeenPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MarkSeenPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Query every scope in order, alert on new matches, flush the ledger.
    ///
    /// Fetch and dispatch failures are logged and counted; only a ledger
    /// flush failure makes the run return `Err`.
    pub async fn run_once<S: LedgerStore>(
        &self,
        scopes: &[String],
        ledger: &mut Ledger<S>,
    ) -> Result<RunSummary> {
        ensure_metrics_described();

        let mut summary = RunSummary::default();
        // ids dispatched in this run, whatever the outcome: one attempt per run
        let mut attempted: HashSet<String> = HashSet::new();

        for scope in scopes {
            summary.scopes += 1;
            let candidates = match self.source.fetch(scope).await {
                FetchOutcome::Fetched { postings, dropped } => {
                    summary.invalid += dropped;
                    postings
                }
                FetchOutcome::Failed(e) => {
                    tracing::warn!(
                        error = %e,
                        provider = self.source.name(),
                        scope = %scope,
                        "fetch failed; scope contributes no postings"
                    );
                    counter!("jobs_fetch_errors_total").increment(1);
                    summary.scopes_failed += 1;
                    continue;
                }
            };
            tracing::debug!(scope = %scope, count = candidates.len(), "fetched");
            summary.fetched += candidates.len();

            for posting in candidates {
                let id = posting.id.trim().to_string();
                if !is_usable_id(&id) {
                    tracing::warn!(scope = %scope, title = %posting.title, "posting without usable id skipped");
                    counter!("jobs_invalid_total").increment(1);
                    summary.invalid += 1;
                    continue;
                }
                if ledger.contains(&id) || attempted.contains(&id) {
                    tracing::debug!(id = %id, "already notified");
                    counter!("jobs_seen_skipped_total").increment(1);
                    summary.skipped_seen += 1;
                    continue;
                }

                let Some(m) = MatchResult::classify(posting, self.keywords) else {
                    counter!("jobs_unmatched_total").increment(1);
                    summary.unmatched += 1;
                    continue;
                };

                attempted.insert(id.clone());
                let alert = JobAlert::from_match(&m);
                let delivered = match self.notifier.send(&alert).await {
                    Ok(()) => {
                        tracing::info!(
                            id = %id,
                            title = %alert.title,
                            matched = %alert.matched_str(),
                            "alert sent"
                        );
                        counter!("jobs_notified_total").increment(1);
                        summary.notified += 1;
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = ?e,
                            id = %id,
                            notifier = self.notifier.name(),
                            "alert dispatch failed"
                        );
                        counter!("jobs_notify_errors_total").increment(1);
                        summary.notify_failed += 1;
                        false
                    }
                };

                if delivered || self.policy == MarkSeenPolicy::OnAttempt {
                    ledger.record(&id);
                }
            }
        }

        summary.flushed = ledger.flush().await?;

        let now = chrono::Utc::now().timestamp().max(0);
        gauge!("job_bot_last_run_ts").set(now as f64);

        tracing::info!(
            scopes = summary.scopes,
            scopes_failed = summary.scopes_failed,
            fetched = summary.fetched,
            invalid = summary.invalid,
            skipped_seen = summary.skipped_seen,
            unmatched = summary.unmatched,
            notified = summary.notified,
            notify_failed = summary.notify_failed,
            flushed = summary.flushed,
            "run finished"
        );
        Ok(summary)
    }
}
