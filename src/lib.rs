// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod ledger;
pub mod matcher;
pub mod notify;
pub mod pipeline;
pub mod source;

// ---- Re-exports for stable public API ----
pub use crate::config::BotConfig;
pub use crate::ledger::{FileStore, Ledger, LedgerStore, MemoryStore};
pub use crate::matcher::{KeywordSet, MatchResult};
pub use crate::notify::{JobAlert, Notifier};
pub use crate::pipeline::{MarkSeenPolicy, Pipeline, RunSummary};
pub use crate::source::{FetchError, FetchOutcome, ListingSource, Posting};

use tracing::info;

use crate::source::adzuna::AdzunaSource;

/// One full invocation: load the ledger, query every scope, alert, flush.
///
/// Call after tracing init. Fetch and dispatch failures are absorbed by the
/// pipeline; an `Err` here means the keyword list is empty or the ledger
/// could not be read or written.
pub async fn run(cfg: &BotConfig) -> anyhow::Result<RunSummary> {
    let source = AdzunaSource::from_config(cfg);
    let notifier = notify::from_config(cfg);
    let keywords = cfg.keyword_set();
    anyhow::ensure!(!keywords.is_empty(), "no keywords configured; nothing could match");

    let store = FileStore::new(&cfg.search.ledger_path);
    let ledger_path = store.path().display().to_string();
    let mut ledger = Ledger::load(store).await?;

    info!(
        scopes = cfg.search.scopes.len(),
        keywords = keywords.len(),
        ledger = %ledger_path,
        seen = ledger.len(),
        notifier = notifier.name(),
        "job alert run starting"
    );

    Pipeline::new(&source, notifier.as_ref(), &keywords)
        .with_policy(cfg.mark_seen)
        .run_once(&cfg.search.scopes, &mut ledger)
        .await
}
