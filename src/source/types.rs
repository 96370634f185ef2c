// src/source/types.rs
use thiserror::Error;

/// One job listing as returned by the search provider.
///
/// Every text field defaults to `""` when the provider omits it; `id` is
/// always non-empty once a `Posting` has been built by a source.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Posting {
    pub id: String,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location_name: String,
    pub url: String,
}

/// Why a scope contributed zero candidates.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed provider payload: {0}")]
    Decode(String),
}

/// An id the ledger can store: non-empty and on a single line.
pub fn is_usable_id(id: &str) -> bool {
    !id.is_empty() && !id.contains(['\n', '\r'])
}

/// Result of querying one scope. A failure is data, not an `Err`:
/// the pipeline logs it and keeps going with the next scope.
#[derive(Debug)]
pub enum FetchOutcome {
    /// `dropped` counts records the source discarded for lacking a usable id.
    Fetched {
        postings: Vec<Posting>,
        dropped: usize,
    },
    Failed(FetchError),
}

impl FetchOutcome {
    /// A clean page: nothing dropped.
    pub fn fetched(postings: Vec<Posting>) -> Self {
        FetchOutcome::Fetched {
            postings,
            dropped: 0,
        }
    }

    /// Postings on success, empty on failure.
    pub fn into_postings(self) -> Vec<Posting> {
        match self {
            FetchOutcome::Fetched { postings, .. } => postings,
            FetchOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    /// Query one scope (e.g. a location). Never fails the caller.
    async fn fetch(&self, scope: &str) -> FetchOutcome;
    fn name(&self) -> &'static str;
}
