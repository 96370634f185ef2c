//! ledger.rs — durable set of posting ids that were already notified.
//!
//! The ledger is append-only: ids are never removed, rewritten or reordered.
//! Persistence goes through a [`LedgerStore`] so the pipeline does not care
//! whether ids live in a flat file or in memory.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// All persisted ids. An absent store is an empty store, not an error.
    async fn read_all(&self) -> Result<Vec<String>>;

    /// Append `ids` after whatever is already persisted.
    async fn append(&self, ids: &[String]) -> Result<()>;
}

#[async_trait::async_trait]
impl<'a, T: LedgerStore + ?Sized> LedgerStore for &'a T {
    async fn read_all(&self) -> Result<Vec<String>> {
        (**self).read_all().await
    }

    async fn append(&self, ids: &[String]) -> Result<()> {
        (**self).append(ids).await
    }
}

/// One id per line in a plain text file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl LedgerStore for FileStore {
    async fn read_all(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading ledger {}", self.path.display()))
            }
        };
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn append(&self, ids: &[String]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating ledger dir {}", dir.display()))?;
        }

        let mut buf = String::with_capacity(ids.len() * 12);
        for id in ids {
            buf.push_str(id);
            buf.push('\n');
        }

        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening ledger {}", self.path.display()))?;
        f.write_all(buf.as_bytes())
            .await
            .with_context(|| format!("appending to ledger {}", self.path.display()))?;
        f.flush().await.context("flushing ledger")?;
        Ok(())
    }
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ids: Mutex<Vec<String>>,
    appends: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
            appends: Mutex::new(0),
        }
    }

    /// Persisted ids in write order.
    pub fn snapshot(&self) -> Vec<String> {
        self.ids.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// How many times `append` was called.
    pub fn append_calls(&self) -> usize {
        self.appends.lock().map(|n| *n).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LedgerStore for MemoryStore {
    async fn read_all(&self) -> Result<Vec<String>> {
        Ok(self.snapshot())
    }

    async fn append(&self, ids: &[String]) -> Result<()> {
        let mut v = self
            .ids
            .lock()
            .map_err(|_| anyhow::anyhow!("memory ledger mutex poisoned"))?;
        v.extend(ids.iter().cloned());
        if let Ok(mut n) = self.appends.lock() {
            *n += 1;
        }
        Ok(())
    }
}

/// In-memory view of the ledger for one run: everything persisted so far
/// plus ids recorded during this run and not flushed yet.
pub struct Ledger<S: LedgerStore> {
    store: S,
    seen: HashSet<String>,
    pending: Vec<String>,
}

impl<S: LedgerStore> Ledger<S> {
    pub async fn load(store: S) -> Result<Self> {
        let ids = store.read_all().await?;
        let seen: HashSet<String> = ids.into_iter().collect();
        tracing::debug!(seen = seen.len(), "ledger loaded");
        Ok(Self {
            store,
            seen,
            pending: Vec::new(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Mark `id` as notified. Returns false if it was already known.
    pub fn record(&mut self, id: &str) -> bool {
        if !self.seen.insert(id.to_string()) {
            return false;
        }
        self.pending.push(id.to_string());
        true
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Persist pending ids. With nothing pending the store is not touched.
    /// Returns the number of ids written.
    pub async fn flush(&mut self) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        self.store.append(&self.pending).await?;
        let n = self.pending.len();
        self.pending.clear();
        Ok(n)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
