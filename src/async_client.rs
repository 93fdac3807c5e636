//! Async wrapper around [`GoldDataManager`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all manager operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! the blocking HTTP client and file writes do their work.
//!
//! # Example
//!
//! ```no_run
//! use gold_tracker::{AsyncGoldDataManager, FetchOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let manager = AsyncGoldDataManager::builder().data_dir("data").build().await.unwrap();
//!
//!     let report = manager.run_all(FetchOptions::default()).await.unwrap();
//!     println!("{report}");
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{GoldError, Result};
use crate::fetcher::FetchOptions;
use crate::models::{CategorySummary, GoldType};
use crate::{BatchReport, GoldDataManager, RunReport};

// ---------------------------------------------------------------------------
// AsyncGoldDataManagerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncGoldDataManager`].
#[derive(Default)]
pub struct AsyncGoldDataManagerBuilder {
    data_dir: Option<PathBuf>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl AsyncGoldDataManagerBuilder {
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the async manager. Directory creation runs on the blocking pool.
    pub async fn build(self) -> Result<AsyncGoldDataManager> {
        tokio::task::spawn_blocking(move || {
            let mut builder = GoldDataManager::builder();
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            if let Some(url) = self.base_url {
                builder = builder.base_url(url);
            }
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            let manager = builder.build()?;
            Ok(AsyncGoldDataManager {
                inner: Arc::new(Mutex::new(manager)),
            })
        })
        .await
        .map_err(|e| GoldError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncGoldDataManager
// ---------------------------------------------------------------------------

/// Async wrapper around [`GoldDataManager`].
///
/// The manager sits behind a [`Mutex`], so operations on one instance run
/// one at a time, matching the one-run-at-a-time model of the pipeline.
pub struct AsyncGoldDataManager {
    inner: Arc<Mutex<GoldDataManager>>,
}

impl AsyncGoldDataManager {
    pub fn builder() -> AsyncGoldDataManagerBuilder {
        AsyncGoldDataManagerBuilder::default()
    }

    /// Run a sync manager operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut GoldDataManager) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let manager = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = manager
                .lock()
                .map_err(|_| GoldError::InvalidArgument("manager lock poisoned".into()))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| GoldError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn fetch_and_save(&self, gold_type: GoldType, opts: FetchOptions) -> Result<BatchReport> {
        self.run(move |m| m.fetch_and_save(gold_type, &opts)).await
    }

    pub async fn process_html(&self, gold_type: GoldType, html: String) -> Result<BatchReport> {
        self.run(move |m| m.process_html(gold_type, &html)).await
    }

    /// Every category in order; per-category failures live inside the report.
    pub async fn run_all(&self, opts: FetchOptions) -> Result<RunReport> {
        self.run(move |m| Ok(m.run_all(&opts))).await
    }

    pub async fn all_data_summary(&self) -> Result<Vec<CategorySummary>> {
        self.run(|m| m.all_data_summary()).await
    }
}
