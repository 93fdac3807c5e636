//! Gold price tracker.
//!
//! Fetches the Sina Finance gold price history page for each tracked product
//! category, extracts the embedded price table into typed records, computes
//! descriptive statistics, and keeps "latest" and timestamped JSON files per
//! category on disk.
//!
//! # Quick start
//!
//! ```no_run
//! use gold_tracker::{FetchOptions, GoldDataManager, GoldType};
//!
//! let mut manager = GoldDataManager::builder().data_dir("data").build().unwrap();
//!
//! // One category
//! let batch = manager.fetch_and_save(GoldType::Jewelry, &FetchOptions::default()).unwrap();
//! println!("{} records", batch.records);
//!
//! // Everything, continuing past failures
//! let report = manager.run_all(&FetchOptions::default());
//! println!("{report}");
//! ```

pub mod analyzer;
#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod error;
#[cfg(feature = "xlsx")]
pub mod export;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncGoldDataManager;
pub use error::{GoldError, Result};
pub use fetcher::{FetchOptions, Fetcher, QueryParams};
pub use models::{AnalysisSummary, CategorySummary, GoldRecord, GoldType, PriceComparison};
pub use parser::{ParseStats, Records};
pub use store::{SavedFiles, Store};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;

// ---------------------------------------------------------------------------
// GoldDataManagerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`GoldDataManager`].
pub struct GoldDataManagerBuilder {
    data_dir: Option<PathBuf>,
    base_url: String,
    timeout: Duration,
}

impl Default for GoldDataManagerBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            base_url: config::BASE_URL.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
        }
    }
}

impl GoldDataManagerBuilder {
    /// Directory that receives all output files. Defaults to the working directory.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Endpoint queried for every category unless a call overrides it.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the manager, creating the data directory if it does not exist.
    ///
    /// No network traffic happens here; the HTTP client is created on the
    /// first fetch.
    pub fn build(self) -> Result<GoldDataManager> {
        let store = Store::new(self.data_dir.unwrap_or_else(config::default_data_dir))?;
        let fetcher = Fetcher::new(self.base_url, self.timeout);
        Ok(GoldDataManager { fetcher, store })
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Result of running the pipeline for one category.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub gold_type: GoldType,
    pub records: usize,
    pub stats: ParseStats,
    pub summary: AnalysisSummary,
    pub files: SavedFiles,
    /// The first few records, in page order.
    pub preview: Vec<GoldRecord>,
}

/// Per-category outcomes of a multi-category run, in run order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<(GoldType, Result<BatchReport>)>,
}

impl RunReport {
    pub fn succeeded(&self) -> Vec<GoldType> {
        self.outcomes
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(t, _)| *t)
            .collect()
    }

    pub fn failed(&self) -> Vec<(GoldType, &GoldError)> {
        self.outcomes
            .iter()
            .filter_map(|(t, r)| r.as_ref().err().map(|e| (*t, e)))
            .collect()
    }

    /// True when there was at least one category and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|(_, r)| r.is_err())
    }

    pub fn total_records(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|(_, r)| r.as_ref().ok())
            .map(|b| b.records)
            .sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} of {} categories succeeded, {} records total",
            self.succeeded().len(),
            self.outcomes.len(),
            self.total_records()
        )?;
        for (gold_type, result) in &self.outcomes {
            match result {
                Ok(b) => {
                    writeln!(
                        f,
                        "  ok     {:<9} {} records ({} skipped, {} duplicates)",
                        gold_type.code(),
                        b.records,
                        b.stats.skipped,
                        b.stats.duplicates
                    )?;
                    for r in &b.preview {
                        writeln!(
                            f,
                            "           {} {} {} {} {}",
                            r.date, r.brand, r.product, r.price, r.unit
                        )?;
                    }
                }
                Err(e) => writeln!(f, "  FAILED {:<9} {}", gold_type.code(), e)?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GoldDataManager
// ---------------------------------------------------------------------------

/// Coordinates fetch → parse → analyze → save for each category, and builds
/// cross-category views from the saved latest files.
///
/// Created via [`GoldDataManager::builder()`].
pub struct GoldDataManager {
    fetcher: Fetcher,
    store: Store,
}

impl GoldDataManager {
    /// Create a new builder for configuring the manager.
    pub fn builder() -> GoldDataManagerBuilder {
        GoldDataManagerBuilder::default()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn data_dir(&self) -> &Path {
        self.store.data_dir()
    }

    // -- Pipeline ----------------------------------------------------------

    /// Fetch one category and run the rest of the pipeline on the page.
    ///
    /// The decoded page is saved as `<prefix>_latest.html` before parsing.
    pub fn fetch_and_save(&mut self, gold_type: GoldType, opts: &FetchOptions) -> Result<BatchReport> {
        let html = self.fetcher.fetch(gold_type, opts)?;
        self.store.save_raw_html(gold_type, &html)?;
        self.process_html(gold_type, &html)
    }

    /// Parse, analyze and save an already-fetched page for `gold_type`.
    ///
    /// A page that yields no records is reported as [`GoldError::NoRecords`]
    /// and leaves the category's existing files untouched.
    pub fn process_html(&self, gold_type: GoldType, html: &str) -> Result<BatchReport> {
        let now = Local::now().naive_local();
        let (records, stats) = parser::parse_at(html, gold_type, now).finish();
        tracing::info!(
            category = %gold_type,
            parsed = stats.parsed,
            skipped = stats.skipped,
            duplicates = stats.duplicates,
            "parsed {}",
            gold_type.name()
        );
        if records.is_empty() {
            return Err(GoldError::NoRecords(gold_type));
        }

        let summary = analyzer::analyze(gold_type, &records);
        let files = self.store.save(gold_type, &records, &summary, now)?;
        let preview = records.iter().take(config::PREVIEW_ROWS).cloned().collect();
        Ok(BatchReport {
            gold_type,
            records: records.len(),
            stats,
            summary,
            files,
            preview,
        })
    }

    /// Run [`fetch_and_save`](Self::fetch_and_save) for each of `types` in
    /// order. A failure is recorded and the next category is still attempted.
    pub fn run(&mut self, types: &[GoldType], opts: &FetchOptions) -> RunReport {
        let mut report = RunReport::default();
        for &gold_type in types {
            let result = self.fetch_and_save(gold_type, opts);
            if let Err(e) = &result {
                tracing::warn!(category = %gold_type, error = %e, "category failed");
            }
            report.outcomes.push((gold_type, result));
        }
        report
    }

    /// [`run`](Self::run) over every category.
    pub fn run_all(&mut self, opts: &FetchOptions) -> RunReport {
        self.run(&GoldType::ALL, opts)
    }

    // -- Saved data --------------------------------------------------------

    /// Records from the category's latest file, or `None` if there is none yet.
    pub fn load_data(&self, gold_type: GoldType) -> Result<Option<Vec<GoldRecord>>> {
        self.store.load_latest(gold_type)
    }

    /// Count, latest date, brand count and mean price for every category.
    /// Categories with no latest file report zeros.
    pub fn all_data_summary(&self) -> Result<Vec<CategorySummary>> {
        GoldType::ALL
            .into_iter()
            .map(|t| {
                let records = self.load_data(t)?.unwrap_or_default();
                Ok(analyzer::category_summary(t, &records))
            })
            .collect()
    }

    /// Price spread per category, for categories that have priced records.
    pub fn compare_gold_types(&self) -> Result<Vec<PriceComparison>> {
        let mut out = Vec::new();
        for t in GoldType::ALL {
            if let Some(records) = self.load_data(t)? {
                out.extend(analyzer::price_comparison(t, &records));
            }
        }
        Ok(out)
    }

    /// Write every category's latest records, plus the summary, to one
    /// workbook in the data directory. Returns the workbook path.
    #[cfg(feature = "xlsx")]
    pub fn export_combined_data(&self, file_name: &str) -> Result<PathBuf> {
        let mut sheets = Vec::new();
        for t in GoldType::ALL {
            match self.load_data(t)? {
                Some(records) if !records.is_empty() => sheets.push((t, records)),
                _ => tracing::info!(category = %t, "no saved data, sheet omitted"),
            }
        }
        let summary = self.all_data_summary()?;
        let path = self.store.data_dir().join(file_name);
        export::write_combined(&path, &sheets, &summary)?;
        tracing::info!(path = %path.display(), sheets = sheets.len(), "exported workbook");
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for GoldDataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GoldDataManager(data_dir={}, base_url={})",
            self.store.data_dir().display(),
            self.fetcher.base_url()
        )
    }
}
