//! On-disk layout for parsed batches.
//!
//! Each category owns a small family of files in the data directory, all
//! named from its file prefix:
//!
//! - `<prefix>_latest.json` / `<prefix>_latest_analysis.json`, replaced every run
//! - `<prefix>_<YYYYMMDD>_<HHMMSS>.json` and its `_analysis.json` twin, never replaced
//! - `<prefix>_latest.html`, the last raw page fetched
//! - `<prefix>_latest.xlsx`, the latest records as a workbook (feature `xlsx`)
//!
//! Every file is written to a temp file in the same directory and renamed into
//! place, so readers never see a half-written file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::config;
use crate::error::{GoldError, Result};
use crate::models::{AnalysisSummary, GoldRecord, GoldType};

const ANALYSIS_SUFFIX: &str = "analysis";

/// Paths written by one [`Store::save`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFiles {
    pub latest: PathBuf,
    pub latest_analysis: PathBuf,
    pub snapshot: PathBuf,
    pub snapshot_analysis: PathBuf,
}

pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| GoldError::persistence(&data_dir, e))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn latest_path(&self, gold_type: GoldType) -> PathBuf {
        self.data_dir
            .join(config::latest_file_name(gold_type.file_prefix(), None, "json"))
    }

    pub fn latest_analysis_path(&self, gold_type: GoldType) -> PathBuf {
        self.data_dir.join(config::latest_file_name(
            gold_type.file_prefix(),
            Some(ANALYSIS_SUFFIX),
            "json",
        ))
    }

    #[cfg(feature = "xlsx")]
    pub fn latest_xlsx_path(&self, gold_type: GoldType) -> PathBuf {
        self.data_dir
            .join(config::latest_file_name(gold_type.file_prefix(), None, "xlsx"))
    }

    pub fn raw_html_path(&self, gold_type: GoldType) -> PathBuf {
        self.data_dir
            .join(config::latest_file_name(gold_type.file_prefix(), None, "html"))
    }

    /// Write the latest and snapshot files for one batch.
    ///
    /// `at` names the snapshot. If that name is already taken the stem gets a
    /// `_2`, `_3`, ... suffix; an existing snapshot is never replaced.
    pub fn save(
        &self,
        gold_type: GoldType,
        records: &[GoldRecord],
        summary: &AnalysisSummary,
        at: NaiveDateTime,
    ) -> Result<SavedFiles> {
        let records_json = to_json(records)?;
        let summary_json = to_json(summary)?;

        let latest = self.latest_path(gold_type);
        let latest_analysis = self.latest_analysis_path(gold_type);
        write_replace(&latest, &records_json)?;
        write_replace(&latest_analysis, &summary_json)?;
        #[cfg(feature = "xlsx")]
        crate::export::write_category(&self.latest_xlsx_path(gold_type), gold_type, records)?;

        let base = config::snapshot_stem(gold_type.file_prefix(), at);
        let (snapshot, snapshot_analysis) = self.write_snapshot(&base, &records_json)?;
        write_new(&snapshot_analysis, &summary_json)?;

        tracing::info!(
            category = %gold_type,
            records = records.len(),
            latest = %latest.display(),
            snapshot = %snapshot.display(),
            "saved batch"
        );

        Ok(SavedFiles {
            latest,
            latest_analysis,
            snapshot,
            snapshot_analysis,
        })
    }

    /// Claim the first free snapshot stem and write the records under it.
    fn write_snapshot(&self, base: &str, records_json: &[u8]) -> Result<(PathBuf, PathBuf)> {
        for n in 1u32.. {
            let stem = if n == 1 {
                base.to_string()
            } else {
                format!("{base}_{n}")
            };
            let data = self
                .data_dir
                .join(config::snapshot_file_name(&stem, None, "json"));
            let analysis = self.data_dir.join(config::snapshot_file_name(
                &stem,
                Some(ANALYSIS_SUFFIX),
                "json",
            ));
            if analysis.exists() {
                continue;
            }
            match write_new(&data, records_json) {
                Ok(()) => return Ok((data, analysis)),
                Err(GoldError::Persistence { source, .. })
                    if source.kind() == io::ErrorKind::AlreadyExists =>
                {
                    continue
                }
                Err(e) => return Err(e),
            }
        }
        Err(GoldError::InvalidArgument(format!(
            "no free snapshot name for {base}"
        )))
    }

    /// Keep the decoded page next to the parsed data so it can be re-parsed offline.
    pub fn save_raw_html(&self, gold_type: GoldType, html: &str) -> Result<PathBuf> {
        let path = self.raw_html_path(gold_type);
        write_replace(&path, html.as_bytes())?;
        Ok(path)
    }

    /// Records from the category's latest file, or `None` if it was never written.
    pub fn load_latest(&self, gold_type: GoldType) -> Result<Option<Vec<GoldRecord>>> {
        read_json(&self.latest_path(gold_type))
    }

    pub fn load_latest_summary(&self, gold_type: GoldType) -> Result<Option<AnalysisSummary>> {
        read_json(&self.latest_analysis_path(gold_type))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(GoldError::persistence(path, e)),
    }
}

fn temp_with(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| GoldError::persistence(path, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| GoldError::persistence(path, e))?;
    Ok(tmp)
}

/// Atomically replace `path` with `bytes`.
pub(crate) fn write_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    temp_with(path, bytes)?
        .persist(path)
        .map_err(|e| GoldError::persistence(path, e.error))?;
    Ok(())
}

/// Write `bytes` to `path`, failing with `AlreadyExists` rather than replacing it.
fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    temp_with(path, bytes)?
        .persist_noclobber(path)
        .map_err(|e| GoldError::persistence(path, e.error))?;
    Ok(())
}
