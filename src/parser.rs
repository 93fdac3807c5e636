//! Extraction of price rows from the history page.
//!
//! The page embeds its data in a plain HTML table: eight cells per row in
//! the order date, brand, product, price, unit, purity, labor fee, trend.
//! Cells are sometimes wrapped in a `<div>`; their text is collected either
//! way. A `<table>` holding at least one row of eight direct `<td>` children
//! is a data table; every `<td>` row in it is a candidate record, and rows
//! that come up short are counted as skipped. Other tables are layout and
//! are ignored.

use std::collections::HashSet;
use std::iter::FusedIterator;
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config;
use crate::models::{GoldRecord, GoldType};

/// Cells per data row.
pub const COLUMNS: usize = 8;

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("static row selector"));

static PRICE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("static price regex"));

// ---------------------------------------------------------------------------
// ParseStats
// ---------------------------------------------------------------------------

/// Row accounting for one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Data rows examined (header rows excluded).
    pub rows: usize,
    pub parsed: usize,
    /// Rows dropped for too few cells or a missing required field.
    pub skipped: usize,
    /// Rows dropped because an identical date/brand/product/price row came earlier.
    pub duplicates: usize,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Lazily converts table rows into [`GoldRecord`]s, in page order.
///
/// The iterator is single-pass: once drained it keeps returning `None`, and
/// [`stats`](Records::stats) reflects the rows consumed so far.
pub struct Records {
    rows: std::vec::IntoIter<Vec<String>>,
    gold_type: GoldType,
    parsed_at: NaiveDateTime,
    seen: HashSet<(String, String, String, String)>,
    stats: ParseStats,
}

impl Records {
    pub fn gold_type(&self) -> GoldType {
        self.gold_type
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Drain the remaining rows, returning the records and the final counts.
    pub fn finish(mut self) -> (Vec<GoldRecord>, ParseStats) {
        let records: Vec<GoldRecord> = self.by_ref().collect();
        (records, self.stats)
    }
}

impl Iterator for Records {
    type Item = GoldRecord;

    fn next(&mut self) -> Option<GoldRecord> {
        for cells in self.rows.by_ref() {
            if is_header(&cells) {
                continue;
            }
            self.stats.rows += 1;

            if cells.len() < COLUMNS {
                tracing::debug!(cells = cells.len(), "skipping short row");
                self.stats.skipped += 1;
                continue;
            }

            let Some(record) = build_record(cells, self.gold_type, self.parsed_at) else {
                self.stats.skipped += 1;
                continue;
            };

            let key = (
                record.date.clone(),
                record.brand.clone(),
                record.product.clone(),
                record.price.clone(),
            );
            if !self.seen.insert(key) {
                self.stats.duplicates += 1;
                continue;
            }

            self.stats.parsed += 1;
            return Some(record);
        }
        None
    }
}

impl FusedIterator for Records {}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse `html` into records tagged with `gold_type`, stamped with the
/// current local time.
pub fn parse(html: &str, gold_type: GoldType) -> Records {
    parse_at(html, gold_type, Local::now().naive_local())
}

/// Like [`parse`], with an explicit parse timestamp shared by every record.
pub fn parse_at(html: &str, gold_type: GoldType, parsed_at: NaiveDateTime) -> Records {
    let rows = table_rows(html);
    tracing::debug!(category = %gold_type, candidates = rows.len(), "located table rows");
    Records {
        rows: rows.into_iter(),
        gold_type,
        parsed_at,
        seen: HashSet::new(),
        stats: ParseStats::default(),
    }
}

/// Numeric value of a displayed price: separators and whitespace removed,
/// then the first decimal number found.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(*c, ',' | '，') && !c.is_whitespace())
        .collect();
    PRICE_NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn table_rows(html: &str) -> Vec<Vec<String>> {
    let document = Html::parse_document(html);
    let rows: Vec<_> = document
        .select(&ROW_SELECTOR)
        .map(|tr| {
            let cells: Vec<String> = tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "td")
                .map(cell_text)
                .collect();
            let table = tr
                .ancestors()
                .find(|n| n.value().as_element().is_some_and(|e| e.name() == "table"))
                .map(|n| n.id());
            (table, cells)
        })
        .collect();

    let data_tables: HashSet<_> = rows
        .iter()
        .filter(|(_, cells)| cells.len() >= COLUMNS)
        .map(|(table, _)| *table)
        .collect();

    rows.into_iter()
        .filter(|(table, cells)| !cells.is_empty() && data_tables.contains(table))
        .map(|(_, cells)| cells)
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_header(cells: &[String]) -> bool {
    cells.first().is_some_and(|c| c == "日期")
}

fn build_record(
    cells: Vec<String>,
    gold_type: GoldType,
    parsed_at: NaiveDateTime,
) -> Option<GoldRecord> {
    let mut it = cells.into_iter();
    let mut next = || it.next().unwrap_or_default();
    let (date, brand, product, price, unit) = (next(), next(), next(), next(), next());
    let (purity, labor_fee, trend) = (next(), next(), next());

    if [&date, &brand, &product, &price, &unit]
        .iter()
        .any(|f| f.is_empty())
    {
        tracing::debug!(%date, %brand, %product, %price, "skipping row with missing field");
        return None;
    }

    Some(GoldRecord {
        price_value: parse_price(&price),
        date,
        brand,
        product,
        price,
        unit,
        purity,
        labor_fee,
        trend,
        gold_type_name: gold_type.name().to_string(),
        gold_type,
        source: config::SOURCE_LABEL.to_string(),
        parsed_at,
    })
}
