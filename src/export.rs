//! Workbook export: a single category's latest records, or every category
//! plus a summary sheet.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::config;
use crate::error::Result;
use crate::models::{CategorySummary, GoldRecord, GoldType};
use crate::store;

const RECORD_HEADERS: [&str; 13] = [
    "日期",
    "品牌",
    "产品",
    "价格",
    "价格_数值",
    "单位",
    "纯度",
    "手工费",
    "涨跌",
    "黄金类型",
    "黄金类型代码",
    "数据来源",
    "解析时间",
];

const SUMMARY_HEADERS: [&str; 6] = [
    "gold_type",
    "name",
    "count",
    "latest_date",
    "brands",
    "avg_price",
];

/// Write `sheets` and `summary` to a single `.xlsx` file at `path`.
///
/// Categories without records should be left out of `sheets` by the caller;
/// the summary sheet is always written.
pub fn write_combined(
    path: &Path,
    sheets: &[(GoldType, Vec<GoldRecord>)],
    summary: &[CategorySummary],
) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for (gold_type, records) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(gold_type.name())?;
        write_records(sheet, records, &bold)?;
        tracing::info!(category = %gold_type, rows = records.len(), "exported sheet");
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(config::SUMMARY_SHEET)?;
    write_summary(sheet, summary, &bold)?;

    let buf = workbook.save_to_buffer()?;
    store::write_replace(path, &buf)
}

/// Write one category's records as a single-sheet workbook at `path`.
pub fn write_category(path: &Path, gold_type: GoldType, records: &[GoldRecord]) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(gold_type.name())?;
    write_records(sheet, records, &bold)?;
    let buf = workbook.save_to_buffer()?;
    store::write_replace(path, &buf)
}

fn write_header(sheet: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<()> {
    for (col, title) in (0u16..).zip(headers) {
        sheet.write_string_with_format(0, col, *title, bold)?;
    }
    Ok(())
}

fn write_records(sheet: &mut Worksheet, records: &[GoldRecord], bold: &Format) -> Result<()> {
    write_header(sheet, &RECORD_HEADERS, bold)?;
    for (row, r) in (1u32..).zip(records) {
        sheet.write_string(row, 0, &r.date)?;
        sheet.write_string(row, 1, &r.brand)?;
        sheet.write_string(row, 2, &r.product)?;
        sheet.write_string(row, 3, &r.price)?;
        if let Some(v) = r.price_value {
            sheet.write_number(row, 4, v)?;
        }
        sheet.write_string(row, 5, &r.unit)?;
        sheet.write_string(row, 6, &r.purity)?;
        sheet.write_string(row, 7, &r.labor_fee)?;
        sheet.write_string(row, 8, &r.trend)?;
        sheet.write_string(row, 9, &r.gold_type_name)?;
        sheet.write_string(row, 10, r.gold_type.code())?;
        sheet.write_string(row, 11, &r.source)?;
        sheet.write_string(row, 12, r.parsed_at.format("%Y-%m-%dT%H:%M:%S").to_string())?;
    }
    sheet.autofit();
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, summary: &[CategorySummary], bold: &Format) -> Result<()> {
    write_header(sheet, &SUMMARY_HEADERS, bold)?;
    for (row, s) in (1u32..).zip(summary) {
        sheet.write_string(row, 0, s.gold_type.code())?;
        sheet.write_string(row, 1, &s.name)?;
        sheet.write_number(row, 2, s.count as f64)?;
        sheet.write_string(row, 3, s.latest_date.as_deref().unwrap_or("无数据"))?;
        sheet.write_number(row, 4, s.brands as f64)?;
        sheet.write_number(row, 5, s.avg_price)?;
    }
    sheet.autofit();
    Ok(())
}
