//! Shared fixtures for the gold-tracker integration tests.
//!
//! Provides page builders that mimic the history page's table markup and a
//! helper to construct records directly for analyzer/store tests.

#![allow(dead_code)]

use chrono::NaiveDateTime;
use gold_tracker::{GoldDataManager, GoldRecord, GoldType};

pub type Row = [&'static str; 8];

/// Three well-formed jewelry rows: two 周大福, one 老凤祥.
pub const JEWELRY_ROWS: [Row; 3] = [
    ["2025-09-17", "周大福", "足金首饰", "1,068.00", "元/克", "足金999", "", "↑"],
    ["2025-09-17", "老凤祥", "足金首饰", "1,066.00", "元/克", "足金999", "", "↑"],
    ["2025-09-16", "周大福", "足金摆件", "1,060.00", "元/克", "足金999", "", "↓"],
];

/// A full page: a layout table, then the data table with a `<th>` header row.
pub fn page(rows: &[Row]) -> String {
    page_with(rows, |cell| format!("<td class=\"c\">{cell}</td>"))
}

/// Same page, but each cell's text wrapped in a `<div>`.
pub fn div_page(rows: &[Row]) -> String {
    page_with(rows, |cell| format!("<td><div align=\"center\">{cell}</div></td>"))
}

fn page_with(rows: &[Row], cell: impl Fn(&str) -> String) -> String {
    let body: String = rows
        .iter()
        .map(|r| format!("<tr>\n{}\n</tr>\n", r.iter().map(|c| cell(*c)).collect::<String>()))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta http-equiv="Content-Type" content="text/html; charset=gb2312"><title>黄金价格历史 - 新浪财经</title></head>
<body>
<table class="nav"><tr><td>首页</td><td>黄金</td><td>品牌</td></tr></table>
<table id="historyTable">
<thead><tr><th>日期</th><th>品牌</th><th>产品</th><th>价格</th><th>单位</th><th>纯度</th><th>手工费</th><th>涨跌</th></tr></thead>
<tbody>
{body}</tbody>
</table>
</body>
</html>
"#
    )
}

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn record(
    gold_type: GoldType,
    date: &str,
    brand: &str,
    product: &str,
    price: Option<f64>,
    trend: &str,
) -> GoldRecord {
    GoldRecord {
        date: date.to_string(),
        brand: brand.to_string(),
        product: product.to_string(),
        price: price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "--".to_string()),
        price_value: price,
        unit: "元/克".to_string(),
        purity: "足金999".to_string(),
        labor_fee: String::new(),
        trend: trend.to_string(),
        gold_type_name: gold_type.name().to_string(),
        gold_type,
        source: "新浪财经".to_string(),
        parsed_at: ts("2025-09-17 10:00:00"),
    }
}

/// A manager rooted in a fresh temp directory. Keep the `TempDir` alive for
/// the duration of the test.
pub fn manager() -> (GoldDataManager, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let manager = GoldDataManager::builder().data_dir(tmp.path()).build().unwrap();
    (manager, tmp)
}

pub const HISTORY_PATH: &str = "/q/view/vGold_Matter_History.php";
