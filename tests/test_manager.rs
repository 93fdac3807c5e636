//! End-to-end pipeline through the manager façade.

mod common;

use std::fs;

use chrono::NaiveDate;
use common::{manager, page, HISTORY_PATH, JEWELRY_ROWS};
use gold_tracker::{FetchOptions, GoldDataManager, GoldError, GoldRecord, GoldType};
use mockito::Matcher;

fn window() -> FetchOptions {
    let d = |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
    FetchOptions::default().with_range(d("2025-08-17"), d("2025-09-17"))
}

fn manager_for(server: &mockito::Server, dir: &std::path::Path) -> GoldDataManager {
    GoldDataManager::builder()
        .data_dir(dir)
        .base_url(format!("{}{}", server.url(), HISTORY_PATH))
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// process_html
// ---------------------------------------------------------------------------

#[test]
fn three_row_fixture_end_to_end() {
    let (manager, tmp) = manager();
    let batch = manager
        .process_html(GoldType::Jewelry, &page(&JEWELRY_ROWS))
        .unwrap();

    assert_eq!(batch.records, 3);
    assert_eq!(batch.files.latest, tmp.path().join("jewelry_gold_latest.json"));

    let latest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&batch.files.latest).unwrap()).unwrap();
    let rows = latest.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["黄金类型代码"] == "jewelry"));

    let brand_total: usize = batch.summary.brands.counts.values().sum();
    assert_eq!(brand_total, 3);

    let analysis: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&batch.files.latest_analysis).unwrap()).unwrap();
    let counts = analysis["品牌分析"]["品牌统计"].as_object().unwrap();
    assert_eq!(counts.values().map(|v| v.as_u64().unwrap()).sum::<u64>(), 3);
    assert_eq!(analysis["品牌分析"]["品牌统计"]["周大福"], 2);
}

#[test]
fn empty_page_is_no_records_and_keeps_previous_files() {
    let (manager, _tmp) = manager();
    manager
        .process_html(GoldType::Jewelry, &page(&JEWELRY_ROWS))
        .unwrap();

    let err = manager.process_html(GoldType::Jewelry, "").unwrap_err();
    assert!(matches!(err, GoldError::NoRecords(GoldType::Jewelry)));
    assert_eq!(manager.load_data(GoldType::Jewelry).unwrap().unwrap().len(), 3);
}

#[test]
fn empty_page_writes_nothing() {
    let (manager, tmp) = manager();
    let err = manager.process_html(GoldType::GoldBar, "<html></html>").unwrap_err();
    assert!(matches!(err, GoldError::NoRecords(GoldType::GoldBar)));
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

// ---------------------------------------------------------------------------
// fetch_and_save / run
// ---------------------------------------------------------------------------

#[test]
fn fetch_and_save_keeps_raw_page() {
    let mut server = mockito::Server::new();
    let html = page(&JEWELRY_ROWS);
    let _mock = server
        .mock("GET", HISTORY_PATH)
        .match_query(Matcher::UrlEncoded("pz".into(), "15".into()))
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(&html)
        .create();

    let tmp = tempfile::tempdir().unwrap();
    let mut manager = manager_for(&server, tmp.path());
    let batch = manager.fetch_and_save(GoldType::Jewelry, &window()).unwrap();

    assert_eq!(batch.records, 3);
    let raw = fs::read_to_string(tmp.path().join("jewelry_gold_latest.html")).unwrap();
    assert_eq!(raw, html);
}

#[test]
fn run_all_continues_past_a_failed_category() {
    let mut server = mockito::Server::new();
    // jewelry and gold_bar share pz=15; physical (pz=11) fails
    let _mock = server
        .mock("GET", HISTORY_PATH)
        .match_query(Matcher::UrlEncoded("pz".into(), "15".into()))
        .with_status(200)
        .with_body(page(&JEWELRY_ROWS))
        .expect(2)
        .create();
    let _mock = server
        .mock("GET", HISTORY_PATH)
        .match_query(Matcher::UrlEncoded("pz".into(), "11".into()))
        .with_status(500)
        .create();

    let tmp = tempfile::tempdir().unwrap();
    let mut manager = manager_for(&server, tmp.path());
    let report = manager.run_all(&window());

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.succeeded(), vec![GoldType::Jewelry, GoldType::GoldBar]);
    let failed = report.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, GoldType::Physical);
    assert!(matches!(failed[0].1, GoldError::Network(_)));
    assert!(!report.all_failed());
    assert_eq!(report.total_records(), 6);

    let gold_bar: Vec<GoldRecord> = manager.load_data(GoldType::GoldBar).unwrap().unwrap();
    assert!(gold_bar.iter().all(|r| r.gold_type == GoldType::GoldBar));
    assert!(manager.load_data(GoldType::Physical).unwrap().is_none());

    let text = report.to_string();
    assert!(text.starts_with("2 of 3 categories succeeded, 6 records total"));
    assert!(text.contains("FAILED physical"));
    assert!(text.contains("2025-09-17 周大福 足金首饰 1,068.00 元/克"));
}

#[test]
fn preview_holds_at_most_five_records_in_page_order() {
    const DATES: [&str; 7] = [
        "2025-09-17", "2025-09-16", "2025-09-15", "2025-09-14", "2025-09-13", "2025-09-12",
        "2025-09-11",
    ];
    let rows: Vec<common::Row> = DATES
        .iter()
        .map(|&d| [d, "周大福", "足金首饰", "1,068.00", "元/克", "足金999", "", "↑"])
        .collect();
    let (manager, _tmp) = manager();
    let batch = manager.process_html(GoldType::Jewelry, &page(&rows)).unwrap();

    assert_eq!(batch.records, 7);
    assert_eq!(batch.preview.len(), 5);
    assert_eq!(batch.preview[0].date, "2025-09-17");
    assert_eq!(batch.preview[4].date, "2025-09-13");
}

#[test]
fn run_with_every_category_failing() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", HISTORY_PATH)
        .match_query(Matcher::Any)
        .with_status(404)
        .create();

    let tmp = tempfile::tempdir().unwrap();
    let mut manager = manager_for(&server, tmp.path());
    let report = manager.run(&[GoldType::Physical, GoldType::GoldBar], &window());

    assert!(report.all_failed());
    assert!(report.succeeded().is_empty());
    assert_eq!(report.total_records(), 0);
}

// ---------------------------------------------------------------------------
// cross-category views
// ---------------------------------------------------------------------------

#[test]
fn summary_reports_zero_for_missing_categories() {
    let (manager, _tmp) = manager();
    manager
        .process_html(GoldType::Jewelry, &page(&JEWELRY_ROWS))
        .unwrap();

    let summary = manager.all_data_summary().unwrap();
    assert_eq!(summary.len(), 3);

    let jewelry = &summary[0];
    assert_eq!(jewelry.gold_type, GoldType::Jewelry);
    assert_eq!(jewelry.count, 3);
    assert_eq!(jewelry.brands, 2);
    assert_eq!(jewelry.latest_date.as_deref(), Some("2025-09-17"));
    assert!((jewelry.avg_price - 1064.6666).abs() < 1e-3);

    for s in &summary[1..] {
        assert_eq!(s.count, 0);
        assert_eq!(s.avg_price, 0.0);
        assert!(s.latest_date.is_none());
    }
}

#[test]
fn compare_lists_only_categories_with_prices() {
    let (manager, _tmp) = manager();
    manager
        .process_html(GoldType::GoldBar, &page(&JEWELRY_ROWS))
        .unwrap();

    let comparison = manager.compare_gold_types().unwrap();
    assert_eq!(comparison.len(), 1);
    let c = &comparison[0];
    assert_eq!(c.gold_type, GoldType::GoldBar);
    assert_eq!(c.name, "金条");
    assert_eq!((c.max_price, c.min_price, c.count), (1068.0, 1060.0, 3));
}

#[cfg(feature = "xlsx")]
#[test]
fn export_writes_workbook() {
    let (manager, tmp) = manager();
    manager
        .process_html(GoldType::Jewelry, &page(&JEWELRY_ROWS))
        .unwrap();

    let path = manager.export_combined_data("combined_gold_data.xlsx").unwrap();
    assert_eq!(path, tmp.path().join("combined_gold_data.xlsx"));

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.len() > 100);
    assert_eq!(&bytes[..2], b"PK");
}

#[cfg(feature = "xlsx")]
#[test]
fn export_with_no_data_still_writes_summary_sheet() {
    let (manager, _tmp) = manager();
    let path = manager.export_combined_data("empty.xlsx").unwrap();
    assert!(path.exists());
}

#[test]
fn display_names_data_dir() {
    let (manager, tmp) = manager();
    let text = manager.to_string();
    assert!(text.contains(&tmp.path().display().to_string()));
    assert!(text.contains("vGold_Matter_History.php"));
}
