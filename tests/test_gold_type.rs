//! Category registry and query parameter resolution.

use chrono::NaiveDate;
use gold_tracker::{FetchOptions, GoldError, GoldType, QueryParams};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ---------------------------------------------------------------------------
// registry
// ---------------------------------------------------------------------------

#[test]
fn registry_entries() {
    let j = GoldType::Jewelry.config();
    assert_eq!((j.name, j.file_prefix, j.pp, j.pz), ("首饰黄金", "jewelry_gold", 0, 15));

    let p = GoldType::Physical.config();
    assert_eq!((p.name, p.file_prefix, p.pp, p.pz), ("实物黄金", "physical_gold", 0, 11));

    let b = GoldType::GoldBar.config();
    assert_eq!((b.name, b.file_prefix, b.pp, b.pz), ("金条", "gold_bar", 0, 15));
}

#[test]
fn all_lists_every_category_in_order() {
    assert_eq!(
        GoldType::ALL,
        [GoldType::Jewelry, GoldType::Physical, GoldType::GoldBar]
    );
}

#[test]
fn codes_and_display() {
    assert_eq!(GoldType::GoldBar.code(), "gold_bar");
    assert_eq!(GoldType::Jewelry.to_string(), "jewelry");
}

#[test]
fn from_str_accepts_code_label_and_dash() {
    assert_eq!("jewelry".parse::<GoldType>().unwrap(), GoldType::Jewelry);
    assert_eq!("Physical".parse::<GoldType>().unwrap(), GoldType::Physical);
    assert_eq!("gold-bar".parse::<GoldType>().unwrap(), GoldType::GoldBar);
    assert_eq!("金条".parse::<GoldType>().unwrap(), GoldType::GoldBar);
    assert!("silver".parse::<GoldType>().is_err());
}

#[test]
fn serde_uses_code_string() {
    assert_eq!(serde_json::to_string(&GoldType::GoldBar).unwrap(), "\"gold_bar\"");
    let t: GoldType = serde_json::from_str("\"physical\"").unwrap();
    assert_eq!(t, GoldType::Physical);
}

// ---------------------------------------------------------------------------
// query_for
// ---------------------------------------------------------------------------

#[test]
fn query_params_match_registry_for_every_type() {
    let today = date("2025-09-17");
    for t in GoldType::ALL {
        let q = FetchOptions::default().query_for(t, today).unwrap();
        assert_eq!(q.pp, t.config().pp, "{t}");
        assert_eq!(q.pz, t.config().pz, "{t}");
    }
}

#[test]
fn default_window_is_thirty_days_ending_today() {
    let q = FetchOptions::default()
        .query_for(GoldType::Jewelry, date("2025-09-17"))
        .unwrap();
    assert_eq!(q.start, date("2025-08-18"));
    assert_eq!(q.end, date("2025-09-17"));
}

#[test]
fn explicit_range_and_params_override_defaults() {
    let opts = FetchOptions::default()
        .with_range(date("2025-08-17"), date("2025-09-17"))
        .with_params(3, 7);
    let q = opts.query_for(GoldType::Physical, date("2030-01-01")).unwrap();
    assert_eq!(
        q,
        QueryParams {
            pp: 3,
            pz: 7,
            start: date("2025-08-17"),
            end: date("2025-09-17"),
        }
    );
}

#[test]
fn pairs_are_formatted_for_the_query_string() {
    let q = FetchOptions::default()
        .with_range(date("2025-08-17"), date("2025-09-17"))
        .query_for(GoldType::Jewelry, date("2025-09-17"))
        .unwrap();
    let pairs: Vec<(&str, String)> = q.pairs().into_iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("pp", "0".to_string()),
            ("pz", "15".to_string()),
            ("start", "2025-08-17".to_string()),
            ("end", "2025-09-17".to_string()),
        ]
    );
}

#[test]
fn inverted_range_is_rejected() {
    let opts = FetchOptions::default().with_range(date("2025-09-17"), date("2025-09-01"));
    let err = opts.query_for(GoldType::Jewelry, date("2025-09-17")).unwrap_err();
    assert!(matches!(err, GoldError::InvalidArgument(_)));
}

#[test]
fn unknown_category_converts_to_invalid_argument() {
    let err: GoldError = "silver".parse::<GoldType>().unwrap_err().into();
    match err {
        GoldError::InvalidArgument(msg) => assert!(msg.contains("silver")),
        other => panic!("unexpected error: {other}"),
    }
}
