use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;

pub const BASE_URL: &str = "https://vip.stock.finance.sina.com.cn/q/view/vGold_Matter_History.php";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Days covered by a fetch when no explicit start date is given.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Label stamped on every record as its data source.
pub const SOURCE_LABEL: &str = "新浪财经";

/// Length of the "top N" brand and product rankings in a summary.
pub const TOP_N: usize = 10;

/// Records echoed per category in a run report.
pub const PREVIEW_ROWS: usize = 5;

pub const COMBINED_WORKBOOK: &str = "combined_gold_data.xlsx";
pub const SUMMARY_SHEET: &str = "数据汇总";

/// Words that show up on a correctly decoded page.
pub const PAGE_MARKERS: [&str; 3] = ["黄金", "价格", "品牌"];

/// Encodings tried, in order, after any charset the server declares.
///
/// GBK decodes with the gb18030 decoder, so it covers GB18030 pages too.
pub fn candidate_encodings() -> [&'static encoding_rs::Encoding; 3] {
    [encoding_rs::UTF_8, encoding_rs::GBK, encoding_rs::BIG5]
}

pub fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

/// `<prefix>_latest.<ext>`, optionally with a `_<suffix>` before the extension.
pub fn latest_file_name(prefix: &str, suffix: Option<&str>, ext: &str) -> String {
    match suffix {
        Some(s) => format!("{prefix}_latest_{s}.{ext}"),
        None => format!("{prefix}_latest.{ext}"),
    }
}

/// `<prefix>_<YYYYMMDD>_<HHMMSS>` stem shared by a snapshot's data and analysis files.
pub fn snapshot_stem(prefix: &str, at: NaiveDateTime) -> String {
    format!("{prefix}_{}", at.format("%Y%m%d_%H%M%S"))
}

pub fn snapshot_file_name(stem: &str, suffix: Option<&str>, ext: &str) -> String {
    match suffix {
        Some(s) => format!("{stem}_{s}.{ext}"),
        None => format!("{stem}.{ext}"),
    }
}
