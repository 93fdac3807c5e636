use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::gold_type::GoldType;

// ---------------------------------------------------------------------------
// GoldRecord: one observed price entry
// ---------------------------------------------------------------------------

/// A single row of the price table, tagged with the category it was fetched for.
///
/// Field names serialize to the same Chinese keys the published JSON files
/// have always used, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldRecord {
    #[serde(rename = "日期")]
    pub date: String,
    #[serde(rename = "品牌")]
    pub brand: String,
    #[serde(rename = "产品")]
    pub product: String,
    /// Price exactly as shown on the page.
    #[serde(rename = "价格")]
    pub price: String,
    /// Numeric form of `price`; `None` when the text holds no number.
    #[serde(rename = "价格_数值")]
    pub price_value: Option<f64>,
    #[serde(rename = "单位")]
    pub unit: String,
    #[serde(rename = "纯度")]
    pub purity: String,
    #[serde(rename = "手工费")]
    pub labor_fee: String,
    #[serde(rename = "涨跌")]
    pub trend: String,
    #[serde(rename = "黄金类型")]
    pub gold_type_name: String,
    #[serde(rename = "黄金类型代码")]
    pub gold_type: GoldType,
    #[serde(rename = "数据来源")]
    pub source: String,
    #[serde(rename = "解析时间")]
    pub parsed_at: NaiveDateTime,
}
