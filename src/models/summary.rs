use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::gold_type::GoldType;

// ---------------------------------------------------------------------------
// OrderedMap: string-keyed map that keeps insertion order on the wire
// ---------------------------------------------------------------------------

/// Key/value pairs serialized as a JSON object in the order they were pushed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string-keyed map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, V>()? {
                    entries.push((k, v));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

// ---------------------------------------------------------------------------
// AnalysisSummary: per-category aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(rename = "黄金类型代码")]
    pub gold_type: GoldType,
    #[serde(rename = "数据概览")]
    pub overview: Overview,
    #[serde(rename = "品牌分析")]
    pub brands: BrandAnalysis,
    #[serde(rename = "产品分析")]
    pub products: ProductAnalysis,
    /// `None` when no record carried a numeric price.
    #[serde(rename = "价格分析")]
    pub prices: Option<PriceStats>,
    #[serde(rename = "趋势分析")]
    pub trends: TrendAnalysis,
    #[serde(rename = "日期分析")]
    pub dates: DateAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    #[serde(rename = "总记录数")]
    pub total_records: usize,
    #[serde(rename = "数据日期范围")]
    pub date_range: Option<DateRange>,
    #[serde(rename = "品牌数量")]
    pub brand_count: usize,
    #[serde(rename = "产品类型数量")]
    pub product_count: usize,
    #[serde(rename = "有效价格记录数")]
    pub priced_records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "开始")]
    pub start: String,
    #[serde(rename = "结束")]
    pub end: String,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 至 {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BrandAnalysis {
    /// Every brand, most frequent first.
    #[serde(rename = "品牌统计")]
    pub counts: OrderedMap<usize>,
    #[serde(rename = "主要品牌")]
    pub top: OrderedMap<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductAnalysis {
    #[serde(rename = "产品类型统计")]
    pub counts: OrderedMap<usize>,
    #[serde(rename = "热门产品")]
    pub top: OrderedMap<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    #[serde(rename = "最高价")]
    pub max: f64,
    #[serde(rename = "最低价")]
    pub min: f64,
    #[serde(rename = "平均价")]
    pub mean: f64,
    #[serde(rename = "中位数")]
    pub median: f64,
    #[serde(rename = "记录数")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendAnalysis {
    #[serde(rename = "涨跌统计")]
    pub counts: OrderedMap<usize>,
    /// Share of all records per trend symbol, e.g. `"33.3%"`.
    #[serde(rename = "涨跌比例")]
    pub ratios: OrderedMap<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DateAnalysis {
    #[serde(rename = "日期统计")]
    pub counts: OrderedMap<usize>,
    #[serde(rename = "数据日期数")]
    pub distinct_dates: usize,
}

// ---------------------------------------------------------------------------
// Cross-category views built from the latest files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub gold_type: GoldType,
    pub name: String,
    pub count: usize,
    pub latest_date: Option<String>,
    pub brands: usize,
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub gold_type: GoldType,
    pub name: String,
    pub max_price: f64,
    pub min_price: f64,
    pub avg_price: f64,
    pub count: usize,
}
