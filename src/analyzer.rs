//! Descriptive statistics over one category's batch of records.

use std::collections::HashMap;

use crate::config;
use crate::models::{
    AnalysisSummary, BrandAnalysis, CategorySummary, DateAnalysis, DateRange, GoldRecord,
    GoldType, OrderedMap, Overview, PriceComparison, PriceStats, ProductAnalysis, TrendAnalysis,
};

/// Summarize `records`, all of which belong to `gold_type`.
///
/// An empty batch yields zero counts, no date range and no price statistics.
pub fn analyze(gold_type: GoldType, records: &[GoldRecord]) -> AnalysisSummary {
    let total = records.len();

    let brand_counts = rank(records.iter().map(|r| r.brand.as_str()));
    let product_counts = rank(records.iter().map(|r| r.product.as_str()));
    let date_counts = rank(records.iter().map(|r| r.date.as_str()));
    let trend_counts = tally(records.iter().map(|r| r.trend.as_str()));

    let prices: Vec<f64> = records.iter().filter_map(|r| r.price_value).collect();
    let prices = price_stats(&prices);

    let date_range = date_range(records.iter().map(|r| r.date.as_str()));

    let trend_ratios = OrderedMap(
        trend_counts
            .iter()
            .map(|(k, &n)| (k.to_string(), percent(n, total)))
            .collect(),
    );

    AnalysisSummary {
        gold_type,
        overview: Overview {
            total_records: total,
            date_range,
            brand_count: brand_counts.len(),
            product_count: product_counts.len(),
            priced_records: prices.map_or(0, |p| p.count),
        },
        brands: BrandAnalysis {
            top: top(&brand_counts, config::TOP_N),
            counts: brand_counts,
        },
        products: ProductAnalysis {
            top: top(&product_counts, config::TOP_N),
            counts: product_counts,
        },
        prices,
        trends: TrendAnalysis {
            counts: trend_counts,
            ratios: trend_ratios,
        },
        dates: DateAnalysis {
            distinct_dates: date_counts.len(),
            counts: date_counts,
        },
    }
}

/// Min, max, mean and median of `prices`; `None` for an empty slice.
pub fn price_stats(prices: &[f64]) -> Option<PriceStats> {
    let median = median(prices)?;
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    Some(PriceStats {
        max,
        min,
        mean,
        median,
        count: prices.len(),
    })
}

/// Middle value of the sorted input, or the mean of the two middle values
/// when the length is even.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// One line of the cross-category overview. An empty batch reports zeros.
pub fn category_summary(gold_type: GoldType, records: &[GoldRecord]) -> CategorySummary {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.price_value).collect();
    CategorySummary {
        gold_type,
        name: gold_type.name().to_string(),
        count: records.len(),
        latest_date: records.iter().map(|r| r.date.clone()).max(),
        brands: tally(records.iter().map(|r| r.brand.as_str())).len(),
        avg_price: price_stats(&prices).map_or(0.0, |p| p.mean),
    }
}

/// Price spread for one category, or `None` when no record has a numeric price.
pub fn price_comparison(gold_type: GoldType, records: &[GoldRecord]) -> Option<PriceComparison> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.price_value).collect();
    let stats = price_stats(&prices)?;
    Some(PriceComparison {
        gold_type,
        name: gold_type.name().to_string(),
        max_price: stats.max,
        min_price: stats.min,
        avg_price: stats.mean,
        count: stats.count,
    })
}

/// Occurrence counts in first-seen order.
fn tally<'a>(values: impl IntoIterator<Item = &'a str>) -> OrderedMap<usize> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for v in values {
        match index.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(v, counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }
    OrderedMap(counts)
}

/// Occurrence counts, most frequent first; ties keep first-seen order.
fn rank<'a>(values: impl IntoIterator<Item = &'a str>) -> OrderedMap<usize> {
    let mut counts = tally(values);
    counts.0.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn top(ranked: &OrderedMap<usize>, n: usize) -> OrderedMap<usize> {
    OrderedMap(ranked.0.iter().take(n).cloned().collect())
}

fn date_range<'a>(dates: impl Iterator<Item = &'a str>) -> Option<DateRange> {
    let (mut lo, mut hi): (Option<&str>, Option<&str>) = (None, None);
    for d in dates {
        lo = Some(lo.map_or(d, |l| l.min(d)));
        hi = Some(hi.map_or(d, |h| h.max(d)));
    }
    Some(DateRange {
        start: lo?.to_string(),
        end: hi?.to_string(),
    })
}

fn percent(n: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", n as f64 / total as f64 * 100.0)
}
