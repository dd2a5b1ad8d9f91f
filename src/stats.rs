//! Derived statistics over a filtered result: one pure function per chart
//! view. Every function is total and side-effect-free; chart-specific
//! preconditions fail with a distinct [`AggregationError`] instead of
//! producing an empty chart.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

use crate::data::filter::FilteredFrame;
use crate::data::model::SkinType;

/// Bin count used by the price-distribution chart.
pub const DEFAULT_PRICE_BINS: usize = 20;

/// Chart-precondition failures. Per-chart and recoverable: one chart
/// erroring says nothing about the others.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AggregationError {
    #[error("no skin type selected")]
    NoSkinTypeSelected,

    #[error("no data available for the selected skin types")]
    NoSkinTypeData,

    #[error("histogram requires at least one bin")]
    NoBins,
}

// ---------------------------------------------------------------------------
// Price histogram
// ---------------------------------------------------------------------------

/// Equal-width histogram over the price column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bin edges, length `counts.len() + 1`.
    pub edges: Vec<f64>,
    /// Observation count per bin.
    pub counts: Vec<usize>,
}

/// Bucket the result's prices into `bin_count` equal-width bins spanning the
/// observed price range. A degenerate range (all prices equal) puts every
/// observation in the first bin.
pub fn price_histogram(
    frame: &FilteredFrame,
    bin_count: usize,
) -> Result<Histogram, AggregationError> {
    if bin_count == 0 {
        return Err(AggregationError::NoBins);
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in frame.products() {
        min = min.min(p.price);
        max = max.max(p.price);
    }
    if frame.is_empty() {
        min = 0.0;
        max = 0.0;
    }

    let width = (max - min) / bin_count as f64;
    let edges: Vec<f64> = (0..=bin_count).map(|i| min + width * i as f64).collect();

    let mut counts = vec![0usize; bin_count];
    for p in frame.products() {
        let bin = if width > 0.0 {
            (((p.price - min) / width) as usize).min(bin_count - 1)
        } else {
            0
        };
        counts[bin] += 1;
    }

    Ok(Histogram { edges, counts })
}

// ---------------------------------------------------------------------------
// Brand counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandCount {
    pub brand: String,
    pub count: usize,
}

/// Occurrence count per brand, descending (the value-counts convention).
/// Equal counts are ordered by brand name.
pub fn brand_counts(frame: &FilteredFrame) -> Vec<BrandCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for p in frame.products() {
        *counts.entry(p.brand.as_str()).or_default() += 1;
    }

    let mut out: Vec<BrandCount> = counts
        .into_iter()
        .map(|(brand, count)| BrandCount {
            brand: brand.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the alphabetical order within equal counts.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

// ---------------------------------------------------------------------------
// Price vs rank
// ---------------------------------------------------------------------------

/// (price, rank) pairs for the scatter view, duplicates preserved, in
/// result order.
pub fn price_rank_pairs(frame: &FilteredFrame) -> Vec<(f64, i64)> {
    frame.products().iter().map(|p| (p.price, p.rank)).collect()
}

// ---------------------------------------------------------------------------
// Price summary by brand
// ---------------------------------------------------------------------------

/// Five-number price summary for one brand, for box-plot rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandPriceSummary {
    pub brand: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Grouped price summaries, one per brand present in the result, brands in
/// sorted order.
pub fn price_stats_by_brand(frame: &FilteredFrame) -> Vec<BrandPriceSummary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for p in frame.products() {
        groups.entry(p.brand.as_str()).or_default().push(p.price);
    }

    groups
        .into_iter()
        .map(|(brand, mut prices)| {
            prices.sort_by(f64::total_cmp);
            BrandPriceSummary {
                brand: brand.to_string(),
                min: prices[0],
                q1: quantile(&prices, 0.25),
                median: quantile(&prices, 0.5),
                q3: quantile(&prices, 0.75),
                max: prices[prices.len() - 1],
            }
        })
        .collect()
}

/// Linear-interpolation quantile over sorted non-empty values (numpy's
/// default scheme).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

// ---------------------------------------------------------------------------
// Skin-type totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkinTypeTotal {
    pub skin_type: SkinType,
    pub total: u64,
}

/// Suitability totals for the pie view: one entry per category in
/// [`SkinType::ALL`] order. Selected categories sum their flag over the
/// result; unselected categories report zero. An empty selection and an
/// all-zero outcome are distinct caller-visible errors, not empty charts.
pub fn skin_type_totals(
    frame: &FilteredFrame,
    selected: &BTreeSet<SkinType>,
) -> Result<Vec<SkinTypeTotal>, AggregationError> {
    if selected.is_empty() {
        return Err(AggregationError::NoSkinTypeSelected);
    }

    let totals: Vec<SkinTypeTotal> = SkinType::ALL
        .into_iter()
        .map(|skin_type| {
            let total = if selected.contains(&skin_type) {
                frame
                    .products()
                    .iter()
                    .filter(|p| p.skin.suits(skin_type))
                    .count() as u64
            } else {
                0
            };
            SkinTypeTotal { skin_type, total }
        })
        .collect();

    if totals.iter().all(|t| t.total == 0) {
        return Err(AggregationError::NoSkinTypeData);
    }
    Ok(totals)
}

// ---------------------------------------------------------------------------
// Ingredient presence matrix
// ---------------------------------------------------------------------------

/// Binary ingredient-presence matrix for the heatmap view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientMatrix {
    /// Distinct trimmed tokens appearing in the result, sorted. The matrix
    /// columns.
    pub ingredients: Vec<String>,
    /// One row per result record, in result order; `rows[r][c]` is the
    /// presence of `ingredients[c]` in record `r`.
    pub rows: Vec<Vec<bool>>,
}

/// Build the presence matrix over the result's own ingredient tokens. A
/// record with a missing ingredient string yields an all-false row.
pub fn ingredient_presence_matrix(frame: &FilteredFrame) -> IngredientMatrix {
    let mut token_set: BTreeSet<&str> = BTreeSet::new();
    for p in frame.products() {
        token_set.extend(p.ingredient_tokens());
    }

    let rows: Vec<Vec<bool>> = frame
        .products()
        .iter()
        .map(|p| {
            let tokens: BTreeSet<&str> = p.ingredient_tokens().collect();
            token_set.iter().map(|t| tokens.contains(t)).collect()
        })
        .collect();

    IngredientMatrix {
        ingredients: token_set.iter().map(|t| t.to_string()).collect(),
        rows,
    }
}
