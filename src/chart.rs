//! Chart selection as a tagged variant: each chart button of the original
//! application maps to one pure aggregation function in [`crate::stats`].

use std::collections::BTreeSet;

use serde::Serialize;

use crate::data::filter::FilteredFrame;
use crate::data::model::SkinType;
use crate::stats::{
    brand_counts, ingredient_presence_matrix, price_histogram, price_rank_pairs,
    price_stats_by_brand, skin_type_totals, AggregationError, BrandCount, BrandPriceSummary,
    Histogram, IngredientMatrix, SkinTypeTotal, DEFAULT_PRICE_BINS,
};

/// The available chart views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    PriceHistogram,
    BrandCounts,
    PriceVsRank,
    PriceByBrand,
    SkinTypeTotals,
    IngredientHeatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::PriceHistogram,
        ChartKind::BrandCounts,
        ChartKind::PriceVsRank,
        ChartKind::PriceByBrand,
        ChartKind::SkinTypeTotals,
        ChartKind::IngredientHeatmap,
    ];

    /// Human-facing chart title.
    pub fn title(self) -> &'static str {
        match self {
            ChartKind::PriceHistogram => "Price Distribution",
            ChartKind::BrandCounts => "Brand Distribution",
            ChartKind::PriceVsRank => "Price vs Rank",
            ChartKind::PriceByBrand => "Price by Brand",
            ChartKind::SkinTypeTotals => "Skin Type Distribution",
            ChartKind::IngredientHeatmap => "Ingredients Heatmap",
        }
    }
}

/// The data behind one chart, independently consumable per view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartData {
    PriceHistogram(Histogram),
    BrandCounts(Vec<BrandCount>),
    PriceVsRank(Vec<(f64, i64)>),
    PriceByBrand(Vec<BrandPriceSummary>),
    SkinTypeTotals(Vec<SkinTypeTotal>),
    IngredientHeatmap(IngredientMatrix),
}

/// Compute the data for one chart over a filtered result. `selected_skin_types`
/// is only consulted by [`ChartKind::SkinTypeTotals`]; an error for one chart
/// leaves every other chart computable.
pub fn chart_data(
    kind: ChartKind,
    frame: &FilteredFrame,
    selected_skin_types: &BTreeSet<SkinType>,
) -> Result<ChartData, AggregationError> {
    match kind {
        ChartKind::PriceHistogram => {
            price_histogram(frame, DEFAULT_PRICE_BINS).map(ChartData::PriceHistogram)
        }
        ChartKind::BrandCounts => Ok(ChartData::BrandCounts(brand_counts(frame))),
        ChartKind::PriceVsRank => Ok(ChartData::PriceVsRank(price_rank_pairs(frame))),
        ChartKind::PriceByBrand => Ok(ChartData::PriceByBrand(price_stats_by_brand(frame))),
        ChartKind::SkinTypeTotals => {
            skin_type_totals(frame, selected_skin_types).map(ChartData::SkinTypeTotals)
        }
        ChartKind::IngredientHeatmap => {
            Ok(ChartData::IngredientHeatmap(ingredient_presence_matrix(frame)))
        }
    }
}
