use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::model::{Catalog, CellValue, Column, Product, SkinType};

/// Row count used when the input field is left blank.
pub const DEFAULT_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Criteria – one query's filter selection
// ---------------------------------------------------------------------------

/// Brand dropdown state. `AllBrands` is a first-class sentinel: choosing it
/// is an explicit "impose no brand restriction", distinct from never having
/// touched the dropdown, though both pass every brand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BrandSelection {
    #[default]
    Unselected,
    AllBrands,
    /// Restrict to exactly this brand (case-sensitive equality).
    Exact(String),
}

impl BrandSelection {
    fn matches(&self, brand: &str) -> bool {
        match self {
            BrandSelection::Unselected | BrandSelection::AllBrands => true,
            BrandSelection::Exact(selected) => selected == brand,
        }
    }
}

/// The user's filter selection for a single query. Constructed fresh from
/// input on every fetch; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    pub brand: BrandSelection,
    /// Selected skin-type categories; empty = no skin-type filter.
    pub skin_types: BTreeSet<SkinType>,
    /// Required ingredient tokens; empty = no ingredient filter. A record
    /// passes when it contains at least one selected token.
    pub ingredients: BTreeSet<String>,
    /// Inclusive price bounds; `None` = blank = catalog-wide bound.
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    /// Inclusive rank bounds; `None` = blank = catalog-wide bound.
    pub rank_min: Option<i64>,
    pub rank_max: Option<i64>,
    /// Maximum number of rows to return.
    pub rows: usize,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            brand: BrandSelection::default(),
            skin_types: BTreeSet::new(),
            ingredients: BTreeSet::new(),
            price_min: None,
            price_max: None,
            rank_min: None,
            rank_max: None,
            rows: DEFAULT_ROWS,
        }
    }
}

// ---------------------------------------------------------------------------
// CriteriaInput – untyped form input
// ---------------------------------------------------------------------------

/// Filter input exactly as a form front-end hands it over: numeric fields as
/// free text, blank meaning "no additional restriction". [`CriteriaInput::resolve`]
/// turns it into a typed [`Criteria`], so string parsing stays out of the
/// filter algorithm itself.
#[derive(Debug, Clone, Default)]
pub struct CriteriaInput {
    pub brand: BrandSelection,
    pub skin_types: BTreeSet<SkinType>,
    pub ingredients: BTreeSet<String>,
    pub price_min: String,
    pub price_max: String,
    pub rank_min: String,
    pub rank_max: String,
    pub rows: String,
}

impl CriteriaInput {
    /// Parse the text fields. Blank bounds become `None`; unparsable text is
    /// rejected with the field-specific invalid-input error.
    pub fn resolve(self) -> Result<Criteria, FilterError> {
        let price_min = parse_blank(&self.price_min, |input| FilterError::InvalidPrice { input })?;
        let price_max = parse_blank(&self.price_max, |input| FilterError::InvalidPrice { input })?;
        let rank_min = parse_blank(&self.rank_min, |input| FilterError::InvalidRank { input })?;
        let rank_max = parse_blank(&self.rank_max, |input| FilterError::InvalidRank { input })?;

        let rows = match parse_blank::<i64, _>(&self.rows, |input| FilterError::InvalidRowCount {
            input,
        })? {
            None => DEFAULT_ROWS,
            Some(n) if n <= 0 => return Err(FilterError::NonPositiveRowCount),
            Some(n) => n as usize,
        };

        Ok(Criteria {
            brand: self.brand,
            skin_types: self.skin_types,
            ingredients: self.ingredients,
            price_min,
            price_max,
            rank_min,
            rank_max,
            rows,
        })
    }
}

fn parse_blank<T, F>(input: &str, invalid: F) -> Result<Option<T>, FilterError>
where
    T: FromStr,
    F: FnOnce(String) -> FilterError,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| invalid(input.to_string()))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Recoverable query errors. Each variant carries a user-facing message; a
/// failed call leaves nothing half-updated because [`filter`] is pure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FilterError {
    #[error("'{input}' is not a valid price")]
    InvalidPrice { input: String },

    #[error("'{input}' is not a valid rank")]
    InvalidRank { input: String },

    #[error("'{input}' is not a valid row count")]
    InvalidRowCount { input: String },

    #[error("price must be between {min:.2} and {max:.2}")]
    PriceOutOfRange { min: f64, max: f64 },

    #[error("rank must be between {min} and {max}")]
    RankOutOfRange { min: i64, max: i64 },

    #[error("minimum price cannot be greater than maximum price")]
    PriceMinAboveMax,

    #[error("minimum rank cannot be greater than maximum rank")]
    RankMinAboveMax,

    #[error("number of rows must be positive")]
    NonPositiveRowCount,

    #[error("no products match the selected criteria")]
    NoMatches,

    #[error("number of rows ({requested}) exceeds filtered dataset size ({available})")]
    RowCountExceedsMatches { requested: usize, available: usize },
}

// ---------------------------------------------------------------------------
// FilteredFrame – one query's result
// ---------------------------------------------------------------------------

/// The subset of the catalog passing a query, truncated to the requested
/// count, in original catalog order, together with the projected column set.
///
/// The column projection is a display policy, not a filter: when skin-type
/// categories are selected, the unselected skin-type columns are dropped
/// from [`FilteredFrame::columns`], while row matching is decided purely by
/// the predicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredFrame {
    columns: Vec<Column>,
    products: Vec<Product>,
}

impl FilteredFrame {
    /// Columns to present, in catalog order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Matching products, in original catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Cell values for one row, following the projected column set.
    pub fn row_values(&self, index: usize) -> Option<Vec<CellValue>> {
        let product = self.products.get(index)?;
        Some(self.columns.iter().map(|c| c.value_of(product)).collect())
    }
}

// ---------------------------------------------------------------------------
// The filter algorithm
// ---------------------------------------------------------------------------

/// Apply `criteria` to `catalog`.
///
/// Predicate order is fixed (brand, skin type, ingredients, price, rank);
/// only the skin-type column projection makes the order observable. Blank
/// numeric bounds default to the catalog-wide range, out-of-range bounds are
/// rejected rather than clamped, and a result smaller than the requested row
/// count is an error rather than a silent cap.
pub fn filter(catalog: &Catalog, criteria: &Criteria) -> Result<FilteredFrame, FilterError> {
    // 1. Brand equality, exact and case-sensitive.
    let mut rows: Vec<&Product> = catalog
        .products()
        .iter()
        .filter(|p| criteria.brand.matches(&p.brand))
        .collect();

    // 2. Skin types: a record passes if any selected category is flagged.
    //    The projection of the unselected skin-type columns happens in
    //    project_columns, not here.
    if !criteria.skin_types.is_empty() {
        rows.retain(|p| p.skin.suits_any(criteria.skin_types.iter().copied()));
    }
    let columns = project_columns(&criteria.skin_types);

    // 3. Ingredients: any-match on trimmed tokens, exact equality.
    if !criteria.ingredients.is_empty() {
        let selected: BTreeSet<&str> = criteria.ingredients.iter().map(|s| s.trim()).collect();
        rows.retain(|p| p.ingredient_tokens().any(|token| selected.contains(token)));
    }

    // 4. Blank bounds mean the catalog-wide range, not zero/infinity.
    let (catalog_price_min, catalog_price_max) = catalog.price_range();
    let (catalog_rank_min, catalog_rank_max) = catalog.rank_range();
    let price_min = criteria.price_min.unwrap_or(catalog_price_min);
    let price_max = criteria.price_max.unwrap_or(catalog_price_max);
    let rank_min = criteria.rank_min.unwrap_or(catalog_rank_min);
    let rank_max = criteria.rank_max.unwrap_or(catalog_rank_max);

    // 5. Validate; reject, never clamp.
    let price_in_domain = |v: f64| (catalog_price_min..=catalog_price_max).contains(&v);
    if !price_in_domain(price_min) || !price_in_domain(price_max) {
        return Err(FilterError::PriceOutOfRange {
            min: catalog_price_min,
            max: catalog_price_max,
        });
    }
    let rank_in_domain = |v: i64| (catalog_rank_min..=catalog_rank_max).contains(&v);
    if !rank_in_domain(rank_min) || !rank_in_domain(rank_max) {
        return Err(FilterError::RankOutOfRange {
            min: catalog_rank_min,
            max: catalog_rank_max,
        });
    }
    if price_min > price_max {
        return Err(FilterError::PriceMinAboveMax);
    }
    if rank_min > rank_max {
        return Err(FilterError::RankMinAboveMax);
    }
    if criteria.rows == 0 {
        return Err(FilterError::NonPositiveRowCount);
    }

    // 6. Inclusive range filters.
    rows.retain(|p| p.price >= price_min && p.price <= price_max);
    rows.retain(|p| p.rank >= rank_min && p.rank <= rank_max);

    // 7. Zero matching rows is a distinct condition, not an empty success.
    if rows.is_empty() {
        return Err(FilterError::NoMatches);
    }

    // 8. Requesting more rows than matched is an error, never a silent cap.
    if criteria.rows > rows.len() {
        return Err(FilterError::RowCountExceedsMatches {
            requested: criteria.rows,
            available: rows.len(),
        });
    }

    // 9. First N, catalog order.
    rows.truncate(criteria.rows);

    log::debug!(
        "query matched {} of {} products ({} columns)",
        rows.len(),
        catalog.len(),
        columns.len()
    );

    Ok(FilteredFrame {
        columns,
        products: rows.into_iter().cloned().collect(),
    })
}

/// The columns a result presents: the full catalog set, minus the skin-type
/// columns the query did not select (once any are selected).
fn project_columns(selected: &BTreeSet<SkinType>) -> Vec<Column> {
    Column::CATALOG_ORDER
        .into_iter()
        .filter(|col| match col {
            Column::Skin(t) => selected.is_empty() || selected.contains(t),
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SkinProfile;

    fn product(
        brand: &str,
        name: &str,
        price: f64,
        rank: i64,
        ingredients: Option<&str>,
        dry: bool,
        oily: bool,
    ) -> Product {
        Product {
            brand: brand.to_string(),
            name: name.to_string(),
            price,
            rank,
            ingredients: ingredients.map(str::to_string),
            skin: SkinProfile {
                dry,
                oily,
                ..SkinProfile::default()
            },
        }
    }

    /// Brands {A, B, A}, prices {10, 20, 30}, ranks {1, 3, 5}.
    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            product("A", "a-lotion", 10.0, 1, Some("Water, Glycerin"), true, false),
            product("B", "b-serum", 20.0, 3, Some("Retinol"), false, true),
            product("A", "a-cream", 30.0, 5, None, false, false),
        ])
        .unwrap()
    }

    fn brand_a(rows: usize) -> Criteria {
        Criteria {
            brand: BrandSelection::Exact("A".to_string()),
            rows,
            ..Criteria::default()
        }
    }

    // ── Brand predicate ──────────────────────────────────────────

    #[test]
    fn brand_filter_keeps_matching_rows_in_order() {
        let frame = filter(&catalog(), &brand_a(2)).unwrap();
        let names: Vec<&str> = frame.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a-lotion", "a-cream"]);
    }

    #[test]
    fn brand_match_is_exact_and_case_sensitive() {
        let criteria = Criteria {
            brand: BrandSelection::Exact("a".to_string()),
            rows: 1,
            ..Criteria::default()
        };
        // Case differs, so nothing matches.
        assert_eq!(filter(&catalog(), &criteria), Err(FilterError::NoMatches));
    }

    #[test]
    fn all_brands_sentinel_equals_no_selection() {
        let cat = catalog();
        let unselected = filter(&cat, &Criteria { rows: 3, ..Criteria::default() }).unwrap();
        let all = filter(
            &cat,
            &Criteria {
                brand: BrandSelection::AllBrands,
                rows: 3,
                ..Criteria::default()
            },
        )
        .unwrap();
        assert_eq!(unselected, all);
    }

    // ── Skin-type predicate and column projection ────────────────

    #[test]
    fn skin_type_any_match() {
        let criteria = Criteria {
            skin_types: [SkinType::Dry, SkinType::Oily].into_iter().collect(),
            rows: 2,
            ..Criteria::default()
        };
        let frame = filter(&catalog(), &criteria).unwrap();
        // a-cream suits neither category and is dropped.
        let names: Vec<&str> = frame.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a-lotion", "b-serum"]);
    }

    #[test]
    fn unselected_skin_columns_are_projected_away() {
        let criteria = Criteria {
            skin_types: [SkinType::Dry].into_iter().collect(),
            rows: 1,
            ..Criteria::default()
        };
        let frame = filter(&catalog(), &criteria).unwrap();
        assert!(frame.columns().contains(&Column::Skin(SkinType::Dry)));
        assert!(!frame.columns().contains(&Column::Skin(SkinType::Oily)));
        // Non-skin columns are untouched by the projection.
        assert!(frame.columns().contains(&Column::Price));
        assert_eq!(frame.columns().len(), 6);
    }

    #[test]
    fn no_skin_selection_presents_all_columns() {
        let frame = filter(&catalog(), &brand_a(2)).unwrap();
        assert_eq!(frame.columns(), Column::CATALOG_ORDER);
    }

    // ── Ingredient predicate ─────────────────────────────────────

    #[test]
    fn ingredient_any_match_on_trimmed_tokens() {
        let criteria = Criteria {
            ingredients: ["Glycerin".to_string()].into_iter().collect(),
            rows: 1,
            ..Criteria::default()
        };
        let frame = filter(&catalog(), &criteria).unwrap();
        assert_eq!(frame.products()[0].name, "a-lotion");
    }

    #[test]
    fn ingredient_match_is_whole_token_not_substring() {
        // "Water" is a token; "Wat" is not, even though it is a substring.
        let criteria = Criteria {
            ingredients: ["Wat".to_string()].into_iter().collect(),
            rows: 1,
            ..Criteria::default()
        };
        assert_eq!(filter(&catalog(), &criteria), Err(FilterError::NoMatches));
    }

    #[test]
    fn missing_ingredient_string_never_matches() {
        let criteria = Criteria {
            brand: BrandSelection::Exact("A".to_string()),
            ingredients: ["Water".to_string()].into_iter().collect(),
            rows: 1,
            ..Criteria::default()
        };
        let frame = filter(&catalog(), &criteria).unwrap();
        // Only a-lotion: a-cream has no ingredient data.
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.products()[0].name, "a-lotion");
    }

    // ── Numeric bounds ───────────────────────────────────────────

    #[test]
    fn blank_bounds_default_to_catalog_range() {
        let cat = catalog();
        let blank = filter(&cat, &Criteria { rows: 3, ..Criteria::default() }).unwrap();
        let explicit = filter(
            &cat,
            &Criteria {
                price_min: Some(10.0),
                price_max: Some(30.0),
                rank_min: Some(1),
                rank_max: Some(5),
                rows: 3,
                ..Criteria::default()
            },
        )
        .unwrap();
        assert_eq!(blank, explicit);
    }

    #[test]
    fn out_of_range_price_bound_is_rejected_not_clamped() {
        let criteria = Criteria {
            price_min: Some(5.0),
            rows: 1,
            ..Criteria::default()
        };
        let err = filter(&catalog(), &criteria).unwrap_err();
        assert_eq!(err, FilterError::PriceOutOfRange { min: 10.0, max: 30.0 });
        assert_eq!(err.to_string(), "price must be between 10.00 and 30.00");
    }

    #[test]
    fn out_of_range_rank_bound_is_rejected() {
        let criteria = Criteria {
            rank_max: Some(9),
            rows: 1,
            ..Criteria::default()
        };
        let err = filter(&catalog(), &criteria).unwrap_err();
        assert_eq!(err, FilterError::RankOutOfRange { min: 1, max: 5 });
        assert_eq!(err.to_string(), "rank must be between 1 and 5");
    }

    #[test]
    fn price_min_above_max_is_rejected() {
        let criteria = Criteria {
            price_min: Some(30.0),
            price_max: Some(10.0),
            rows: 1,
            ..Criteria::default()
        };
        assert_eq!(
            filter(&catalog(), &criteria),
            Err(FilterError::PriceMinAboveMax)
        );
    }

    #[test]
    fn rank_min_above_max_is_rejected() {
        let criteria = Criteria {
            rank_min: Some(5),
            rank_max: Some(1),
            rows: 1,
            ..Criteria::default()
        };
        assert_eq!(
            filter(&catalog(), &criteria),
            Err(FilterError::RankMinAboveMax)
        );
    }

    #[test]
    fn inclusive_range_filters() {
        let criteria = Criteria {
            price_min: Some(10.0),
            price_max: Some(20.0),
            rows: 2,
            ..Criteria::default()
        };
        let frame = filter(&catalog(), &criteria).unwrap();
        let prices: Vec<f64> = frame.products().iter().map(|p| p.price).collect();
        assert_eq!(prices, [10.0, 20.0]);
    }

    // ── Row count ────────────────────────────────────────────────

    #[test]
    fn zero_rows_is_rejected() {
        assert_eq!(
            filter(&catalog(), &brand_a(0)),
            Err(FilterError::NonPositiveRowCount)
        );
    }

    #[test]
    fn requesting_more_rows_than_matched_reports_both_counts() {
        let err = filter(&catalog(), &brand_a(10)).unwrap_err();
        assert_eq!(
            err,
            FilterError::RowCountExceedsMatches {
                requested: 10,
                available: 2
            }
        );
        assert_eq!(
            err.to_string(),
            "number of rows (10) exceeds filtered dataset size (2)"
        );
    }

    #[test]
    fn truncates_to_first_n_in_catalog_order() {
        let frame = filter(&catalog(), &brand_a(1)).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.products()[0].name, "a-lotion");
    }

    #[test]
    fn every_returned_row_satisfies_all_predicates() {
        let criteria = Criteria {
            brand: BrandSelection::Exact("A".to_string()),
            price_min: Some(10.0),
            price_max: Some(30.0),
            rank_min: Some(1),
            rank_max: Some(5),
            rows: 2,
            ..Criteria::default()
        };
        let frame = filter(&catalog(), &criteria).unwrap();
        assert!(frame.len() <= criteria.rows);
        for p in frame.products() {
            assert_eq!(p.brand, "A");
            assert!((10.0..=30.0).contains(&p.price));
            assert!((1..=5).contains(&p.rank));
        }
    }

    // ── CriteriaInput parsing ────────────────────────────────────

    #[test]
    fn blank_input_resolves_to_defaults() {
        let criteria = CriteriaInput::default().resolve().unwrap();
        assert_eq!(criteria.price_min, None);
        assert_eq!(criteria.price_max, None);
        assert_eq!(criteria.rank_min, None);
        assert_eq!(criteria.rank_max, None);
        assert_eq!(criteria.rows, DEFAULT_ROWS);
    }

    #[test]
    fn unparsable_price_is_invalid_input() {
        let input = CriteriaInput {
            price_min: "cheap".to_string(),
            ..CriteriaInput::default()
        };
        assert_eq!(
            input.resolve(),
            Err(FilterError::InvalidPrice {
                input: "cheap".to_string()
            })
        );
    }

    #[test]
    fn fractional_rank_is_invalid_input() {
        let input = CriteriaInput {
            rank_min: "4.5".to_string(),
            ..CriteriaInput::default()
        };
        assert!(matches!(
            input.resolve(),
            Err(FilterError::InvalidRank { .. })
        ));
    }

    #[test]
    fn negative_row_count_is_non_positive() {
        let input = CriteriaInput {
            rows: "-3".to_string(),
            ..CriteriaInput::default()
        };
        assert_eq!(input.resolve(), Err(FilterError::NonPositiveRowCount));
    }

    #[test]
    fn unparsable_row_count_is_invalid_input() {
        let input = CriteriaInput {
            rows: "ten".to_string(),
            ..CriteriaInput::default()
        };
        assert!(matches!(
            input.resolve(),
            Err(FilterError::InvalidRowCount { .. })
        ));
    }

    #[test]
    fn numeric_input_resolves() {
        let input = CriteriaInput {
            price_min: " 12.5 ".to_string(),
            rank_max: "4".to_string(),
            rows: "25".to_string(),
            ..CriteriaInput::default()
        };
        let criteria = input.resolve().unwrap();
        assert_eq!(criteria.price_min, Some(12.5));
        assert_eq!(criteria.rank_max, Some(4));
        assert_eq!(criteria.rows, 25);
    }
}
