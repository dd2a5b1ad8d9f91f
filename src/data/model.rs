use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// SkinType – the fixed suitability categories
// ---------------------------------------------------------------------------

/// Skin-type suitability categories, one boolean column per category in the
/// source dataset. The order of [`SkinType::ALL`] is the column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SkinType {
    Combination,
    Dry,
    Normal,
    Oily,
    Sensitive,
}

impl SkinType {
    /// Every category, in dataset column order.
    pub const ALL: [SkinType; 5] = [
        SkinType::Combination,
        SkinType::Dry,
        SkinType::Normal,
        SkinType::Oily,
        SkinType::Sensitive,
    ];

    /// The dataset column name for this category.
    pub fn column_name(self) -> &'static str {
        match self {
            SkinType::Combination => "Combination",
            SkinType::Dry => "Dry",
            SkinType::Normal => "Normal",
            SkinType::Oily => "Oily",
            SkinType::Sensitive => "Sensitive",
        }
    }

    /// Reverse lookup from a dataset column name.
    pub fn from_column_name(name: &str) -> Option<SkinType> {
        SkinType::ALL.into_iter().find(|t| t.column_name() == name)
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// SkinProfile – per-product suitability flags
// ---------------------------------------------------------------------------

/// One boolean flag per skin-type category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkinProfile {
    pub combination: bool,
    pub dry: bool,
    pub normal: bool,
    pub oily: bool,
    pub sensitive: bool,
}

impl SkinProfile {
    /// Whether the product is marked suitable for the given category.
    pub fn suits(&self, skin_type: SkinType) -> bool {
        match skin_type {
            SkinType::Combination => self.combination,
            SkinType::Dry => self.dry,
            SkinType::Normal => self.normal,
            SkinType::Oily => self.oily,
            SkinType::Sensitive => self.sensitive,
        }
    }

    pub fn set(&mut self, skin_type: SkinType, value: bool) {
        match skin_type {
            SkinType::Combination => self.combination = value,
            SkinType::Dry => self.dry = value,
            SkinType::Normal => self.normal = value,
            SkinType::Oily => self.oily = value,
            SkinType::Sensitive => self.sensitive = value,
        }
    }

    /// True if any of the given categories is flagged.
    pub fn suits_any<I>(&self, categories: I) -> bool
    where
        I: IntoIterator<Item = SkinType>,
    {
        categories.into_iter().any(|t| self.suits(t))
    }
}

// ---------------------------------------------------------------------------
// Product – one row of the catalog
// ---------------------------------------------------------------------------

/// A single cosmetic product (one row of the source dataset).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub brand: String,
    pub name: String,
    /// Retail price, non-negative.
    pub price: f64,
    pub rank: i64,
    /// Raw comma-delimited ingredient list; `None` when the cell is missing.
    pub ingredients: Option<String>,
    pub skin: SkinProfile,
}

impl Product {
    /// Trimmed, non-empty ingredient tokens. A missing ingredient string
    /// contributes no tokens.
    pub fn ingredient_tokens(&self) -> impl Iterator<Item = &str> {
        self.ingredients
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Column – the presentable column set
// ---------------------------------------------------------------------------

/// A presentable catalog column. The skin-type columns are per-category so a
/// result can project away the ones the query did not select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Column {
    Brand,
    Name,
    Price,
    Rank,
    Ingredients,
    Skin(SkinType),
}

impl Column {
    /// Full column set in catalog order.
    pub const CATALOG_ORDER: [Column; 10] = [
        Column::Brand,
        Column::Name,
        Column::Price,
        Column::Rank,
        Column::Ingredients,
        Column::Skin(SkinType::Combination),
        Column::Skin(SkinType::Dry),
        Column::Skin(SkinType::Normal),
        Column::Skin(SkinType::Oily),
        Column::Skin(SkinType::Sensitive),
    ];

    /// Header text as it appears in the dataset.
    pub fn header(self) -> &'static str {
        match self {
            Column::Brand => "brand",
            Column::Name => "name",
            Column::Price => "price",
            Column::Rank => "rank",
            Column::Ingredients => "ingredients",
            Column::Skin(t) => t.column_name(),
        }
    }

    /// Extract this column's value from a product.
    pub fn value_of(self, product: &Product) -> CellValue {
        match self {
            Column::Brand => CellValue::Text(product.brand.clone()),
            Column::Name => CellValue::Text(product.name.clone()),
            Column::Price => CellValue::Price(product.price),
            Column::Rank => CellValue::Rank(product.rank),
            Column::Ingredients => match &product.ingredients {
                Some(s) => CellValue::Text(s.clone()),
                None => CellValue::Missing,
            },
            Column::Skin(t) => CellValue::Flag(product.skin.suits(t)),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A single rendered cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Text(String),
    Price(f64),
    Rank(i64),
    Flag(bool),
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Price(p) => write!(f, "{p:.2}"),
            CellValue::Rank(r) => write!(f, "{r}"),
            CellValue::Flag(b) => write!(f, "{}", if *b { "Yes" } else { "No" }),
            CellValue::Missing => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed catalog with pre-computed filter domains.
///
/// Immutable after construction: the loader is the only writer, everything
/// downstream reads. The derived fields (brand list, ingredient token list,
/// price/rank ranges) are computed once here and never change for the
/// session.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    brands: Vec<String>,
    ingredients: Vec<String>,
    price_min: f64,
    price_max: f64,
    rank_min: i64,
    rank_max: i64,
}

impl Catalog {
    /// Build the catalog and its derived domains from loaded products.
    /// Returns `None` for an empty product list: without rows there is no
    /// price/rank domain to validate filter bounds against.
    pub fn from_products(products: Vec<Product>) -> Option<Catalog> {
        let first = products.first()?;

        let mut brand_set: BTreeSet<String> = BTreeSet::new();
        let mut ingredient_set: BTreeSet<String> = BTreeSet::new();
        let mut price_min = first.price;
        let mut price_max = first.price;
        let mut rank_min = first.rank;
        let mut rank_max = first.rank;

        for product in &products {
            brand_set.insert(product.brand.clone());
            for token in product.ingredient_tokens() {
                ingredient_set.insert(token.to_string());
            }
            price_min = price_min.min(product.price);
            price_max = price_max.max(product.price);
            rank_min = rank_min.min(product.rank);
            rank_max = rank_max.max(product.rank);
        }

        Some(Catalog {
            products,
            brands: brand_set.into_iter().collect(),
            ingredients: ingredient_set.into_iter().collect(),
            price_min,
            price_max,
            rank_min,
            rank_max,
        })
    }

    /// All products in original dataset order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct brands, sorted. The brand dropdown domain.
    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    /// Distinct trimmed ingredient tokens across the catalog, sorted. The
    /// ingredient list-box domain.
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// Catalog-wide inclusive price range.
    pub fn price_range(&self) -> (f64, f64) {
        (self.price_min, self.price_max)
    }

    /// Catalog-wide inclusive rank range.
    pub fn rank_range(&self) -> (i64, i64) {
        (self.rank_min, self.rank_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(brand: &str, price: f64, rank: i64, ingredients: Option<&str>) -> Product {
        Product {
            brand: brand.to_string(),
            name: format!("{brand} product"),
            price,
            rank,
            ingredients: ingredients.map(str::to_string),
            skin: SkinProfile::default(),
        }
    }

    #[test]
    fn catalog_derives_sorted_distinct_brands() {
        let catalog = Catalog::from_products(vec![
            product("Clinique", 20.0, 4, None),
            product("Aveeno", 10.0, 3, None),
            product("Clinique", 30.0, 5, None),
        ])
        .unwrap();
        assert_eq!(catalog.brands(), ["Aveeno", "Clinique"]);
    }

    #[test]
    fn catalog_derives_trimmed_ingredient_tokens() {
        let catalog = Catalog::from_products(vec![
            product("A", 1.0, 1, Some("Water, Glycerin ,Water")),
            product("B", 2.0, 2, Some(" Titanium Dioxide,, ")),
            product("C", 3.0, 3, None),
        ])
        .unwrap();
        assert_eq!(
            catalog.ingredients(),
            ["Glycerin", "Titanium Dioxide", "Water"]
        );
    }

    #[test]
    fn catalog_tracks_price_and_rank_ranges() {
        let catalog = Catalog::from_products(vec![
            product("A", 12.5, 2, None),
            product("B", 3.0, 5, None),
            product("C", 40.0, 1, None),
        ])
        .unwrap();
        assert_eq!(catalog.price_range(), (3.0, 40.0));
        assert_eq!(catalog.rank_range(), (1, 5));
    }

    #[test]
    fn empty_product_list_has_no_catalog() {
        assert!(Catalog::from_products(Vec::new()).is_none());
    }

    #[test]
    fn missing_ingredients_contribute_no_tokens() {
        let p = product("A", 1.0, 1, None);
        assert_eq!(p.ingredient_tokens().count(), 0);
        let blank = product("A", 1.0, 1, Some("  ,  "));
        assert_eq!(blank.ingredient_tokens().count(), 0);
    }

    #[test]
    fn skin_profile_any_match() {
        let mut skin = SkinProfile::default();
        skin.set(SkinType::Dry, true);
        assert!(skin.suits(SkinType::Dry));
        assert!(!skin.suits(SkinType::Oily));
        assert!(skin.suits_any([SkinType::Oily, SkinType::Dry]));
        assert!(!skin.suits_any([SkinType::Oily, SkinType::Sensitive]));
    }

    #[test]
    fn column_headers_match_dataset_schema() {
        let headers: Vec<&str> = Column::CATALOG_ORDER.iter().map(|c| c.header()).collect();
        assert_eq!(
            headers,
            [
                "brand",
                "name",
                "price",
                "rank",
                "ingredients",
                "Combination",
                "Dry",
                "Normal",
                "Oily",
                "Sensitive"
            ]
        );
    }
}
