//! # glow-pick
//!
//! Core engine of a cosmetic-product catalog browser: load a tabular
//! catalog, filter it by brand / skin-type suitability / ingredients /
//! price / rank, and compute the statistics behind each chart view. The
//! engine is front-end agnostic; a CLI, web form or notebook can drive it
//! with the same types.
//!
//! ## Modules
//!
//! - [`data::model`] — `Product`, `SkinType`, `Column`, and the immutable
//!   [`Catalog`] with its cached filter domains
//! - [`data::loader`] — catalog loading from CSV, JSON or Parquet
//! - [`data::filter`] — filter criteria, input validation, and the query
//!   algorithm producing a [`FilteredFrame`]
//! - [`stats`] — per-chart aggregations over a filtered result
//! - [`chart`] — tagged chart-kind dispatch onto the aggregations
//!
//! ## Quick start
//!
//! ```
//! use glow_pick::data::loader::read_csv;
//! use glow_pick::{filter, BrandSelection, Catalog, Criteria};
//!
//! let csv = "\
//! brand,name,price,rank,ingredients,Combination,Dry,Normal,Oily,Sensitive
//! Aveeno,Daily Lotion,12.50,4,\"Water, Glycerin\",1,0,1,0,1
//! Clinique,Night Cream,38.00,5,Water,0,1,0,0,0";
//!
//! let catalog = Catalog::from_products(read_csv(csv.as_bytes()).unwrap()).unwrap();
//! let criteria = Criteria {
//!     brand: BrandSelection::Exact("Aveeno".to_string()),
//!     rows: 1,
//!     ..Criteria::default()
//! };
//! let frame = filter(&catalog, &criteria).unwrap();
//! assert_eq!(frame.len(), 1);
//! assert_eq!(frame.products()[0].name, "Daily Lotion");
//! ```

pub mod chart;
pub mod data;
pub mod stats;

pub use chart::{chart_data, ChartData, ChartKind};
pub use data::filter::{
    filter, BrandSelection, Criteria, CriteriaInput, FilterError, FilteredFrame,
};
pub use data::loader::{load_file, DatasetLoadError};
pub use data::model::{Catalog, CellValue, Column, Product, SkinProfile, SkinType};
pub use stats::AggregationError;
