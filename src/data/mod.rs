/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Catalog
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Catalog  │  Vec<Product>, cached brand/ingredient domains, ranges
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply criteria → FilteredFrame (rows + column projection)
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
