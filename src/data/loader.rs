use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Catalog, Product, SkinProfile, SkinType};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal dataset loading errors. "File not found" is distinct from every
/// parse/schema failure so a front-end can word its startup dialog.
#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("dataset file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("malformed dataset: {0}")]
    Format(String),

    #[error("dataset row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("dataset contains no rows")]
    Empty,
}

fn parse_err(row: usize, message: impl Into<String>) -> DatasetLoadError {
    DatasetLoadError::Parse {
        row,
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a product catalog from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the fixed catalog columns (primary format)
/// * `.json`    – `[{ "brand": ..., "price": ..., ... }, ...]`
/// * `.parquet` – same schema as scalar Arrow columns
pub fn load_file(path: &Path) -> Result<Catalog, DatasetLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let products = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DatasetLoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!("loaded {} products from {}", products.len(), path.display());
    Catalog::from_products(products).ok_or(DatasetLoadError::Empty)
}

fn open(path: &Path) -> Result<File, DatasetLoadError> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DatasetLoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DatasetLoadError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Field parsing helpers (shared by the CSV and JSON loaders)
// ---------------------------------------------------------------------------

fn parse_price(s: &str, row: usize) -> Result<f64, DatasetLoadError> {
    let value = s
        .trim()
        .parse::<f64>()
        .map_err(|_| parse_err(row, format!("'{s}' is not a valid price")))?;
    check_price(value, row)
}

fn check_price(value: f64, row: usize) -> Result<f64, DatasetLoadError> {
    if !value.is_finite() || value < 0.0 {
        return Err(parse_err(row, format!("price must be non-negative, got {value}")));
    }
    Ok(value)
}

fn parse_rank(s: &str, row: usize) -> Result<i64, DatasetLoadError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| parse_err(row, format!("'{s}' is not a valid rank")))
}

fn parse_flag(s: &str, row: usize, column: &str) -> Result<bool, DatasetLoadError> {
    match s.trim() {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" => Ok(false),
        other => Err(parse_err(
            row,
            format!("'{other}' is not a 0/1 flag for column '{column}'"),
        )),
    }
}

/// An empty ingredients cell means "no ingredient data", not an empty token.
fn normalize_ingredients(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Product>, DatasetLoadError> {
    read_csv(open(path)?)
}

/// Parse catalog CSV from any reader. Public so in-memory sources (tests,
/// embedded fixtures) skip the filesystem.
pub fn read_csv<R: std::io::Read>(source: R) -> Result<Vec<Product>, DatasetLoadError> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DatasetLoadError::Format(format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let column = |name: &str| -> Result<usize, DatasetLoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DatasetLoadError::MissingColumn(name.to_string()))
    };

    let brand_idx = column("brand")?;
    let name_idx = column("name")?;
    let price_idx = column("price")?;
    let rank_idx = column("rank")?;
    let ingredients_idx = column("ingredients")?;
    let mut skin_idx = [0usize; SkinType::ALL.len()];
    for (slot, skin_type) in skin_idx.iter_mut().zip(SkinType::ALL) {
        *slot = column(skin_type.column_name())?;
    }

    let mut products = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| parse_err(row_no, format!("unreadable CSV record: {e}")))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let mut skin = SkinProfile::default();
        for (idx, skin_type) in skin_idx.iter().zip(SkinType::ALL) {
            skin.set(
                skin_type,
                parse_flag(field(*idx), row_no, skin_type.column_name())?,
            );
        }

        products.push(Product {
            brand: field(brand_idx).to_string(),
            name: field(name_idx).to_string(),
            price: parse_price(field(price_idx), row_no)?,
            rank: parse_rank(field(rank_idx), row_no)?,
            ingredients: normalize_ingredients(field(ingredients_idx)),
            skin,
        });
    }

    Ok(products)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "brand": "Aveeno",
///     "name": "Daily Moisturizer",
///     "price": 12.5,
///     "rank": 4,
///     "ingredients": "Water, Glycerin",
///     "Combination": 1, "Dry": 0, "Normal": 1, "Oily": 0, "Sensitive": 1
///   },
///   ...
/// ]
/// ```
///
/// Skin flags may be JSON booleans or 0/1 numbers.
fn load_json(path: &Path) -> Result<Vec<Product>, DatasetLoadError> {
    // Open first so a missing file reports NotFound, not a JSON error.
    let mut text = String::new();
    std::io::Read::read_to_string(&mut open(path)?, &mut text).map_err(|e| {
        DatasetLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    read_json(&text)
}

/// Parse catalog JSON from a string. Public for in-memory sources.
pub fn read_json(text: &str) -> Result<Vec<Product>, DatasetLoadError> {
    let root: JsonValue = serde_json::from_str(text)
        .map_err(|e| DatasetLoadError::Format(format!("parsing JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| DatasetLoadError::Format("expected top-level JSON array".to_string()))?;

    let mut products = Vec::with_capacity(records.len());

    for (row, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| parse_err(row, "not a JSON object"))?;

        let mut skin = SkinProfile::default();
        for skin_type in SkinType::ALL {
            skin.set(skin_type, json_flag(obj, skin_type.column_name(), row)?);
        }

        let ingredients = match obj.get("ingredients") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => normalize_ingredients(s),
            Some(other) => {
                return Err(parse_err(row, format!("'ingredients' is not a string: {other}")))
            }
        };

        products.push(Product {
            brand: json_str(obj, "brand", row)?,
            name: json_str(obj, "name", row)?,
            price: check_price(json_f64(obj, "price", row)?, row)?,
            rank: json_i64(obj, "rank", row)?,
            ingredients,
            skin,
        });
    }

    Ok(products)
}

fn json_field<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    key: &str,
) -> Result<&'a JsonValue, DatasetLoadError> {
    obj.get(key)
        .ok_or_else(|| DatasetLoadError::MissingColumn(key.to_string()))
}

fn json_str(
    obj: &serde_json::Map<String, JsonValue>,
    key: &str,
    row: usize,
) -> Result<String, DatasetLoadError> {
    json_field(obj, key)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| parse_err(row, format!("'{key}' is not a string")))
}

fn json_f64(
    obj: &serde_json::Map<String, JsonValue>,
    key: &str,
    row: usize,
) -> Result<f64, DatasetLoadError> {
    json_field(obj, key)?
        .as_f64()
        .ok_or_else(|| parse_err(row, format!("'{key}' is not a number")))
}

fn json_i64(
    obj: &serde_json::Map<String, JsonValue>,
    key: &str,
    row: usize,
) -> Result<i64, DatasetLoadError> {
    json_field(obj, key)?
        .as_i64()
        .ok_or_else(|| parse_err(row, format!("'{key}' is not an integer")))
}

fn json_flag(
    obj: &serde_json::Map<String, JsonValue>,
    key: &str,
    row: usize,
) -> Result<bool, DatasetLoadError> {
    match json_field(obj, key)? {
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(parse_err(row, format!("'{key}' is not a 0/1 flag"))),
        },
        other => Err(parse_err(row, format!("'{key}' is not a 0/1 flag: {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet catalog.
///
/// Expected schema: scalar columns `brand`/`name`/`ingredients` (Utf8,
/// `ingredients` nullable), `price` (Float64/Float32 or integer), `rank`
/// (Int64/Int32), and one Boolean or 0/1 integer column per skin type.
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Product>, DatasetLoadError> {
    let file = open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DatasetLoadError::Format(format!("reading parquet metadata: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| DatasetLoadError::Format(format!("building parquet reader: {e}")))?;

    let mut products = Vec::new();
    let mut row_base = 0usize;

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| DatasetLoadError::Format(format!("reading parquet record batch: {e}")))?;

        let brand_col = batch_column(&batch, "brand")?;
        let name_col = batch_column(&batch, "name")?;
        let price_col = batch_column(&batch, "price")?;
        let rank_col = batch_column(&batch, "rank")?;
        let ingredients_col = batch_column(&batch, "ingredients")?;
        let mut skin_cols = Vec::with_capacity(SkinType::ALL.len());
        for skin_type in SkinType::ALL {
            skin_cols.push(batch_column(&batch, skin_type.column_name())?);
        }

        for batch_row in 0..batch.num_rows() {
            let row = row_base + batch_row;

            let brand = extract_string(brand_col, batch_row)
                .map_err(|m| parse_err(row, format!("'brand': {m}")))?
                .ok_or_else(|| parse_err(row, "'brand' is null"))?;
            let name = extract_string(name_col, batch_row)
                .map_err(|m| parse_err(row, format!("'name': {m}")))?
                .ok_or_else(|| parse_err(row, "'name' is null"))?;
            let price = extract_f64(price_col, batch_row)
                .map_err(|m| parse_err(row, format!("'price': {m}")))
                .and_then(|v| check_price(v, row))?;
            let rank = extract_i64(rank_col, batch_row)
                .map_err(|m| parse_err(row, format!("'rank': {m}")))?;
            let ingredients = extract_string(ingredients_col, batch_row)
                .map_err(|m| parse_err(row, format!("'ingredients': {m}")))?
                .as_deref()
                .and_then(normalize_ingredients);

            let mut skin = SkinProfile::default();
            for (col, skin_type) in skin_cols.iter().zip(SkinType::ALL) {
                let flag = extract_flag(col, batch_row)
                    .map_err(|m| parse_err(row, format!("'{}': {m}", skin_type.column_name())))?;
                skin.set(skin_type, flag);
            }

            products.push(Product {
                brand,
                name,
                price,
                rank,
                ingredients,
                skin,
            });
        }

        row_base += batch.num_rows();
    }

    Ok(products)
}

// -- Arrow helpers --

fn batch_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a Arc<dyn Array>, DatasetLoadError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| DatasetLoadError::MissingColumn(name.to_string()))?;
    Ok(batch.column(idx))
}

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>, String> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or("expected StringArray")?;
            Ok(Some(arr.value(row).to_string()))
        }
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            Ok(Some(arr.value(row).to_string()))
        }
        other => Err(format!("expected a string column, got {other:?}")),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64, String> {
    if col.is_null(row) {
        return Err("null value".to_string());
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        other => Err(format!("expected a numeric column, got {other:?}")),
    }
}

fn extract_i64(col: &Arc<dyn Array>, row: usize) -> Result<i64, String> {
    if col.is_null(row) {
        return Err("null value".to_string());
    }
    match col.data_type() {
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as i64)
        }
        other => Err(format!("expected an integer column, got {other:?}")),
    }
}

fn extract_flag(col: &Arc<dyn Array>, row: usize) -> Result<bool, String> {
    if col.is_null(row) {
        return Err("null value".to_string());
    }
    match col.data_type() {
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Int64 | DataType::Int32 => match extract_i64(col, row)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(format!("{other} is not a 0/1 flag")),
        },
        other => Err(format!("expected a boolean column, got {other:?}")),
    }
}
