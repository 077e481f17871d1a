//! Sales records and per-city aggregation over clustered city names.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use super::cluster::CityClusters;
use crate::config::ResolverConfig;
use crate::error::SalesError;

/// One sales transaction as read from the input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesRecord {
    pub city: String,
    pub product: String,
    pub units_sold: i64,
}

/// A sales record with its clustered city name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedSale {
    /// Lower-cased city as written.
    pub city: String,
    /// Lower-cased product.
    pub product: String,
    pub units_sold: i64,
    pub canonical_city: String,
}

/// Filter for [`total_units`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesQuery {
    pub city: String,
    pub product: String,
    /// Transactions below this many units are ignored.
    pub min_units: i64,
}

impl SalesQuery {
    pub fn new(city: impl Into<String>, product: impl Into<String>, min_units: i64) -> Self {
        Self {
            city: city.into(),
            product: product.into(),
            min_units,
        }
    }
}

/// Reads sales records from a JSON array or JSON Lines file.
pub fn load_sales(path: impl AsRef<Path>) -> Result<Vec<SalesRecord>, SalesError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => SalesError::InputNotFound(path.to_path_buf()),
        _ => SalesError::Io(err),
    })?;
    let records = parse_sales(&text)?;
    tracing::debug!(path = %path.display(), records = records.len(), "Loaded sales records");
    Ok(records)
}

/// Parses sales records.
///
/// Text starting with `[` is read as one JSON array; anything else as one
/// JSON object per non-blank line. Every object needs a string `city`, a
/// string `product` and an integer `sales` (or `units_sold`).
pub fn parse_sales(text: &str) -> Result<Vec<SalesRecord>, SalesError> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Err(SalesError::InvalidFormat("no sales records".to_string()));
    }

    let values: Vec<Value> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        trimmed
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|err| SalesError::InvalidRecord {
                    index,
                    reason: err.to_string(),
                })
            })
            .collect::<Result<_, _>>()?
    };

    values
        .iter()
        .enumerate()
        .map(|(index, value)| record_from_value(index, value))
        .collect()
}

fn record_from_value(index: usize, value: &Value) -> Result<SalesRecord, SalesError> {
    let invalid = |reason: String| SalesError::InvalidRecord { index, reason };

    let object = value
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object".to_string()))?;

    let city = string_field(object, "city").map_err(invalid)?;
    let product = string_field(object, "product").map_err(invalid)?;

    let units = object
        .get("sales")
        .or_else(|| object.get("units_sold"))
        .ok_or_else(|| invalid("missing field 'sales' or 'units_sold'".to_string()))?;
    let units_sold = whole_number(units)
        .ok_or_else(|| invalid(format!("units sold must be a whole number, got {units}")))?;

    Ok(SalesRecord {
        city,
        product,
        units_sold,
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Result<String, String> {
    match object.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(format!("field '{key}' must be a string, got {other}")),
        None => Err(format!("missing field '{key}'")),
    }
}

fn whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
        .map(|n| n as i64)
}

/// Clusters the records' cities and attaches a canonical city to each.
pub fn annotate(records: &[SalesRecord], config: &ResolverConfig) -> (CityClusters, Vec<AnnotatedSale>) {
    let clusters = CityClusters::build(records.iter().map(|r| r.city.as_str()), config);
    let annotated = records
        .iter()
        .enumerate()
        .map(|(index, record)| AnnotatedSale {
            city: record.city.to_lowercase(),
            product: record.product.to_lowercase(),
            units_sold: record.units_sold,
            canonical_city: clusters
                .canonical_for(index)
                .unwrap_or_default()
                .to_string(),
        })
        .collect();
    (clusters, annotated)
}

/// Outcome of a sales aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesTotal {
    /// Canonical name the query city resolved to.
    pub canonical_city: String,
    /// Transactions that passed every filter.
    pub matched: usize,
    /// Widened so sums of full-range `i64` units stay exact.
    pub total_units: i128,
}

/// Sums units of a product sold in a city, counting only transactions of at
/// least `min_units`. City spelling variants are merged first.
pub fn aggregate(records: &[SalesRecord], query: &SalesQuery, config: &ResolverConfig) -> SalesTotal {
    let (clusters, annotated) = annotate(records, config);
    let target = clusters.resolve(&query.city);
    let product = query.product.to_lowercase();

    let (matched, total) = annotated
        .iter()
        .filter(|sale| {
            sale.canonical_city == target && sale.product == product && sale.units_sold >= query.min_units
        })
        .fold((0usize, 0i128), |(n, sum), sale| (n + 1, sum + i128::from(sale.units_sold)));

    tracing::info!(
        city = %query.city,
        canonical = %target,
        product = %product,
        min_units = query.min_units,
        matched,
        total = %total,
        "Sales aggregation complete"
    );

    SalesTotal {
        canonical_city: target,
        matched,
        total_units: total,
    }
}

/// Total units only; see [`aggregate`].
pub fn total_units(records: &[SalesRecord], query: &SalesQuery, config: &ResolverConfig) -> i128 {
    aggregate(records, query, config).total_units
}

/// Loads a sales file and aggregates it with [`total_units`].
pub fn total_units_from_file(
    path: impl AsRef<Path>,
    query: &SalesQuery,
    config: &ResolverConfig,
) -> Result<i128, SalesError> {
    let records = load_sales(path)?;
    Ok(total_units(&records, query, config))
}
