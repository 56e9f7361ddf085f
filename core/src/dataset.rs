//! Survey Dataset Loading
//!
//! This module provides CSV loading and column access for the carbon
//! emission survey dataset. Columns are addressed by header name, never by
//! position.

use std::path::Path;

use anyhow::Result;
use tracing::info;

/// The feature columns the trainer expects, in source order.
pub const FEATURE_COLUMNS: [&str; 19] = [
    "Body Type",
    "Sex",
    "Diet",
    "How Often Shower",
    "Heating Energy Source",
    "Transport",
    "Vehicle Type",
    "Social Activity",
    "Monthly Grocery Bill",
    "Frequency of Traveling by Air",
    "Vehicle Monthly Distance Km",
    "Waste Bag Size",
    "Waste Bag Weekly Count",
    "How Long TV PC Daily Hour",
    "How Many New Clothes Monthly",
    "How Long Internet Daily Hour",
    "Energy efficiency",
    "Recycling",
    "Cooking_With",
];

/// The regression target column.
pub const TARGET_COLUMN: &str = "CarbonEmission";

/// An in-memory tabular dataset: one header row plus string-valued records.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column names from the header row
    pub headers: Vec<String>,
    /// Row-major cell values, one `Vec<String>` per record
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by header name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow::anyhow!("Dataset is missing expected column '{name}'"))
    }

    /// All values of a named column, in record order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// A named column parsed as f64 values.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row[idx].trim().parse::<f64>().map_err(|_| {
                    anyhow::anyhow!(
                        "Column '{name}' contains a non-numeric value '{}' at record {i}",
                        row[idx]
                    )
                })
            })
            .collect()
    }

    /// Verify that every named column is present, reporting all missing ones.
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .filter(|name| !self.headers.iter().any(|h| h == *name))
            .copied()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Dataset is missing expected columns: {}",
                missing.join(", ")
            ))
        }
    }
}

/// Load a CSV dataset from disk.
///
/// The first row is taken as the header. Records with a cell count that
/// differs from the header are rejected.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| anyhow::anyhow!("Failed to open dataset '{}': {e}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| anyhow::anyhow!("Failed to read dataset header: {e}"))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| anyhow::anyhow!("Failed to read dataset record {i}: {e}"))?;
        if record.len() != headers.len() {
            return Err(anyhow::anyhow!(
                "Record {i} has {} cells, header has {}",
                record.len(),
                headers.len()
            ));
        }
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    if rows.is_empty() {
        return Err(anyhow::anyhow!(
            "Dataset '{}' contains no records",
            path.display()
        ));
    }

    info!(
        "Loaded dataset '{}': {} records, {} columns",
        path.display(),
        rows.len(),
        headers.len()
    );

    Ok(Dataset { headers, rows })
}
