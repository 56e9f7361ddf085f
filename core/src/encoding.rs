//! Feature Schema and One-Hot Encoding
//!
//! This module derives the encoded feature layout from a training dataset
//! and builds numeric design matrices from it. The schema is the single
//! source of truth for column count and order: it is serialized into the
//! model artifact and re-used at inference time, never re-derived.
//!
//! Layout: numeric source columns pass through one-to-one in source order,
//! followed by one indicator column per distinct value of each categorical
//! source column (values sorted for determinism).

use std::collections::BTreeSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;

/// One column of the encoded feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodedColumn {
    /// A numeric source column carried through unchanged
    Numeric { source: String },
    /// An indicator column: 1.0 when `source` holds `value`, else 0.0
    Indicator { source: String, value: String },
}

/// The ordered list of encoded columns a model was fitted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub columns: Vec<EncodedColumn>,
}

impl FeatureSchema {
    /// Width of the encoded feature vector.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Derive a schema from the dataset.
    ///
    /// A feature column is numeric when every value parses as f64;
    /// otherwise it is categorical and expands to one indicator column per
    /// distinct value observed in this dataset.
    pub fn fit(dataset: &Dataset, feature_columns: &[&str]) -> Result<Self> {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();

        for &name in feature_columns {
            let values = dataset.column(name)?;
            if is_numeric_column(&values) {
                numeric.push(EncodedColumn::Numeric {
                    source: name.to_string(),
                });
            } else {
                let distinct: BTreeSet<&str> = values.iter().map(|v| v.trim()).collect();
                for value in distinct {
                    categorical.push(EncodedColumn::Indicator {
                        source: name.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }

        let mut columns = numeric;
        columns.append(&mut categorical);

        debug!(
            "Fitted feature schema: {} encoded columns from {} source columns",
            columns.len(),
            feature_columns.len()
        );

        Ok(FeatureSchema { columns })
    }

    /// Build the design matrix for a dataset under this schema.
    ///
    /// Numeric cells that fail to parse encode as 0.0; categorical values
    /// unseen at fit time encode as an all-zero indicator block.
    pub fn transform(&self, dataset: &Dataset) -> Result<Vec<Vec<f64>>> {
        // Resolve source columns once, not per record.
        let mut source_indices = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let source = match column {
                EncodedColumn::Numeric { source } => source,
                EncodedColumn::Indicator { source, .. } => source,
            };
            source_indices.push(dataset.column_index(source)?);
        }

        let mut matrix = Vec::with_capacity(dataset.len());
        for row in &dataset.rows {
            let mut encoded = Vec::with_capacity(self.columns.len());
            for (column, &idx) in self.columns.iter().zip(&source_indices) {
                let cell = row[idx].trim();
                let value = match column {
                    EncodedColumn::Numeric { .. } => cell.parse::<f64>().unwrap_or(0.0),
                    EncodedColumn::Indicator { value, .. } => {
                        if cell == value.as_str() {
                            1.0
                        } else {
                            0.0
                        }
                    }
                };
                encoded.push(value);
            }
            matrix.push(encoded);
        }

        Ok(matrix)
    }
}

fn is_numeric_column(values: &[&str]) -> bool {
    values
        .iter()
        .all(|v| !v.trim().is_empty() && v.trim().parse::<f64>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> Dataset {
        Dataset {
            headers: vec!["Diet".into(), "Monthly Grocery Bill".into(), "Transport".into()],
            rows: vec![
                vec!["vegan".into(), "230".into(), "walk/bicycle".into()],
                vec!["omnivore".into(), "114".into(), "public".into()],
                vec!["vegan".into(), "180".into(), "private".into()],
            ],
        }
    }

    #[test]
    fn test_schema_layout_is_deterministic() {
        let dataset = sample_dataset();
        let schema = FeatureSchema::fit(
            &dataset,
            &["Diet", "Monthly Grocery Bill", "Transport"],
        )
        .unwrap();

        // Numeric pass-through first, then indicators per source column with
        // values sorted.
        assert_eq!(
            schema.columns,
            vec![
                EncodedColumn::Numeric {
                    source: "Monthly Grocery Bill".into()
                },
                EncodedColumn::Indicator {
                    source: "Diet".into(),
                    value: "omnivore".into()
                },
                EncodedColumn::Indicator {
                    source: "Diet".into(),
                    value: "vegan".into()
                },
                EncodedColumn::Indicator {
                    source: "Transport".into(),
                    value: "private".into()
                },
                EncodedColumn::Indicator {
                    source: "Transport".into(),
                    value: "public".into()
                },
                EncodedColumn::Indicator {
                    source: "Transport".into(),
                    value: "walk/bicycle".into()
                },
            ]
        );
    }

    #[test]
    fn test_transform_sets_single_indicator_per_block() {
        let dataset = sample_dataset();
        let schema = FeatureSchema::fit(
            &dataset,
            &["Diet", "Monthly Grocery Bill", "Transport"],
        )
        .unwrap();

        let matrix = schema.transform(&dataset).unwrap();
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix[0], vec![230.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(matrix[1], vec![114.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(matrix[2], vec![180.0, 0.0, 1.0, 1.0, 0.0, 0.0]);

        // Exactly one 1.0 in each categorical block.
        for row in &matrix {
            assert_eq!(row[1] + row[2], 1.0);
            assert_eq!(row[3] + row[4] + row[5], 1.0);
        }
    }

    #[test]
    fn test_transform_unseen_category_is_all_zero() {
        let dataset = sample_dataset();
        let schema = FeatureSchema::fit(
            &dataset,
            &["Diet", "Monthly Grocery Bill", "Transport"],
        )
        .unwrap();

        let unseen = Dataset {
            headers: dataset.headers.clone(),
            rows: vec![vec!["pescatarian".into(), "90".into(), "public".into()]],
        };
        let matrix = schema.transform(&unseen).unwrap();
        assert_eq!(matrix[0], vec![90.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_schema_roundtrips_through_serde() {
        let dataset = sample_dataset();
        let schema = FeatureSchema::fit(
            &dataset,
            &["Diet", "Monthly Grocery Bill", "Transport"],
        )
        .unwrap();

        let bytes = bincode::serialize(&schema).unwrap();
        let restored: FeatureSchema = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, schema);
        assert_eq!(restored.width(), 6);
    }
}
