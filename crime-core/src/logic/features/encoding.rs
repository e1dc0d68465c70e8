//! One-hot Encoding
//!
//! Categorical field → one indicator column per category, named
//! `<field>_<category>`. Numeric fields pass through under their own name.
//!
//! Column order produced by [`OneHotEncoder::fit`]:
//! numeric fields first (schema order), then each categorical field
//! (schema order) with its categories sorted ascending.

use std::collections::BTreeSet;

use ndarray::Array2;

use super::layout::FeatureLayout;
use super::observation::{FieldKind, FieldValue, InputField, Observation};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error("required field `{0}` is missing from the observation")]
    MissingField(String),

    #[error("field `{field}` expects a number, got `{value}`")]
    NotNumeric { field: String, value: String },
}

// ============================================================================
// LOCAL ENCODING (single row)
// ============================================================================

/// One column of a locally encoded row
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedColumn {
    pub name: String,
    /// Source field of this column
    pub field: String,
    /// Category for indicator columns, `None` for pass-through numerics
    pub category: Option<String>,
    pub value: f32,
}

/// Single-row encoding of an observation, before alignment.
/// Only the categories present in the observation have a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedRow {
    columns: Vec<EncodedColumn>,
}

impl EncodedRow {
    pub fn columns(&self) -> &[EncodedColumn] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

pub fn indicator_column(field: &str, category: &str) -> String {
    format!("{}_{}", field, category)
}

/// Build the one-row table for an observation.
///
/// Every schema field must be present. Fields outside the schema are
/// encoded by their value type (text → indicator, number → pass-through);
/// alignment later drops whatever the model does not know.
pub fn encode_observation(schema: &[InputField], observation: &Observation) -> Result<EncodedRow, EncodingError> {
    for field in schema {
        if observation.get(&field.name).is_none() {
            return Err(EncodingError::MissingField(field.name.clone()));
        }
    }

    let mut columns = Vec::with_capacity(observation.len());

    for (name, value) in observation.iter() {
        let kind = schema
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.kind)
            .unwrap_or(match value {
                FieldValue::Number(_) => FieldKind::Numeric,
                FieldValue::Text(_) => FieldKind::Categorical,
            });

        columns.push(encode_value(name, kind, value)?);
    }

    Ok(EncodedRow { columns })
}

fn encode_value(field: &str, kind: FieldKind, value: &FieldValue) -> Result<EncodedColumn, EncodingError> {
    match kind {
        FieldKind::Numeric => {
            let number = value.as_number().ok_or_else(|| EncodingError::NotNumeric {
                field: field.to_string(),
                value: value.category(),
            })?;
            Ok(EncodedColumn {
                name: field.to_string(),
                field: field.to_string(),
                category: None,
                value: number as f32,
            })
        }
        FieldKind::Categorical => {
            let category = value.category();
            Ok(EncodedColumn {
                name: indicator_column(field, &category),
                field: field.to_string(),
                category: Some(category),
                value: 1.0,
            })
        }
    }
}

// ============================================================================
// TRAINING-TIME ENCODER (many rows)
// ============================================================================

/// Encoder fit on the full training set; owns the resulting layout
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    schema: Vec<InputField>,
    layout: FeatureLayout,
}

impl OneHotEncoder {
    /// Derive the layout from every category observed in `rows`
    pub fn fit(schema: &[InputField], rows: &[Observation]) -> Result<Self, EncodingError> {
        let mut categories: Vec<BTreeSet<String>> = vec![BTreeSet::new(); schema.len()];

        for row in rows {
            for (slot, field) in schema.iter().enumerate() {
                let value = row
                    .get(&field.name)
                    .ok_or_else(|| EncodingError::MissingField(field.name.clone()))?;
                if field.kind == FieldKind::Categorical {
                    categories[slot].insert(value.category());
                }
            }
        }

        let mut columns = Vec::new();
        for field in schema.iter().filter(|f| f.kind == FieldKind::Numeric) {
            columns.push(field.name.clone());
        }
        for (slot, field) in schema.iter().enumerate() {
            if field.kind == FieldKind::Categorical {
                columns.extend(categories[slot].iter().map(|c| indicator_column(&field.name, c)));
            }
        }

        Ok(Self::from_layout(schema, FeatureLayout::new(columns)))
    }

    pub fn from_layout(schema: &[InputField], layout: FeatureLayout) -> Self {
        Self { schema: schema.to_vec(), layout }
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Encode many rows straight into layout order
    pub fn transform(&self, rows: &[Observation]) -> Result<Array2<f32>, EncodingError> {
        let mut matrix = Array2::<f32>::zeros((rows.len(), self.layout.len()));

        for (i, row) in rows.iter().enumerate() {
            let encoded = encode_observation(&self.schema, row)?;
            for column in encoded.columns() {
                if let Some(j) = self.layout.index_of(&column.name) {
                    matrix[[i, j]] = column.value;
                }
            }
        }

        Ok(matrix)
    }
}
