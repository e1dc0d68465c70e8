//! Observation - one raw, unlabeled incident description
//!
//! An observation is the caller-facing input of the prediction pipeline:
//! field name → raw value, before any encoding.

use serde::{Deserialize, Serialize};

// ============================================================================
// INPUT SCHEMA
// ============================================================================

pub const DISTRICT: &str = "DISTRICT";
pub const DAY_OF_WEEK: &str = "DAY_OF_WEEK";
pub const HOUR: &str = "HOUR";

/// Target column of the crime classifier
pub const OFFENSE_CODE_GROUP: &str = "OFFENSE_CODE_GROUP";

pub const WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// How a raw field is turned into feature columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Expanded into one indicator column per category
    Categorical,
    /// Passed through under its own name
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    pub name: String,
    pub kind: FieldKind,
}

impl InputField {
    pub fn categorical(name: &str) -> Self {
        Self { name: name.to_string(), kind: FieldKind::Categorical }
    }

    pub fn numeric(name: &str) -> Self {
        Self { name: name.to_string(), kind: FieldKind::Numeric }
    }
}

/// Predictor schema of the crime model, in the column order of the
/// historical training script
pub fn crime_schema() -> Vec<InputField> {
    vec![
        InputField::categorical(DISTRICT),
        InputField::categorical(DAY_OF_WEEK),
        InputField::numeric(HOUR),
    ]
}

// ============================================================================
// OBSERVATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view; numeric text is accepted
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Category label as it appears in an indicator column name
    pub fn category(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            FieldValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value as f64)
    }
}

/// Field name → raw value, insertion ordered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    fields: Vec<(String, FieldValue)>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three predictor fields of the crime model
    pub fn crime(district: &str, day_of_week: &str, hour: i64) -> Self {
        Self::new()
            .with(DISTRICT, district)
            .with(DAY_OF_WEEK, day_of_week)
            .with(HOUR, hour)
    }

    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Insert or replace a field, keeping its original position
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(name, _)| name == field).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
