//! Features Module - Observation Encoding
//!
//! Turns raw observations into model-ready rows.
//! The layout captured at training time is the single source of truth
//! for column set and order.

pub mod layout;
pub mod observation;
pub mod encoding;
pub mod alignment;


// Re-export common types
pub use layout::{FeatureLayout, LayoutInfo, LayoutMismatchError, FEATURE_LAYOUT_VERSION};
pub use observation::{crime_schema, FieldKind, FieldValue, InputField, Observation};
pub use encoding::{encode_observation, indicator_column, EncodedRow, EncodingError, OneHotEncoder};
pub use alignment::{align, AlignedRow, AlignmentReport, UnknownCategory};
