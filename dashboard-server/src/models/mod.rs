//! Request & response models

pub mod query;
pub mod prediction;

pub use query::*;
pub use prediction::*;
