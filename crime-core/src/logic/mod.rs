//! Logic Module - Records, Pipeline & Analytics
//!
//! - `dataset/` - Incident records (CSV export, store documents, in-memory frame)
//! - `features/` - Observation encoding and alignment to the training layout
//! - `model/` - Random forest, persisted artifact, prediction pipeline
//! - `trainer` - Offline training of the offense-group classifier
//! - `stats/` - Dashboard analytics over a filtered view

pub mod dataset;
pub mod features;
pub mod model;
pub mod trainer;
pub mod stats;
