//! Crime Dashboard - Core Library
//!
//! Incident records, the feature alignment & prediction pipeline,
//! offline training and the dashboard analytics.

pub mod constants;
pub mod logic;
