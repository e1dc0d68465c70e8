//! Stats Module - Dashboard Analytics
//!
//! Pure functions over a filtered view of the incident table.

pub mod filter;
pub mod summary;
pub mod heatmap;

pub use filter::CrimeFilter;
pub use summary::{
    mode, monthly_trends, summary, top_offenses, OffenseCount, Summary, TrendPoint,
    DEFAULT_TOP_OFFENSES, NO_DATA,
};
pub use heatmap::{heatmap, Heatmap, HeatmapPoint, ViewState};
