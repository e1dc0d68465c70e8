//! Heatmap layer for the risk map.

use serde::{Deserialize, Serialize};

use crate::logic::dataset::CrimeRecord;

pub const HEATMAP_ZOOM: f64 = 11.0;
pub const HEATMAP_PITCH: f64 = 50.0;
pub const HEATMAP_OPACITY: f64 = 0.9;
pub const HEATMAP_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    /// `[longitude, latitude]`
    pub position: [f64; 2],
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub points: Vec<HeatmapPoint>,
    pub view_state: ViewState,
    pub opacity: f64,
    pub threshold: f64,
}

/// `None` when no record has both coordinates
pub fn heatmap(records: &[&CrimeRecord]) -> Option<Heatmap> {
    let points: Vec<HeatmapPoint> = records
        .iter()
        .filter_map(|r| r.location())
        .map(|(lat, long)| HeatmapPoint { position: [long, lat], weight: 1.0 })
        .collect();

    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let (sum_long, sum_lat) = points
        .iter()
        .fold((0.0, 0.0), |(lo, la), p| (lo + p.position[0], la + p.position[1]));

    Some(Heatmap {
        view_state: ViewState {
            latitude: sum_lat / n,
            longitude: sum_long / n,
            zoom: HEATMAP_ZOOM,
            pitch: HEATMAP_PITCH,
        },
        points,
        opacity: HEATMAP_OPACITY,
        threshold: HEATMAP_THRESHOLD,
    })
}
