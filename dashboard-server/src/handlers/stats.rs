//! Crime statistics handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Serialize;

use crime_core::logic::stats::{self, Heatmap, OffenseCount, Summary, TrendPoint, NO_DATA};

use crate::models::CrimeQuery;
use crate::{AppResult, AppState};

#[derive(Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    summary: Summary,
    /// Set when the filtered view is empty
    message: Option<&'static str>,
}

#[derive(Serialize)]
pub struct TrendsResponse {
    points: Vec<TrendPoint>,
    message: Option<&'static str>,
}

#[derive(Serialize)]
pub struct TopOffensesResponse {
    offenses: Vec<OffenseCount>,
    message: Option<&'static str>,
}

#[derive(Serialize)]
pub struct HeatmapResponse {
    heatmap: Option<Heatmap>,
    message: Option<&'static str>,
}

/// Key statistics
pub async fn summary(
    State(state): State<AppState>,
    query: Result<Query<CrimeQuery>, QueryRejection>,
) -> AppResult<Json<SummaryResponse>> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let session = state.session.current();
    let rows = session.dataset()?.filter(&filter);

    let summary = stats::summary(&rows);
    let message = (summary.total == 0).then_some(NO_DATA);
    Ok(Json(SummaryResponse { summary, message }))
}

/// Monthly distribution per offense group
pub async fn monthly_trends(
    State(state): State<AppState>,
    query: Result<Query<CrimeQuery>, QueryRejection>,
) -> AppResult<Json<TrendsResponse>> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let session = state.session.current();
    let rows = session.dataset()?.filter(&filter);

    let points = stats::monthly_trends(&rows);
    let message = points.is_empty().then_some("No data to display for monthly trends.");
    Ok(Json(TrendsResponse { points, message }))
}

/// Most frequent offense groups
pub async fn top_offenses(
    State(state): State<AppState>,
    query: Result<Query<CrimeQuery>, QueryRejection>,
) -> AppResult<Json<TopOffensesResponse>> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let limit = query.limit()?;
    let session = state.session.current();
    let rows = session.dataset()?.filter(&filter);

    let offenses = stats::top_offenses(&rows, limit);
    let message = offenses.is_empty().then_some("No data to display for top crimes.");
    Ok(Json(TopOffensesResponse { offenses, message }))
}

/// Risk heatmap layer and view state
pub async fn heatmap(
    State(state): State<AppState>,
    query: Result<Query<CrimeQuery>, QueryRejection>,
) -> AppResult<Json<HeatmapResponse>> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let session = state.session.current();
    let rows = session.dataset()?.filter(&filter);

    let heatmap = stats::heatmap(&rows);
    let message = heatmap.is_none().then_some("No location data available to plot heatmap.");
    Ok(Json(HeatmapResponse { heatmap, message }))
}
