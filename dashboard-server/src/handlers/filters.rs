//! Filter options handler

use axum::{extract::State, Json};
use serde::Serialize;

use crime_core::logic::dataset::FilterOptions;
use crime_core::logic::features::observation::WEEKDAYS;

use crate::{AppResult, AppState};

#[derive(Serialize)]
pub struct FiltersResponse {
    #[serde(flatten)]
    options: FilterOptions,
    days_of_week: [&'static str; 7],
    hours: [u8; 2],
}

/// Values for the sidebar filters and the prediction form
pub async fn options(State(state): State<AppState>) -> AppResult<Json<FiltersResponse>> {
    let session = state.session.current();
    let dataset = session.dataset()?;

    Ok(Json(FiltersResponse {
        options: dataset.options(),
        days_of_week: WEEKDAYS,
        hours: [0, 23],
    }))
}
