//! Router tests against an in-memory session (no database).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crime_core::logic::dataset::{CrimeFrame, CrimeRecord};
use crime_core::logic::model::PredictionEngine;
use crime_core::logic::trainer::{self, TrainerConfig};
use crime_dashboard::config::Config;
use crime_dashboard::session::{DashboardSession, SessionHandle};
use crime_dashboard::store::LoadError;
use crime_dashboard::{create_router, AppState};

fn record(district: &str, day: &str, hour: i32, group: &str, month: i32) -> CrimeRecord {
    CrimeRecord {
        district: Some(district.into()),
        day_of_week: Some(day.into()),
        hour: Some(hour),
        offense_code_group: Some(group.into()),
        year: Some(2018),
        month: Some(month),
        lat: Some(42.3 + hour as f64 * 0.001),
        long: Some(-71.1),
        ..Default::default()
    }
}

fn records() -> Vec<CrimeRecord> {
    let mut records = Vec::new();
    for hour in 0..6 {
        records.push(record("A1", "Monday", hour, "Larceny", 6));
        records.push(record("A1", "Tuesday", hour, "Larceny", 7));
    }
    for hour in 18..24 {
        records.push(record("B2", "Saturday", hour, "Vandalism", 7));
    }
    records
}

const ADMIN_TOKEN: &str = "test-admin-token";

fn test_config() -> Config {
    Config {
        // unparsable, so a reload fails fast without a database
        database_url: "not-a-url".to_string(),
        collection: "crimes".to_string(),
        model_path: "models/does-not-exist.json".to_string(),
        port: 0,
        environment: "test".to_string(),
        admin_token: Some(ADMIN_TOKEN.to_string()),
    }
}

fn engine(with_feature_names: bool) -> Arc<PredictionEngine> {
    let config = TrainerConfig { n_estimators: 11, ..Default::default() };
    let mut artifact = trainer::train(&records(), &config).unwrap();
    if !with_feature_names {
        artifact.feature_names = None;
    }
    Arc::new(PredictionEngine::new(Arc::new(artifact)))
}

fn app_with(session: DashboardSession) -> Router {
    app_with_config(test_config(), session)
}

fn app_with_config(config: Config, session: DashboardSession) -> Router {
    create_router(AppState {
        config,
        session: SessionHandle::new(session),
    })
}

fn app() -> Router {
    app_with(DashboardSession::new(
        Ok(Arc::new(CrimeFrame::new(records()))),
        Ok(engine(true)),
    ))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post_reload(app: Router, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method("POST").uri("/api/v1/admin/reload");
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }
    send(app, request.body(Body::empty()).unwrap()).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn health_reports_session() {
    let (status, body) = get(app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["session"]["record_count"], 18);
    assert_eq!(body["session"]["model_loaded"], true);
}

#[tokio::test]
async fn filters_list_distinct_values() {
    let (status, body) = get(app(), "/api/v1/filters").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["districts"], json!(["A1", "B2"]));
    assert_eq!(body["offense_groups"], json!(["Larceny", "Vandalism"]));
    assert_eq!(body["months"], json!([6, 7]));
    assert_eq!(body["days_of_week"][0], "Monday");
}

#[tokio::test]
async fn summary_respects_filters() {
    let (status, body) = get(app(), "/api/v1/crimes/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 18);
    assert_eq!(body["most_common_offense"], "Larceny");
    assert_eq!(body["busiest_month"], 7);
    assert!(body["message"].is_null());

    let (_, body) = get(app(), "/api/v1/crimes/summary?districts=B2&months=7").await;
    assert_eq!(body["total"], 6);
    assert_eq!(body["most_common_offense"], "Vandalism");
}

#[tokio::test]
async fn empty_selection_has_no_data() {
    let (status, body) = get(app(), "/api/v1/crimes/summary?districts=Z9").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert!(body["most_common_offense"].is_null());
    assert_eq!(body["message"], "No data");
}

#[tokio::test]
async fn bad_filter_value_is_rejected() {
    let (status, body) = get(app(), "/api/v1/crimes/summary?years=twenty").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn monthly_trends_grouped() {
    let (status, body) = get(app(), "/api/v1/crimes/trends/monthly").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["points"],
        json!([
            { "month": 6, "offense_group": "Larceny", "count": 6 },
            { "month": 7, "offense_group": "Larceny", "count": 6 },
            { "month": 7, "offense_group": "Vandalism", "count": 6 },
        ])
    );
}

#[tokio::test]
async fn top_offenses_limited() {
    let (status, body) = get(app(), "/api/v1/crimes/top-offenses?limit=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offenses"], json!([{ "offense_group": "Larceny", "count": 12 }]));

    let (status, _) = get(app(), "/api/v1/crimes/top-offenses?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unparsable_limit_is_json_400() {
    let (status, body) = get(app(), "/api/v1/crimes/top-offenses?limit=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn heatmap_view_state() {
    let (status, body) = get(app(), "/api/v1/crimes/heatmap?districts=A1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["heatmap"]["points"].as_array().unwrap().len(), 12);
    assert_eq!(body["heatmap"]["view_state"]["zoom"], 11.0);
    assert_eq!(body["heatmap"]["view_state"]["pitch"], 50.0);

    let mut unlocated = records();
    for r in &mut unlocated {
        r.lat = None;
    }
    let app = app_with(DashboardSession::new(Ok(Arc::new(CrimeFrame::new(unlocated))), Ok(engine(true))));
    let (status, body) = get(app, "/api/v1/crimes/heatmap").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["heatmap"].is_null());
    assert_eq!(body["message"], "No location data available to plot heatmap.");
}

#[tokio::test]
async fn predict_known_and_unknown_categories() {
    let app = app();

    let (status, body) = post_json(
        app.clone(),
        "/api/v1/predict",
        json!({ "district": "A1", "day_of_week": "Monday", "hour": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Larceny");
    assert_eq!(body["unknown_categories"], json!([]));

    let (status, body) = post_json(
        app.clone(),
        "/api/v1/predict",
        json!({ "district": "E18", "day_of_week": "Monday", "hour": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(["Larceny", "Vandalism"].contains(&body["prediction"].as_str().unwrap()));
    assert_eq!(body["unknown_categories"], json!([{ "field": "DISTRICT", "value": "E18" }]));

    let (status, body) = get(app, "/api/v1/predict/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction_count"], 2);
    assert_eq!(body["dropped_category_count"], 1);
    // HOUR, two districts, three weekdays
    assert_eq!(body["layout"]["feature_count"], 6);
    assert_eq!(body["layout"]["feature_names"][0], "HOUR");
}

#[tokio::test]
async fn predict_validates_input() {
    let (status, _) = post_json(
        app(),
        "/api/v1/predict",
        json!({ "district": "A1", "day_of_week": "Monday", "hour": 24 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        app(),
        "/api/v1/predict",
        json!({ "district": "A1", "day_of_week": "Someday", "hour": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn predict_missing_field_is_json_400() {
    let (status, body) = post_json(app(), "/api/v1/predict", json!({ "district": "A1", "hour": 3 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("day_of_week"));
}

#[tokio::test]
async fn predict_malformed_json_is_json_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from("{\"district\": "))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn data_unavailable_is_503() {
    let app = app_with(DashboardSession::new(Err(LoadError::Empty), Ok(engine(true))));

    let (status, body) = get(app.clone(), "/api/v1/crimes/summary").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);

    let (status, _) = post_json(
        app.clone(),
        "/api/v1/predict",
        json!({ "district": "A1", "day_of_week": "Monday", "hour": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn missing_model_disables_prediction() {
    let app = app_with(DashboardSession::new(
        Ok(Arc::new(CrimeFrame::new(records()))),
        Err("model file not found".to_string()),
    ));

    let (status, body) = post_json(
        app.clone(),
        "/api/v1/predict",
        json!({ "district": "A1", "day_of_week": "Monday", "hour": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("model file not found"));

    // the dashboard itself keeps working
    let (status, _) = get(app, "/api/v1/crimes/summary").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn model_without_feature_names_is_500() {
    let app = app_with(DashboardSession::new(
        Ok(Arc::new(CrimeFrame::new(records()))),
        Ok(engine(false)),
    ));

    let (status, body) = post_json(
        app,
        "/api/v1/predict",
        json!({ "district": "A1", "day_of_week": "Monday", "hour": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("feature columns"));
}

#[tokio::test]
async fn reload_requires_admin_token() {
    let (status, body) = post_reload(app(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let (status, _) = post_reload(app(), Some("wrong-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut config = test_config();
    config.admin_token = None;
    let disabled = app_with_config(config, DashboardSession::new(Err(LoadError::Empty), Ok(engine(true))));
    let (status, body) = post_reload(disabled, Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);
}

#[tokio::test]
async fn reload_with_token_swaps_session() {
    let app = app();

    let (status, body) = post_reload(app.clone(), Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dataset_loaded"], false);
    assert_eq!(body["model_loaded"], false);

    // the unreachable store from the test config is now the active session
    let (status, _) = get(app, "/api/v1/crimes/summary").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, body) = get(app(), "/api/v1/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}
