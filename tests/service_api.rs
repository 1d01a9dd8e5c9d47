//! End-to-end tests for the HTTP prediction surface
//!
//! Drives the full router through `tower::ServiceExt::oneshot` with a
//! repayment-status-weighted linear model standing in for the registry
//! artifact, plus deterministic doubles for the failure paths.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use predecir::api::{create_router, AppState, ErrorResponse, HealthResponse, MessageResponse};
use predecir::config::PredictionTask;
use predecir::model::{
    mock::{ConstModel, FailingModel, ShapedModel},
    LinearModel, Model,
};
use predecir::schema::CREDIT_DEFAULT_FIELDS;

/// Credit model weighing only the six repayment-status codes
///
/// Mirrors the shape of the trained artifact: late repayment statuses push
/// the score over the default threshold.
fn repayment_model() -> LinearModel {
    let features: Vec<String> = CREDIT_DEFAULT_FIELDS
        .iter()
        .map(|f| f.name.to_string())
        .collect();
    let coefficients: Vec<f64> = CREDIT_DEFAULT_FIELDS
        .iter()
        .map(|f| if f.name.starts_with("PAY_") && !f.name.starts_with("PAY_AMT") {
            1.0
        } else {
            0.0
        })
        .collect();
    LinearModel::new(features, coefficients, -1.0).expect("model")
}

fn credit_app(model: Arc<dyn Model>) -> axum::Router {
    create_router(AppState::new(
        model,
        PredictionTask::DefaultPayment,
        "models:/rumos_bank_model@champion".to_string(),
    ))
}

async fn post_json(app: axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_path(app: axum::Router, path: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, bytes.to_vec())
}

fn scenario_a_body() -> Value {
    json!({
        "LIMIT_BAL": 80000.0, "SEX": 2, "EDUCATION": 2, "MARRIAGE": 1, "AGE": 34,
        "PAY_0": 0, "PAY_2": 0, "PAY_3": 0, "PAY_4": 0, "PAY_5": -1, "PAY_6": -1,
        "BILL_AMT1": 55933.0, "BILL_AMT2": 11865.0, "BILL_AMT3": 4602.0,
        "BILL_AMT4": 34197.0, "BILL_AMT5": 27398.0, "BILL_AMT6": 28646.0,
        "PAY_AMT1": 4000.0, "PAY_AMT2": 2333.0, "PAY_AMT3": 3032.0,
        "PAY_AMT4": 28298.0, "PAY_AMT5": 2000.0, "PAY_AMT6": 2000.0
    })
}

fn scenario_b_body() -> Value {
    json!({
        "LIMIT_BAL": 30000.0, "SEX": 2, "EDUCATION": 1, "MARRIAGE": 2, "AGE": 23,
        "PAY_0": 2, "PAY_2": 2, "PAY_3": 2, "PAY_4": 2, "PAY_5": 2, "PAY_6": 2,
        "BILL_AMT1": 35932.0, "BILL_AMT2": 31864.0, "BILL_AMT3": 28635.0,
        "BILL_AMT4": 30127.0, "BILL_AMT5": 30525.0, "BILL_AMT6": 29793.0,
        "PAY_AMT1": 1800.0, "PAY_AMT2": 150.0, "PAY_AMT3": 2250.0,
        "PAY_AMT4": 1000.0, "PAY_AMT5": 0.0, "PAY_AMT6": 700.0
    })
}

// ============================================================================
// Liveness / health / metrics
// ============================================================================

#[tokio::test]
async fn test_root_returns_greeting() {
    let app = credit_app(Arc::new(repayment_model()));
    let (status, body) = get_path(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let message: MessageResponse = serde_json::from_slice(&body).expect("message");
    assert!(!message.message.is_empty());
}

#[tokio::test]
async fn test_root_answers_even_without_model() {
    let app = create_router(AppState::unbound(PredictionTask::DefaultPayment));
    let (status, _) = get_path(app, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_bound_model() {
    let app = credit_app(Arc::new(repayment_model()));
    let (status, body) = get_path(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body).expect("health");
    assert_eq!(health.status, "healthy");
    assert!(health.model_loaded);
    assert_eq!(health.model.as_deref(), Some("models:/rumos_bank_model@champion"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = credit_app(Arc::new(repayment_model()));
    let (status, body) = get_path(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).expect("utf8");
    assert!(text.contains("predecir_requests_total"));
}

// ============================================================================
// End-to-end prediction scenarios
// ============================================================================

#[tokio::test]
async fn test_scenario_a_predicts_no_default() {
    let app = credit_app(Arc::new(repayment_model()));
    let (status, body) = post_json(app, "/default_payment", scenario_a_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"prediction": 0}));
}

#[tokio::test]
async fn test_scenario_b_predicts_default() {
    let app = credit_app(Arc::new(repayment_model()));
    let (status, body) = post_json(app, "/default_payment", scenario_b_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"prediction": 1}));
}

#[tokio::test]
async fn test_prediction_is_binary_for_valid_inputs() {
    for body in [scenario_a_body(), scenario_b_body(), json!({})] {
        let app = credit_app(Arc::new(repayment_model()));
        let (status, value) = post_json(app, "/default_payment", body).await;
        assert_eq!(status, StatusCode::OK);
        let label = value["prediction"].as_i64().expect("integer label");
        assert!(label == 0 || label == 1);
    }
}

#[tokio::test]
async fn test_identical_bodies_yield_identical_predictions() {
    let (_, first) =
        post_json(credit_app(Arc::new(repayment_model())), "/default_payment", scenario_b_body())
            .await;
    let (_, second) =
        post_json(credit_app(Arc::new(repayment_model())), "/default_payment", scenario_b_body())
            .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_omitted_fields_take_defaults() {
    // Scenario A's body IS the default record; sending nothing must match it
    let (_, full) =
        post_json(credit_app(Arc::new(repayment_model())), "/default_payment", scenario_a_body())
            .await;
    let (status, empty) =
        post_json(credit_app(Arc::new(repayment_model())), "/default_payment", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(full, empty);
}

#[tokio::test]
async fn test_unrecognized_fields_are_ignored() {
    let mut body = scenario_a_body();
    body["NOT_A_FEATURE"] = json!("ignored");
    let app = credit_app(Arc::new(repayment_model()));
    let (status, value) = post_json(app, "/default_payment", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({"prediction": 0}));
}

// ============================================================================
// Validation failures (reach the caller, never the model)
// ============================================================================

#[tokio::test]
async fn test_negative_limit_bal_rejected_before_model() {
    // A failing model proves the request never reaches predict
    let app = credit_app(Arc::new(FailingModel));
    let (status, body) =
        post_json(app, "/default_payment", json!({"LIMIT_BAL": -500.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorResponse = serde_json::from_value(body).expect("error body");
    assert!(err.error.contains("LIMIT_BAL"));
}

#[tokio::test]
async fn test_non_numeric_field_rejected_with_field_name() {
    let app = credit_app(Arc::new(FailingModel));
    let (status, body) =
        post_json(app, "/default_payment", json!({"AGE": "thirty-four"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorResponse = serde_json::from_value(body).expect("error body");
    assert!(err.error.contains("AGE"));
}

#[tokio::test]
async fn test_array_body_rejected() {
    let app = credit_app(Arc::new(repayment_model()));
    let (status, _) = post_json(app, "/default_payment", json!([1, 2, 3])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Inference failures
// ============================================================================

#[tokio::test]
async fn test_unbound_model_answers_503() {
    let app = create_router(AppState::unbound(PredictionTask::DefaultPayment));
    let (status, body) = post_json(app, "/default_payment", scenario_a_body()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let err: ErrorResponse = serde_json::from_value(body).expect("error body");
    assert!(err.error.contains("no model handle"));
}

#[tokio::test]
async fn test_unbound_model_keeps_serving() {
    // A failed request must not take the process or the router down
    let state = AppState::unbound(PredictionTask::DefaultPayment);
    let (first, _) =
        post_json(create_router(state.clone()), "/default_payment", json!({})).await;
    let (second, _) = post_json(create_router(state), "/default_payment", json!({})).await;
    assert_eq!(first, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(second, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_raising_model_answers_500() {
    let app = credit_app(Arc::new(FailingModel));
    let (status, body) = post_json(app, "/default_payment", scenario_a_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorResponse = serde_json::from_value(body).expect("error body");
    assert!(err.error.contains("Inference failed"));
}

#[tokio::test]
async fn test_wrong_output_shape_answers_500() {
    for outputs in [vec![], vec![0.0, 1.0]] {
        let app = credit_app(Arc::new(ShapedModel { outputs }));
        let (status, _) = post_json(app, "/default_payment", scenario_a_body()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// ============================================================================
// Task routing
// ============================================================================

#[tokio::test]
async fn test_diabetes_task_serves_its_own_route() {
    let app = create_router(AppState::new(
        Arc::new(ConstModel { label: 1.0 }),
        PredictionTask::HasDiabetes,
        "models:/diabetes_model@2".to_string(),
    ));
    let (status, body) = post_json(app, "/has_diabetes", json!({"Glucose": 180})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"prediction": 1}));
}

#[tokio::test]
async fn test_inactive_task_route_is_not_mounted() {
    let app = credit_app(Arc::new(repayment_model()));
    let (status, _) = post_json(app, "/has_diabetes", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_negative_pregnancies_rejected_on_diabetes_route() {
    let app = create_router(AppState::new(
        Arc::new(ConstModel { label: 0.0 }),
        PredictionTask::HasDiabetes,
        String::new(),
    ));
    let (status, body) = post_json(app, "/has_diabetes", json!({"Pregnancies": -1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorResponse = serde_json::from_value(body).expect("error body");
    assert!(err.error.contains("Pregnancies"));
}
