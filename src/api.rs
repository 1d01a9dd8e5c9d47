//! HTTP API for model predictions
//!
//! Provides the JSON surface over the bound model handle using axum.
//!
//! ## Endpoints
//!
//! - `GET /` - Greeting / liveness probe
//! - `GET /health` - Structured health check
//! - `GET /metrics` - Prometheus-formatted metrics
//! - `POST /default_payment` or `POST /has_diabetes` - One-row prediction
//!   (whichever matches the configured task)
//!
//! ## Example
//!
//! ```rust,ignore
//! use predecir::api::{create_router, AppState};
//!
//! let state = AppState::new(Arc::new(model), task, uri.to_string());
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::PredictionTask,
    error::PredecirError,
    metrics::MetricsCollector,
    model::Model,
    schema::{coerce_row, fields_for},
};

/// Application state shared across handlers
///
/// Built once at startup and injected into the router; the model handle is
/// immutable after construction. `model` is `None` only when no handle has
/// been bound (startup never completed, or a deliberately unbound test
/// state) - the predict handler answers 503 then.
#[derive(Clone)]
pub struct AppState {
    model: Option<Arc<dyn Model>>,
    task: PredictionTask,
    model_reference: String,
    metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Create state around a bound model handle
    #[must_use]
    pub fn new(model: Arc<dyn Model>, task: PredictionTask, model_reference: String) -> Self {
        Self {
            model: Some(model),
            task,
            model_reference,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Create state with no model bound
    ///
    /// Requests against the predict route answer 503 until a bound state
    /// replaces this one. Exists for the provider-outage path and tests.
    #[must_use]
    pub fn unbound(task: PredictionTask) -> Self {
        Self {
            model: None,
            task,
            model_reference: String::new(),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// The task this deployment serves
    #[must_use]
    pub fn task(&self) -> PredictionTask {
        self.task
    }

    /// Metrics collector shared with the handlers
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

/// Greeting response for the root route
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable acknowledgment
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Whether a model handle is bound
    pub model_loaded: bool,
    /// Registry reference of the bound model, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Prediction response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Scalar label from the model; integral labels serialize as integers
    pub prediction: Value,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Shorthand error type for the handlers
type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build an error response, recording a failure metric
fn api_err(state: &AppState, status: StatusCode, msg: impl std::fmt::Display) -> ApiError {
    state.metrics.record_failure();
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
}

/// Create the router for the configured task
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(state.task.route(), post(predict_handler))
        .with_state(state)
}

/// Liveness probe; answers regardless of model handle state
async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Prediction service is running".to_string(),
    })
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        model_loaded: state.model.is_some(),
        model: if state.model_reference.is_empty() {
            None
        } else {
            Some(state.model_reference.clone())
        },
    })
}

/// Metrics handler - returns Prometheus-formatted metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.to_prometheus()
}

/// Prediction handler
///
/// Coerces the body against the active schema, runs a single-row batch
/// through the model, and returns the first (only) output. Validation
/// failures answer 400 naming the field; an unbound handle answers 503; a
/// failing model answers 500. Per-request failures never affect the handle
/// or other in-flight requests.
async fn predict_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<PredictResponse>, ApiError> {
    let start = Instant::now();

    let row = coerce_row(fields_for(state.task), &body)
        .map_err(|e| api_err(&state, StatusCode::BAD_REQUEST, e))?;

    let model = state.model.as_ref().ok_or_else(|| {
        api_err(
            &state,
            StatusCode::SERVICE_UNAVAILABLE,
            PredecirError::inference("no model handle bound"),
        )
    })?;

    let outputs = model
        .predict(&[row])
        .map_err(|e| api_err(&state, StatusCode::INTERNAL_SERVER_ERROR, e))?;

    // A single-row batch must yield exactly one output
    if outputs.len() != 1 {
        return Err(api_err(
            &state,
            StatusCode::INTERNAL_SERVER_ERROR,
            PredecirError::inference(format!(
                "model returned {} outputs for a single-row batch",
                outputs.len()
            )),
        ));
    }

    state.metrics.record_success(start.elapsed());
    Ok(Json(PredictResponse {
        prediction: label_value(outputs[0]),
    }))
}

/// Encode a scalar label, keeping integral labels as JSON integers
#[allow(clippy::cast_possible_truncation)]
fn label_value(label: f64) -> Value {
    if label.is_finite() && label.fract() == 0.0 {
        serde_json::json!(label as i64)
    } else {
        serde_json::json!(label)
    }
}
