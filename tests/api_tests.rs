//! End-to-end tests for the HTTP surface, using a stub classifier.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use loan_approval_service::metrics::ServiceMetrics;
use loan_approval_service::models::{ModelInfo, ProbabilityModel};
use loan_approval_service::server::{build_router, AppState};
use loan_approval_service::types::application::REQUIRED_FIELDS;
use loan_approval_service::{ApprovalScorer, InferenceError};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Deterministic stand-in for the XGBoost model.
///
/// P(class 1) is derived from the number of defaults so different inputs
/// give different, reproducible answers.
struct StubModel {
    input_width: Option<usize>,
}

impl ProbabilityModel for StubModel {
    fn predict_proba(&self, features: &[f32]) -> Result<[f64; 2], InferenceError> {
        if let Some(expected) = self.input_width {
            if expected != features.len() {
                return Err(InferenceError::ShapeMismatch {
                    expected,
                    actual: features.len(),
                });
            }
        }
        let p1 = (0.1 + 0.2 * features[6] as f64).min(1.0);
        Ok([1.0 - p1, p1])
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            name: "stub".to_string(),
            path: None,
            input_width: self.input_width,
        }
    }
}

fn app_with(model: StubModel) -> (Router, Arc<ServiceMetrics>) {
    let metrics = Arc::new(ServiceMetrics::new());
    let state = AppState::new(ApprovalScorer::new(Arc::new(model)), metrics.clone());
    (build_router(state, &[]), metrics)
}

fn app() -> Router {
    app_with(StubModel {
        input_width: Some(48),
    })
    .0
}

fn sample_application() -> Value {
    json!({
        "amount": 5000,
        "term": 12,
        "all_active_acc": 2,
        "acc_opened_12m": 1,
        "acc_age": 36,
        "balance": 1200,
        "no_of_defaults": 0,
        "loan_purpose": "vehicle",
        "employment_type": "full"
    })
}

async fn post_dashboard(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let resp = app
        .oneshot(
            Request::post("/apply/results/dashboard")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn sample_application_returns_prediction_in_range() {
    let (status, body) = post_dashboard(app(), sample_application().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    let prediction = body["prediction"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&prediction));
    assert!((prediction - 90.0).abs() < 1e-9);
}

#[tokio::test]
async fn prediction_is_one_minus_class_one_probability() {
    let mut application = sample_application();
    application["no_of_defaults"] = json!(2);

    let (_, body) = post_dashboard(app(), application.to_string()).await;

    // p1 = 0.1 + 0.2 * 2 = 0.5
    assert!((body["prediction"].as_f64().unwrap() - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn each_missing_field_returns_error_body() {
    for name in REQUIRED_FIELDS {
        let mut application = sample_application();
        application.as_object_mut().unwrap().remove(name);

        let (status, body) = post_dashboard(app(), application.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("prediction").is_none(), "{name}");
        assert_eq!(
            body["error"].as_str().unwrap(),
            format!("missing required field: {name}")
        );
    }
}

#[tokio::test]
async fn identical_requests_give_identical_responses() {
    let router = app();
    let first = post_dashboard(router.clone(), sample_application().to_string()).await;
    let second = post_dashboard(router, sample_application().to_string()).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn unknown_category_still_scores() {
    let mut application = sample_application();
    application["loan_purpose"] = json!("holiday");
    application["employment_type"] = json!("Full");

    let (_, body) = post_dashboard(app(), application.to_string()).await;

    assert!(body["prediction"].is_f64());
}

#[tokio::test]
async fn classifier_shape_mismatch_returns_error_body() {
    let (router, metrics) = app_with(StubModel {
        input_width: Some(16),
    });

    let (status, body) = post_dashboard(router, sample_application().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "error": "feature shape mismatch, expected: 16, got 48" })
    );
    assert_eq!(
        metrics.snapshot().errors_by_kind.get("inference"),
        Some(&1)
    );
}

#[tokio::test]
async fn malformed_json_returns_error_body() {
    let (status, body) = post_dashboard(app(), "{\"amount\": ").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("malformed request body"));
}

#[tokio::test]
async fn non_numeric_field_returns_error_body() {
    let mut application = sample_application();
    application["balance"] = json!("lots");

    let (_, body) = post_dashboard(app(), application.to_string()).await;

    assert_eq!(body, json!({ "error": "field balance must be a number" }));
}

#[tokio::test]
async fn metrics_count_predictions_and_errors() {
    let (router, metrics) = app_with(StubModel { input_width: None });

    post_dashboard(router.clone(), sample_application().to_string()).await;
    post_dashboard(router.clone(), "{}").await;

    let (status, body) = get_json(router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["requests_received"], 2);
    assert_eq!(body["data"]["predictions_served"], 1);
    assert_eq!(body["data"]["errors_by_kind"]["missing_field"], 1);
    assert_eq!(metrics.snapshot().latency.count, 2);
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, body) = get_json(app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn model_info_lists_features() {
    let (status, body) = get_json(app(), "/model").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "stub");
    assert_eq!(body["input_width"], 48);
    assert_eq!(body["feature_count"], 48);
    assert_eq!(body["feature_names"][0], "amount");
    assert_eq!(body["feature_names"].as_array().unwrap().len(), 48);
}

#[tokio::test]
async fn cors_preflight_is_allowed() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/apply/results/dashboard")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .unwrap()
            .to_str()
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn oversized_body_still_gets_json_answer() {
    let mut application = sample_application();
    application["name"] = json!("x".repeat(3 * 1024 * 1024));

    let (status, body) = post_dashboard(app(), application.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!((body["prediction"].as_f64().unwrap() - 90.0).abs() < 1e-9);
}

#[tokio::test]
async fn oversized_malformed_body_returns_error_body() {
    let (status, body) = post_dashboard(app(), "[".repeat(3 * 1024 * 1024)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("prediction").is_none());
    assert!(body["error"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_requests_are_scored_independently() {
    let router = app();
    let mut risky = sample_application();
    risky["no_of_defaults"] = json!(2);

    let (safe, risky, safe_again) = tokio::join!(
        post_dashboard(router.clone(), sample_application().to_string()),
        post_dashboard(router.clone(), risky.to_string()),
        post_dashboard(router, sample_application().to_string()),
    );

    assert!((safe.1["prediction"].as_f64().unwrap() - 90.0).abs() < 1e-9);
    assert!((risky.1["prediction"].as_f64().unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(safe, safe_again);
}
