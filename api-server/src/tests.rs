//! Router tests: full request path, in-memory forest engine.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use medora_core::{
    features::DEFAULT_FEATURE_LAYOUT, model::ForestClassifier, DiagnosticEngine, EngineConfig,
    EngineState, FeatureSchema, LabelSpace, ReferenceTables,
};

use crate::{config::Config, create_router, AppState};

const LABELS: [&str; 5] = ["Anemia", "Diabetes", "Healthy", "Thalasse", "Thromboc"];

/// Hemoglobin (feature 2) <= 12 -> Anemia (0.9), otherwise Healthy
fn stump_engine() -> DiagnosticEngine {
    let forest = json!({
        "n_features": DEFAULT_FEATURE_LAYOUT.len(),
        "n_classes": LABELS.len(),
        "trees": [{ "nodes": [
            { "feature": 2, "threshold": 12.0, "left": 1, "right": 2 },
            { "value": [9.0, 0.0, 1.0, 0.0, 0.0] },
            { "value": [0.0, 0.0, 1.0, 0.0, 0.0] }
        ]}]
    });
    let classifier = ForestClassifier::from_json(forest.to_string().as_bytes()).unwrap();
    let labels = LabelSpace::new(LABELS.iter().map(|s| s.to_string()).collect()).unwrap();

    DiagnosticEngine::new(
        Box::new(classifier),
        labels,
        FeatureSchema::default_layout(),
        ReferenceTables::builtin(),
    )
    .unwrap()
}

fn test_config() -> Config {
    Config {
        port: 0,
        environment: "test".to_string(),
        allowed_origins: vec![],
        engine: EngineConfig::with_model_dir("does-not-exist"),
    }
}

fn ready_app() -> Router {
    create_router(AppState {
        engine: EngineState::from(stump_engine()),
        config: test_config(),
    })
}

fn unavailable_app() -> Router {
    create_router(AppState {
        engine: EngineState::Unavailable("no labels.json".to_string()),
        config: test_config(),
    })
}

/// Every field in range, Hemoglobin 14
fn healthy_panel() -> Value {
    let mut panel = serde_json::Map::new();
    for name in DEFAULT_FEATURE_LAYOUT {
        panel.insert(name.to_string(), json!(1.0));
    }
    for (name, value) in [
        ("Glucose", 95.0),
        ("Cholesterol", 180.0),
        ("Hemoglobin", 14.0),
        ("Platelets", 250000.0),
        ("White Blood Cells", 7000.0),
        ("Red Blood Cells", 5.0),
        ("Hematocrit", 42.0),
        ("HbA1c", 5.2),
        ("LDL Cholesterol", 90.0),
        ("HDL Cholesterol", 55.0),
        ("Triglycerides", 120.0),
        ("Systolic Blood Pressure", 115.0),
        ("Diastolic Blood Pressure", 75.0),
        ("BMI", 22.0),
    ] {
        panel.insert(name.to_string(), json!(value));
    }
    Value::Object(panel)
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// ============================================================================
// STATUS
// ============================================================================

#[tokio::test]
async fn test_home_reports_model_state() {
    let (status, body) = send(ready_app(), "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["model_loaded"], true);

    let (status, body) = send(unavailable_app(), "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(ready_app(), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_type"], "forest");
    assert_eq!(body["features_count"], 24);
    assert_eq!(body["classes"], json!(LABELS));
    assert_eq!(body["schema_fingerprint"].as_str().unwrap().len(), 8);
}

#[tokio::test]
async fn test_health_without_model() {
    let (status, body) = send(unavailable_app(), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "ML model not loaded");
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = send(ready_app(), "GET", "/api/v2/predict", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
}

// ============================================================================
// PREDICT
// ============================================================================

#[tokio::test]
async fn test_predict_healthy() {
    let (status, body) = send(ready_app(), "POST", "/api/predict", Some(healthy_panel())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disease"], "Healthy");
    assert_eq!(body["confidence"], 1.0);
    assert_eq!(body["confidence_percentage"], 100.0);
    assert_eq!(body["risk_level"], "Low");
    assert_eq!(body["probabilities"].as_object().unwrap().len(), LABELS.len());
    assert_eq!(body["abnormal_parameters"], json!([]));
}

#[tokio::test]
async fn test_predict_anemia_flags_hemoglobin() {
    let mut panel = healthy_panel();
    panel["Hemoglobin"] = json!("9.5");

    let (status, body) = send(ready_app(), "POST", "/api/predict", Some(panel)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disease"], "Anemia");
    assert_eq!(body["confidence"], 0.9);
    assert_eq!(body["confidence_percentage"], 90.0);
    assert_eq!(body["risk_level"], "Medium");
    assert_eq!(
        body["abnormal_parameters"],
        json!([{
            "parameter": "Hemoglobin",
            "value": 9.5,
            "status": "low",
            "normal_range": "12-17"
        }])
    );
}

#[tokio::test]
async fn test_predict_missing_fields() {
    let mut panel = healthy_panel();
    let map = panel.as_object_mut().unwrap();
    map.remove("BMI");
    map.remove("Glucose");

    let (status, body) = send(ready_app(), "POST", "/api/predict", Some(panel)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid input: Missing required features: Glucose, BMI"
    );
}

#[tokio::test]
async fn test_predict_non_numeric_field() {
    let mut panel = healthy_panel();
    panel["Insulin"] = json!("high");

    let (status, body) = send(ready_app(), "POST", "/api/predict", Some(panel)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid input: Non-numeric values for features: Insulin"
    );
}

#[tokio::test]
async fn test_predict_empty_body() {
    let (status, body) = send(ready_app(), "POST", "/api/predict", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data provided");
}

#[tokio::test]
async fn test_predict_rejects_non_object() {
    let (status, _) = send(ready_app(), "POST", "/api/predict", Some(json!([1, 2, 3]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_without_model() {
    let (status, body) =
        send(unavailable_app(), "POST", "/api/predict", Some(healthy_panel())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "ML model not loaded");
}

// ============================================================================
// BATCH
// ============================================================================

#[tokio::test]
async fn test_batch_predict_isolates_failures() {
    let mut anemic = healthy_panel();
    anemic["Hemoglobin"] = json!(8.0);
    let mut incomplete = healthy_panel();
    incomplete.as_object_mut().unwrap().remove("HbA1c");

    let request = json!({
        "patients": [
            { "id": 1, "bloodData": healthy_panel() },
            { "id": "p-2", "bloodData": incomplete },
            { "id": 3 },
            { "id": { "mrn": 44 }, "bloodData": anemic }
        ]
    });

    let (status, body) = send(ready_app(), "POST", "/api/batch-predict", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["successful"], 2);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["id"], 1);
    assert_eq!(results[0]["prediction"]["disease"], "Healthy");

    assert_eq!(results[1]["id"], "p-2");
    assert_eq!(
        results[1]["error"],
        "Invalid input: Missing required features: HbA1c"
    );

    assert_eq!(results[2]["id"], 3);
    assert_eq!(results[2]["error"], "No blood data provided");

    assert_eq!(results[3]["id"], json!({ "mrn": 44 }));
    assert_eq!(results[3]["prediction"]["disease"], "Anemia");
}

#[tokio::test]
async fn test_batch_predict_non_object_blood_data() {
    let request = json!({
        "patients": [
            { "id": 1, "bloodData": healthy_panel() },
            { "id": 2, "bloodData": "oops" },
            { "id": 3, "bloodData": [14.0, 250000] },
            { "id": 4, "bloodData": healthy_panel() }
        ]
    });

    let (status, body) = send(ready_app(), "POST", "/api/batch-predict", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["successful"], 2);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[1]["id"], 2);
    assert_eq!(results[1]["error"], "Invalid input: blood data must be a JSON object");
    assert_eq!(results[2]["error"], "Invalid input: blood data must be a JSON object");
    assert_eq!(results[3]["prediction"]["disease"], "Healthy");
}

#[tokio::test]
async fn test_batch_predict_no_patients() {
    for request in [json!({}), json!({ "patients": [] })] {
        let (status, body) =
            send(ready_app(), "POST", "/api/batch-predict", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No patients provided");
    }
}

#[tokio::test]
async fn test_batch_predict_without_model() {
    let request = json!({ "patients": [{ "id": 1, "bloodData": healthy_panel() }] });
    let (status, body) = send(unavailable_app(), "POST", "/api/batch-predict", Some(request)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "ML model not loaded");
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_cors_origin_list() {
    let mut config = test_config();
    config.allowed_origins = vec!["https://*.onrender.com".to_string()];
    let app = create_router(AppState {
        engine: EngineState::from(stump_engine()),
        config,
    });

    let request = |origin: &str| {
        Request::builder()
            .uri("/")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app.clone().oneshot(request("https://medora.onrender.com")).await.unwrap();
    assert_eq!(
        allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://medora.onrender.com"
    );

    let denied = app.oneshot(request("https://example.com")).await.unwrap();
    assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
