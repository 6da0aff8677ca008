//! API integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ndarray::Array2;
use serde_json::{json, Value};
use tower::ServiceExt;

use gesture_api::{create_router, ApiConfig, AppState};
use gesture_inference::{
    Classifier, ClassifierError, Distribution, FeatureBatch, InferenceService, LabelSet,
};

const BOUNDARY: &str = "gesture-test-boundary";

/// Returns the same distribution for every row.
struct FixedClassifier(Vec<f32>);

impl Classifier for FixedClassifier {
    fn input_dim(&self) -> usize {
        63
    }

    fn classify(&self, batch: &FeatureBatch) -> Result<Distribution, ClassifierError> {
        let mut out = Array2::zeros((batch.len(), self.0.len()));
        for mut row in out.rows_mut() {
            row.assign(&ndarray::ArrayView1::from(self.0.as_slice()));
        }
        Ok(out)
    }
}

struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn input_dim(&self) -> usize {
        63
    }

    fn classify(&self, _batch: &FeatureBatch) -> Result<Distribution, ClassifierError> {
        Err(ClassifierError::backend("incompatible weights"))
    }
}

fn router_with(classifier: impl Classifier + 'static, config: ApiConfig) -> Router {
    let labels = LabelSet::new(["open_palm", "fist", "peace"]).unwrap();
    let service = InferenceService::new(Arc::new(classifier), labels).unwrap();
    create_router(AppState::new(config, Arc::new(service)), None)
}

fn test_router() -> Router {
    router_with(FixedClassifier(vec![0.1, 0.8, 0.1]), ApiConfig::default())
}

fn multipart_request(fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_array(n: usize, value: f32) -> String {
    format!("[{}]", vec![value.to_string(); n].join(","))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_predict_json_array() {
    let request = multipart_request(&[("features", &json_array(63, 0.5))]);
    let (status, body) = send(test_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"prediction": "fist", "confidence": 0.8}));
}

#[tokio::test]
async fn test_predict_comma_separated_matches_json() {
    let csv = vec!["0.5"; 63].join(", ");
    let (csv_status, csv_body) =
        send(test_router(), multipart_request(&[("features", &csv)])).await;
    let (_, json_body) = send(
        test_router(),
        multipart_request(&[("features", &json_array(63, 0.5))]),
    )
    .await;

    assert_eq!(csv_status, StatusCode::OK);
    assert_eq!(csv_body, json_body);
}

#[tokio::test]
async fn test_predict_skips_other_fields() {
    let request = multipart_request(&[("user", "alice"), ("features", &json_array(63, 0.1))]);
    let (status, body) = send(test_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "fist");
}

#[tokio::test]
async fn test_predict_batch_reports_first_row() {
    let row = json_array(63, 0.5);
    let batch = format!("[{row},{row}]");
    let (status, body) = send(test_router(), multipart_request(&[("features", &batch)])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "fist");
}

#[tokio::test]
async fn test_predict_wrong_content_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(json!({"features": [0.5]}).to_string()))
        .unwrap();
    let (status, body) = send(test_router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Content-Type must be multipart/form-data"}));
}

#[tokio::test]
async fn test_predict_missing_features_field() {
    let request = multipart_request(&[("other", "1,2,3")]);
    let (status, body) = send(test_router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing 'features' in form data"}));
}

#[tokio::test]
async fn test_predict_malformed_payloads() {
    for payload in ["0.1, abc, 0.3", "[0.1, 0.2", "{}", "   "] {
        let (status, body) =
            send(test_router(), multipart_request(&[("features", payload)])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload:?}");
        assert_eq!(
            body["error"],
            "Invalid features format. Use JSON array or comma-separated values"
        );
    }
}

#[tokio::test]
async fn test_predict_feature_count_mismatch() {
    for n in [10usize, 100] {
        let request = multipart_request(&[("features", &json_array(n, 0.5))]);
        let (status, body) = send(test_router(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], format!("Expected 63 features, got {n}"));
    }
}

#[tokio::test]
async fn test_predict_classifier_failure() {
    let app = router_with(FailingClassifier, ApiConfig::default());
    let request = multipart_request(&[("features", &json_array(63, 0.5))]);
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(
        message == "Prediction error: incompatible weights"
            || message == "An internal error occurred"
    );
    assert!(body.get("prediction").is_none());
}

#[tokio::test]
async fn test_predict_label_set_mismatch_is_server_error() {
    let app = router_with(
        FixedClassifier(vec![0.1, 0.1, 0.1, 0.7]),
        ApiConfig::default(),
    );
    let request = multipart_request(&[("features", &json_array(63, 0.5))]);
    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_image_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("fist.png"), b"\x89PNG fake").unwrap();
    let config = ApiConfig {
        images_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let app = router_with(FixedClassifier(vec![1.0]), config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/images/fist.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"\x89PNG fake");
}

#[tokio::test]
async fn test_image_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = ApiConfig {
        images_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    for uri in ["/images/missing.png", "/images/..%2Fsecret.txt"] {
        let app = router_with(FixedClassifier(vec![1.0]), config.clone());
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "uri {uri}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(
        test_router(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_model() {
    let (status, body) = send(
        test_router(),
        Request::builder().uri("/ready").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"]["feature_dim"], 63);
    assert_eq!(body["model"]["labels"], json!(["open_palm", "fist", "peace"]));
}

#[tokio::test]
async fn test_metrics_disabled() {
    let response = test_router()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/predict")
                .header("Origin", "http://localhost:3000")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status() == StatusCode::OK || response.status() == StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
