//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "gesture_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "gesture_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "gesture_http_requests_in_flight";

    // Inference metrics
    pub const PREDICTIONS_TOTAL: &str = "gesture_predictions_total";
    pub const INFERENCE_ERRORS_TOTAL: &str = "gesture_inference_errors_total";
    pub const INFERENCE_DURATION_SECONDS: &str = "gesture_inference_duration_seconds";
}

static IMAGE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/images/[^/]+$").expect("valid image path regex"));

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a successful prediction.
pub fn record_prediction(label: &str) {
    let labels = [("label", label.to_string())];
    counter!(names::PREDICTIONS_TOTAL, &labels).increment(1);
}

/// Record a failed inference call by error kind.
pub fn record_inference_error(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::INFERENCE_ERRORS_TOTAL, &labels).increment(1);
}

/// Record time spent in the inference pipeline.
pub fn record_inference_duration(duration_secs: f64) {
    histogram!(names::INFERENCE_DURATION_SECONDS).record(duration_secs);
}

/// Collapse per-file image paths into one label.
fn sanitize_path(path: &str) -> String {
    IMAGE_PATH.replace(path, "/images/:filename").to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/images/fist.png"), "/images/:filename");
        assert_eq!(sanitize_path("/predict"), "/predict");
        assert_eq!(sanitize_path("/images/a/b.png"), "/images/a/b.png");
    }
}
