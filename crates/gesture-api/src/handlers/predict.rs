//! Gesture prediction handler.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use tracing::{info, warn};

use gesture_models::PredictionResponse;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Form field carrying the feature payload.
pub const FEATURES_FIELD: &str = "features";

const MULTIPART_REQUIRED: &str = "Content-Type must be multipart/form-data";

/// Classify a feature vector posted as multipart form data.
///
/// The `features` field holds either a JSON array of numbers or a
/// comma-separated list.
pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<PredictionResponse>> {
    info!("Received POST request to /predict");

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("multipart/form-data") {
        warn!(content_type, "Invalid content type");
        return Err(ApiError::bad_request(MULTIPART_REQUIRED));
    }

    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, content_type, "Rejected multipart request");
        ApiError::bad_request(MULTIPART_REQUIRED)
    })?;

    let features = read_features_field(&mut multipart).await?;

    let service = Arc::clone(&state.inference);
    let start = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || service.handle(&features))
        .await
        .map_err(|e| ApiError::internal(format!("Prediction error: inference task failed: {e}")))?;
    metrics::record_inference_duration(start.elapsed().as_secs_f64());

    match outcome {
        Ok(result) => {
            info!(
                label = %result.label,
                confidence = %format!("{:.4}", result.confidence),
                "Prediction successful"
            );
            metrics::record_prediction(&result.label);
            Ok(Json(PredictionResponse::from(result)))
        }
        Err(e) => {
            metrics::record_inference_error(e.kind().as_str());
            Err(e.into())
        }
    }
}

/// Find the `features` text field, skipping any others.
async fn read_features_field(multipart: &mut Multipart) -> ApiResult<String> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            warn!(error = %e, "Malformed multipart body");
            ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text()))
        })?;

        let Some(field) = field else {
            warn!("No 'features' key found in form data");
            return Err(ApiError::bad_request("Missing 'features' in form data"));
        };

        if field.name() == Some(FEATURES_FIELD) {
            return field.text().await.map_err(|e| {
                warn!(error = %e, "Unreadable 'features' field");
                ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text()))
            });
        }
    }
}
