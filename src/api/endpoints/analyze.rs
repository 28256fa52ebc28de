//! Classification endpoint.

use axum::extract::{Multipart, State};
use axum::Json;

use super::read_file_field;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::classifier::Analysis;

/// `POST /analyze` — run the local classifier only, return JSON immediately.
///
/// The heavy report generation is a separate, on-demand endpoint.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<Analysis>, ApiError> {
    let classifier = ctx
        .classifier
        .clone()
        .ok_or_else(|| ApiError::Internal("Model not loaded.".to_string()))?;

    let bytes = read_file_field(&mut multipart).await?;

    // Inference is CPU-bound; keep it off the async workers.
    let analysis = tokio::task::spawn_blocking(move || classifier.analyze(&bytes)).await??;

    tracing::info!(
        prediction = %analysis.prediction,
        confidence = analysis.confidence,
        "Lesion analyzed"
    );

    Ok(Json(analysis))
}
