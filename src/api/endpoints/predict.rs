//! Minimal prediction endpoint: raw class scores, no report plumbing.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use super::read_file_field;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::classifier::ClassScore;

#[derive(Serialize)]
pub struct PredictResponse {
    pub predictions: Vec<ClassScore>,
}

/// `POST /predict` — both class scores straight from the classifier,
/// highest first.
pub async fn predict(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let classifier = ctx
        .classifier
        .clone()
        .ok_or_else(|| ApiError::Internal("Model not loaded.".to_string()))?;

    let bytes = read_file_field(&mut multipart).await?;
    let predictions = tokio::task::spawn_blocking(move || classifier.class_scores(&bytes)).await??;

    Ok(Json(PredictResponse { predictions }))
}
