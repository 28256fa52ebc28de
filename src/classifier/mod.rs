//! Lesion classification: image preprocessing, ONNX inference, label rule.
//!
//! The model itself is an external artifact, a pretrained binary classifier
//! pulled from the hub. Everything here is the plumbing around it: turn
//! upload bytes into the tensor the network expects, run one inference, and
//! map the sigmoid score onto the two fixed labels.

pub mod hub;
pub mod model;
pub mod preprocess;

pub use model::{
    Analysis, ClassScore, Classifier, MockScoreModel, OnnxScoreModel, ScoreModel,
    LABEL_CANCEROUS, LABEL_NON_CANCEROUS,
};

use std::path::PathBuf;

use crate::config::{self, AppConfig};

/// Errors from classifier loading and inference.
///
/// Messages are complete sentences; they travel to API clients verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Image is empty or too small to be a valid image file")]
    ImageTooSmall,

    #[error("Image too large ({0} bytes) — maximum is 50 MB")]
    ImageTooLarge(usize),

    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Model file not found at {0}")]
    ModelNotFound(PathBuf),

    #[error("Failed to initialize model: {0}")]
    ModelInit(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model download failed: {0}")]
    Download(String),
}

/// Resolve the classifier weights and load the model.
///
/// An explicit `DERMALENS_MODEL_PATH` wins; otherwise the weights are
/// fetched from the hub into the local cache (no-op when already cached).
pub async fn load(cfg: &AppConfig) -> Result<Classifier, ClassifierError> {
    let path = match &cfg.model_path {
        Some(p) => p.clone(),
        None => hub::fetch_model(config::HUB_REPO, config::HUB_FILENAME, &config::models_dir())
            .await?,
    };

    let model = OnnxScoreModel::load(&path)?;
    Ok(Classifier::new(Box::new(model)))
}
