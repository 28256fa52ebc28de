//! Model wrapper and label rule.
//!
//! The ONNX session sits behind the `ScoreModel` trait so the HTTP layer and
//! tests can swap in a mock. Uses interior mutability (Mutex) because
//! `ort::Session::run` requires `&mut self` while the trait exposes `&self`
//! for shared usage from handlers.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use serde::{Deserialize, Serialize};

use super::{preprocess, ClassifierError};

/// The two fixed class labels of the pretrained model.
pub const LABEL_CANCEROUS: &str = "Cancerous";
pub const LABEL_NON_CANCEROUS: &str = "Non-Cancerous";

/// Classification result for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub prediction: String,
    pub confidence: f64,
}

/// One labeled class score, as reported by the minimal predict endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassScore {
    pub label: String,
    pub score: f64,
}

/// A model that maps a preprocessed input tensor to a sigmoid score.
pub trait ScoreModel: Send + Sync {
    /// Run one inference. Returns the raw score in `[0, 1]`.
    fn predict(&self, input: &Array4<f32>) -> Result<f32, ClassifierError>;
}

// ═══════════════════════════════════════════════════════════
// ONNX model
// ═══════════════════════════════════════════════════════════

/// Pretrained lesion classifier running on ONNX Runtime.
pub struct OnnxScoreModel {
    session: Mutex<Session>,
}

impl std::fmt::Debug for OnnxScoreModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxScoreModel").finish_non_exhaustive()
    }
}

impl OnnxScoreModel {
    /// Load the classifier weights from an `.onnx` file.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        if !path.exists() {
            return Err(ClassifierError::ModelNotFound(path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelInit(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e| ClassifierError::ModelInit(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e| ClassifierError::ModelInit(format!("ONNX load failed: {e}")))?;

        tracing::info!("Classifier model loaded from {}", path.display());

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl ScoreModel for OnnxScoreModel {
    fn predict(&self, input: &Array4<f32>) -> Result<f32, ClassifierError> {
        use ort::value::TensorRef;

        let tensor = TensorRef::from_array_view(input)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| ClassifierError::Inference(format!("ONNX inference failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Output extraction: {e}")))?;

        let score = data.first().copied().ok_or_else(|| {
            ClassifierError::Inference(format!("Model produced an empty output, shape {shape:?}"))
        })?;

        if !score.is_finite() {
            return Err(ClassifierError::Inference(format!(
                "Model produced a non-finite score: {score}"
            )));
        }

        Ok(score.clamp(0.0, 1.0))
    }
}

// ═══════════════════════════════════════════════════════════
// Classifier service
// ═══════════════════════════════════════════════════════════

/// Preprocessing + model + label rule, as one request-scoped operation.
pub struct Classifier {
    model: Box<dyn ScoreModel>,
}

impl Classifier {
    pub fn new(model: Box<dyn ScoreModel>) -> Self {
        Self { model }
    }

    /// Classify an uploaded image into one of the two fixed labels.
    pub fn analyze(&self, image_bytes: &[u8]) -> Result<Analysis, ClassifierError> {
        let input = preprocess::tensor_from_bytes(image_bytes)?;
        let score = self.model.predict(&input)?;
        tracing::debug!(score, "Raw model score");
        Ok(label_from_score(score))
    }

    /// Both class scores, highest first (the minimal predict contract).
    pub fn class_scores(&self, image_bytes: &[u8]) -> Result<Vec<ClassScore>, ClassifierError> {
        let input = preprocess::tensor_from_bytes(image_bytes)?;
        let score = self.model.predict(&input)? as f64;

        let mut scores = vec![
            ClassScore {
                label: LABEL_CANCEROUS.to_string(),
                score,
            },
            ClassScore {
                label: LABEL_NON_CANCEROUS.to_string(),
                score: 1.0 - score,
            },
        ];
        scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scores)
    }
}

/// The fixed label rule: score above 0.5 means cancerous, and the reported
/// confidence is always the probability of the chosen label.
pub fn label_from_score(score: f32) -> Analysis {
    let score = score as f64;
    if score > 0.5 {
        Analysis {
            prediction: LABEL_CANCEROUS.to_string(),
            confidence: score,
        }
    } else {
        Analysis {
            prediction: LABEL_NON_CANCEROUS.to_string(),
            confidence: 1.0 - score,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Mock model (testing)
// ═══════════════════════════════════════════════════════════

/// Mock model returning a fixed score, or an inference error.
pub struct MockScoreModel {
    score: f32,
    fail: bool,
}

impl MockScoreModel {
    pub fn new(score: f32) -> Self {
        Self { score, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            score: 0.0,
            fail: true,
        }
    }
}

impl ScoreModel for MockScoreModel {
    fn predict(&self, _input: &Array4<f32>) -> Result<f32, ClassifierError> {
        if self.fail {
            return Err(ClassifierError::Inference("mock inference failure".into()));
        }
        Ok(self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::preprocess::test_png_bytes as png_bytes;

    #[test]
    fn high_score_labels_cancerous() {
        let analysis = label_from_score(0.92);
        assert_eq!(analysis.prediction, LABEL_CANCEROUS);
        assert!((analysis.confidence - 0.92).abs() < 1e-6);
    }

    #[test]
    fn low_score_labels_non_cancerous() {
        let analysis = label_from_score(0.2);
        assert_eq!(analysis.prediction, LABEL_NON_CANCEROUS);
        assert!((analysis.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn boundary_score_is_non_cancerous() {
        // The rule is strictly greater-than.
        let analysis = label_from_score(0.5);
        assert_eq!(analysis.prediction, LABEL_NON_CANCEROUS);
        assert!((analysis.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn confidence_always_in_unit_interval() {
        for score in [0.0, 0.1, 0.49, 0.5, 0.51, 0.99, 1.0] {
            let analysis = label_from_score(score);
            assert!((0.0..=1.0).contains(&analysis.confidence), "score {score}");
            assert!(
                analysis.prediction == LABEL_CANCEROUS
                    || analysis.prediction == LABEL_NON_CANCEROUS
            );
        }
    }

    #[test]
    fn classifier_analyze_uses_model_score() {
        let classifier = Classifier::new(Box::new(MockScoreModel::new(0.87)));
        let analysis = classifier.analyze(&png_bytes(32, 32, [90, 60, 40])).unwrap();
        assert_eq!(analysis.prediction, LABEL_CANCEROUS);
        assert!((analysis.confidence - 0.87).abs() < 1e-6);
    }

    #[test]
    fn classifier_rejects_undecodable_input() {
        let classifier = Classifier::new(Box::new(MockScoreModel::new(0.5)));
        let err = classifier.analyze(&[0u8; 256]).unwrap_err();
        assert!(matches!(err, ClassifierError::ImageDecode(_)));
    }

    #[test]
    fn classifier_propagates_inference_errors() {
        let classifier = Classifier::new(Box::new(MockScoreModel::failing()));
        let err = classifier.analyze(&png_bytes(16, 16, [0, 0, 0])).unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
    }

    #[test]
    fn class_scores_cover_both_labels_highest_first() {
        let classifier = Classifier::new(Box::new(MockScoreModel::new(0.3)));
        let scores = classifier
            .class_scores(&png_bytes(16, 16, [10, 20, 30]))
            .unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].label, LABEL_NON_CANCEROUS);
        assert!(scores[0].score >= scores[1].score);
        assert!(((scores[0].score + scores[1].score) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn model_not_found_error() {
        let err = OnnxScoreModel::load(Path::new("/nonexistent/model.onnx")).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelNotFound(_)));
    }

    #[test]
    fn analysis_serializes_wire_shape() {
        let analysis = label_from_score(0.75);
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["prediction"], "Cancerous");
        assert!(json["confidence"].as_f64().unwrap() > 0.0);
    }
}
