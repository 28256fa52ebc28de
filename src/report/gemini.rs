//! HTTP client for the hosted generation API.
//!
//! Speaks the `models/{model}:generateContent` JSON dialect: one user
//! content with an inline base64 image part and a text part, response read
//! from the first candidate. The `ReportGenerator` trait is the seam the
//! HTTP layer depends on, so tests run against a mock instead of the wire.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::ReportError;
use crate::config::AppConfig;

/// Request timeout. Narrative generation over an image is slow.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Produces narrative report text from an image and a prompt.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, ReportError>;
}

// ──────────────────────────────────────────────
// Wire types
// ──────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

/// A request part: either inline image data or prompt text.
#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    /// Base64-encoded image bytes.
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ──────────────────────────────────────────────
// GeminiClient
// ──────────────────────────────────────────────

/// Async client for the generation API.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            client,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            &cfg.report_base_url,
            &cfg.report_model,
            cfg.gemini_api_key.clone(),
        )
    }

    /// The model name being used.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ReportGenerator for GeminiClient {
    async fn generate(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, ReportError> {
        let key = self.api_key.as_deref().ok_or(ReportError::MissingApiKey)?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, key
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: base64::engine::general_purpose::STANDARD.encode(image),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(prompt.to_string()),
                    },
                ],
            }],
        };

        let start = std::time::Instant::now();
        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                ReportError::Unreachable(self.base_url.clone())
            } else if e.is_timeout() {
                ReportError::Timeout(REQUEST_TIMEOUT_SECS)
            } else {
                ReportError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ReportError::Network(format!("Response parsing: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ReportError::EmptyResponse);
        }

        tracing::info!(
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            text_len = text.len(),
            "Report text generated"
        );

        Ok(text)
    }
}

// ──────────────────────────────────────────────
// MockReportGenerator (testing)
// ──────────────────────────────────────────────

/// Mock generator returning a configurable response, or an error.
pub struct MockReportGenerator {
    response: Result<String, fn() -> ReportError>,
}

impl MockReportGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
        }
    }

    pub fn failing(make_err: fn() -> ReportError) -> Self {
        Self {
            response: Err(make_err),
        }
    }
}

#[async_trait]
impl ReportGenerator for MockReportGenerator {
    async fn generate(
        &self,
        _image: &[u8],
        _mime_type: &str,
        _prompt: &str,
    ) -> Result<String, ReportError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(make_err) => Err(make_err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_configured_response() {
        let generator = MockReportGenerator::new("## Summary\nAll fine.");
        let text = generator
            .generate(b"img", "image/jpeg", "prompt")
            .await
            .unwrap();
        assert_eq!(text, "## Summary\nAll fine.");
    }

    #[tokio::test]
    async fn mock_propagates_errors() {
        let generator = MockReportGenerator::failing(|| ReportError::EmptyResponse);
        let err = generator
            .generate(b"img", "image/jpeg", "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::EmptyResponse));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let client = GeminiClient::new("http://localhost:1", "gemini-2.5-flash", None);
        let err = client
            .generate(b"img", "image/jpeg", "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingApiKey));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = GeminiClient::new("http://localhost:9999/", "m", Some("k".into()));
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.model(), "m");
    }

    #[test]
    fn request_body_serializes_inline_data_and_text() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: "image/jpeg".into(),
                            data: "aW1n".into(),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some("describe".into()),
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "describe");
        // A part carries either image data or text, never a null for the other.
        assert!(json["contents"][0]["parts"][0].get("text").is_none());
    }

    #[test]
    fn response_parses_first_candidate_text() {
        let json = r###"{
            "candidates": [
                {"content": {"parts": [{"text": "## Report"}, {"text": " body"}]}}
            ]
        }"###;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .filter_map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "## Report body");
    }

    #[test]
    fn response_tolerates_missing_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
