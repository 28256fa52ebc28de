//! Report generation: LLM narrative text, then PDF or Word rendering.
//!
//! The narrative is produced by an external generation API from the image
//! plus the classification; this module owns the prompt, the HTTP client,
//! the Markdown-to-element translation and the two document renderers.

pub mod docx;
pub mod gemini;
pub mod markdown;
pub mod pdf;
pub mod prompt;
pub mod rtl;

pub use gemini::{GeminiClient, MockReportGenerator, ReportGenerator};

use std::path::PathBuf;

/// Errors from report generation and rendering.
///
/// Messages are complete sentences; they travel to API clients verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Generation API key is not configured — set GEMINI_API_KEY")]
    MissingApiKey,

    #[error("Cannot reach the generation API at {0}")]
    Unreachable(String),

    #[error("Generation request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Generation API returned an error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Generation API returned no report text")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Font file not found at {0} — Arabic PDF output needs an Arabic-capable TTF")]
    FontMissing(PathBuf),

    #[error("Document rendering failed: {0}")]
    Render(String),
}

/// Output formats of the report endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Word,
}

impl ReportFormat {
    /// Parse the `report_type` form value. `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pdf" => Some(Self::Pdf),
            "word" => Some(Self::Word),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Fixed download filename for the Content-Disposition header.
    pub fn filename(&self) -> &'static str {
        match self {
            Self::Pdf => "Report.pdf",
            Self::Word => "Analysis_Report.docx",
        }
    }
}

/// Classification context threaded through prompt and renderers.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub prediction: String,
    pub confidence: f64,
    pub language: String,
}

impl ReportContext {
    /// Whether the report is rendered right-to-left.
    pub fn is_arabic(&self) -> bool {
        self.language == "Arabic"
    }

    /// Whether the lesion was classified as cancerous.
    pub fn is_cancerous(&self) -> bool {
        self.prediction.eq_ignore_ascii_case("cancerous")
    }

    /// Confidence as a percentage with two decimals, e.g. `"97.25"`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}", self.confidence * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(prediction: &str, language: &str) -> ReportContext {
        ReportContext {
            prediction: prediction.to_string(),
            confidence: 0.9725,
            language: language.to_string(),
        }
    }

    #[test]
    fn report_format_parses_known_values() {
        assert_eq!(ReportFormat::parse("pdf"), Some(ReportFormat::Pdf));
        assert_eq!(ReportFormat::parse("word"), Some(ReportFormat::Word));
        assert_eq!(ReportFormat::parse("html"), None);
        assert_eq!(ReportFormat::parse(""), None);
    }

    #[test]
    fn format_mime_and_filename_pairs() {
        assert_eq!(ReportFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(ReportFormat::Pdf.filename(), "Report.pdf");
        assert!(ReportFormat::Word.mime_type().contains("wordprocessingml"));
        assert_eq!(ReportFormat::Word.filename(), "Analysis_Report.docx");
    }

    #[test]
    fn arabic_detection_is_exact() {
        assert!(ctx("Cancerous", "Arabic").is_arabic());
        assert!(!ctx("Cancerous", "English").is_arabic());
        assert!(!ctx("Cancerous", "arabic").is_arabic());
    }

    #[test]
    fn cancerous_detection_ignores_case() {
        assert!(ctx("Cancerous", "English").is_cancerous());
        assert!(ctx("cancerous", "English").is_cancerous());
        assert!(!ctx("Non-Cancerous", "English").is_cancerous());
    }

    #[test]
    fn confidence_percent_two_decimals() {
        assert_eq!(ctx("Cancerous", "English").confidence_percent(), "97.25");
    }
}
