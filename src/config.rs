//! Service configuration: environment-driven settings plus data-dir helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Dermalens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Default generation model for report text.
pub const DEFAULT_REPORT_MODEL: &str = "gemini-2.5-flash";

/// Default base URL of the generation API.
pub const DEFAULT_REPORT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Hub coordinates of the pretrained lesion classifier.
pub const HUB_REPO: &str = "VRJBro/skin-cancer-detection";
pub const HUB_FILENAME: &str = "skin_cancer_model.onnx";

/// Default path of the Arabic-capable TTF used for RTL PDF output.
pub const DEFAULT_ARABIC_FONT: &str = "fonts/Amiri-Regular.ttf";

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory (~/Dermalens/).
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Get the models cache directory (downloaded classifier weights).
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Runtime configuration assembled from environment variables.
///
/// Every knob has a default so `AppConfig::from_env()` always succeeds;
/// a missing `GEMINI_API_KEY` only fails later, at report-generation time.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Generation model name sent to the report API.
    pub report_model: String,
    /// Base URL of the generation API (overridable for tests).
    pub report_base_url: String,
    /// API key for the generation API.
    pub gemini_api_key: Option<String>,
    /// Explicit path to the classifier weights, bypassing the hub download.
    pub model_path: Option<PathBuf>,
    /// TTF file used for Arabic PDF rendering.
    pub arabic_font_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("DERMALENS_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                DEFAULT_BIND_ADDR
                    .parse()
                    .expect("default bind address is valid")
            });

        Self {
            bind_addr,
            report_model: std::env::var("DERMALENS_REPORT_MODEL")
                .unwrap_or_else(|_| DEFAULT_REPORT_MODEL.to_string()),
            report_base_url: std::env::var("DERMALENS_REPORT_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_REPORT_BASE_URL.to_string()),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            model_path: std::env::var("DERMALENS_MODEL_PATH").ok().map(PathBuf::from),
            arabic_font_path: std::env::var("DERMALENS_ARABIC_FONT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARABIC_FONT)),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.parse().expect("default bind address is valid"),
            report_model: DEFAULT_REPORT_MODEL.to_string(),
            report_base_url: DEFAULT_REPORT_BASE_URL.to_string(),
            gemini_api_key: None,
            model_path: None,
            arabic_font_path: PathBuf::from(DEFAULT_ARABIC_FONT),
        }
    }
}
