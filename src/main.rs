//! Dermalens service binary.
//!
//! Startup order: logging, config, classifier weights (tolerating failure;
//! the API then reports `model_loaded: false`), report generator, HTTP
//! server.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dermalens::api::server;
use dermalens::api::types::ApiContext;
use dermalens::classifier::{self, Classifier};
use dermalens::config::{self, AppConfig};
use dermalens::report::gemini::GeminiClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cfg = AppConfig::from_env();

    // Load the pretrained classifier. A failure here is logged, not fatal:
    // the service still answers health probes and report requests.
    let classifier: Option<Arc<Classifier>> = match classifier::load(&cfg).await {
        Ok(c) => Some(Arc::new(c)),
        Err(e) => {
            tracing::error!(error = %e, "Classifier model unavailable");
            None
        }
    };

    let generator = Arc::new(GeminiClient::from_config(&cfg));
    let ctx = ApiContext::new(classifier, generator, Arc::new(cfg.clone()));

    if let Err(e) = server::run(cfg.bind_addr, ctx).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}
