//! Shared request context handed to handlers via `State`.

use std::sync::Arc;

use crate::classifier::Classifier;
use crate::config::AppConfig;
use crate::report::ReportGenerator;

/// Everything a handler needs: the classifier (when its weights loaded),
/// the report generator, and the service configuration.
#[derive(Clone)]
pub struct ApiContext {
    pub classifier: Option<Arc<Classifier>>,
    pub generator: Arc<dyn ReportGenerator>,
    pub config: Arc<AppConfig>,
}

impl ApiContext {
    pub fn new(
        classifier: Option<Arc<Classifier>>,
        generator: Arc<dyn ReportGenerator>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            classifier,
            generator,
            config,
        }
    }

    /// Whether the classifier weights loaded at startup.
    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }
}
