//! Model Module - pest classifier and its label map
//!
//! Loaded once at startup. A failed load disables image prediction only.

pub mod inference;
pub mod labels;

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;

pub use inference::{InferenceError, OnnxClassifier, PestClassifier, PestModel, Prediction};
pub use labels::{LabelError, LabelMap};

/// Model lifecycle after startup
pub enum ModelState {
    Ready(Arc<PestModel>),
    Unavailable { reason: String },
}

/// Model status for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub model_loaded: bool,
    pub model_name: Option<String>,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ModelState {
    /// Load the label map, then the ONNX model. Never panics.
    pub fn load(config: &Config) -> Self {
        let labels = match LabelMap::load(&config.labels_path) {
            Ok(labels) => labels,
            Err(e) => return Self::unavailable(format!("Error loading classes: {}", e)),
        };

        match OnnxClassifier::load(&config.model_path) {
            Ok(classifier) => Self::Ready(Arc::new(PestModel::new(Arc::new(classifier), labels))),
            Err(e) => Self::unavailable(format!("Error loading model: {}", e)),
        }
    }

    fn unavailable(reason: String) -> Self {
        tracing::error!("{}; image prediction disabled", reason);
        Self::Unavailable { reason }
    }

    /// The loaded model, or the reason it is unavailable
    pub fn ready(&self) -> Result<&Arc<PestModel>, &str> {
        match self {
            Self::Ready(model) => Ok(model),
            Self::Unavailable { reason } => Err(reason),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn status(&self) -> ModelStatus {
        match self {
            Self::Ready(model) => ModelStatus {
                model_loaded: true,
                model_name: Some(model.name().to_string()),
                labels: model.labels().names().to_vec(),
                reason: None,
            },
            Self::Unavailable { reason } => ModelStatus {
                model_loaded: false,
                model_name: None,
                labels: Vec::new(),
                reason: Some(reason.clone()),
            },
        }
    }
}
