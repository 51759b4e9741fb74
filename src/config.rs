use crate::errors::SpecError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Model configuration artifact: the ordered class labels and expected input
/// dimensions the weights were trained with. Class order is significant —
/// position i of the model's output vector corresponds to `class_labels[i]`.
///
/// Loadable as a JSON sidecar next to the weights so that training and
/// inference share one source of truth instead of two hardcoded copies.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSpec {
    #[serde(default = "default_version")]
    pub version: u32,
    pub class_labels: Vec<String>,
    pub input_height: u32,
    pub input_width: u32,
    pub input_channels: u32,
}

fn default_version() -> u32 {
    1
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            version: 1,
            class_labels: vec!["Cat".to_string(), "Dog".to_string()],
            input_height: 224,
            input_width: 224,
            input_channels: 3,
        }
    }
}

impl ModelSpec {
    pub fn from_path(path: &Path) -> Result<Self, SpecError> {
        let raw = fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let spec: Self = serde_json::from_str(&raw).map_err(|source| SpecError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if spec.class_labels.is_empty() {
            return Err(SpecError::NoClasses {
                path: path.to_path_buf(),
            });
        }
        if spec.input_height == 0 || spec.input_width == 0 {
            return Err(SpecError::ZeroDimension {
                path: path.to_path_buf(),
            });
        }
        // A bad channel count would otherwise fail every request at runtime;
        // refuse it at startup instead.
        if !matches!(spec.input_channels, 1 | 3) {
            return Err(SpecError::BadChannels {
                path: path.to_path_buf(),
                channels: spec.input_channels,
            });
        }
        Ok(spec)
    }
}

/// Per-process service knobs, fixed at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_upload_bytes: usize,
}
