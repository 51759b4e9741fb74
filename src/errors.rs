use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failures owned by the model store.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model from {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("no model is loaded")]
    NotLoaded,
    #[error("forward pass failed: {0}")]
    Forward(String),
}

/// Failures loading the model spec sidecar.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read model spec {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model spec {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model spec {path} declares no class labels")]
    NoClasses { path: PathBuf },
    #[error("model spec {path} declares zero-sized input dimensions")]
    ZeroDimension { path: PathBuf },
    #[error("model spec {path} declares {channels} input channels; only 1 or 3 are supported")]
    BadChannels { path: PathBuf, channels: u32 },
}

/// Per-request failure taxonomy for the classify operation. Three status
/// classes: not-ready (503, retryable), malformed input (400, caller must fix
/// the upload), internal (500, cause logged server-side).
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("model is not loaded; the service is not ready")]
    NotReady,
    #[error("unsupported content type `{0}`; expected an image")]
    UnsupportedMediaType(String),
    #[error("could not decode image: {0}")]
    InvalidImage(String),
    #[error("upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),
    #[error("malformed multipart payload: {0}")]
    Multipart(String),
    #[error("internal error while classifying the image: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ResponseError for ClassifyError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::UnsupportedMediaType(_)
            | Self::InvalidImage(_)
            | Self::PayloadTooLarge(_)
            | Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_maps_to_service_unavailable() {
        assert_eq!(
            ClassifyError::NotReady.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn malformed_input_maps_to_bad_request() {
        for err in [
            ClassifyError::UnsupportedMediaType("text/plain".into()),
            ClassifyError::InvalidImage("truncated".into()),
            ClassifyError::PayloadTooLarge(1024),
            ClassifyError::Multipart("no file field".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn internal_maps_to_server_error() {
        assert_eq!(
            ClassifyError::Internal("inference failed".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
