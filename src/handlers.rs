use crate::classifier;
use crate::config::ServiceConfig;
use crate::errors::ClassifyError;
use crate::model_store::ModelStore;
use crate::models::HealthResponse;
use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use tracing::{debug, warn};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn health(store: web::Data<ModelStore>) -> HttpResponse {
    let ready = store.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    HttpResponse::build(status).json(HealthResponse { ready })
}

async fn predict(
    store: web::Data<ModelStore>,
    service: web::Data<ServiceConfig>,
    mut payload: Multipart,
) -> Result<HttpResponse, ClassifyError> {
    // Refuse before buffering the upload; no decode happens either way.
    if !store.is_ready() {
        return Err(ClassifyError::NotReady);
    }

    let upload = read_upload(&mut payload, service.max_upload_bytes).await?;
    debug!(
        filename = %upload.filename,
        content_type = %upload.content_type,
        size = upload.bytes.len(),
        "received upload"
    );

    // Decode, resize and inference are bounded synchronous CPU work, so run
    // them on the blocking pool instead of stalling a worker.
    let store = store.clone();
    let result = web::block(move || {
        classifier::classify(
            store.get_ref(),
            &upload.bytes,
            &upload.content_type,
            &upload.filename,
        )
    })
    .await
    .map_err(|e| ClassifyError::Internal(e.to_string()))??;

    debug!(
        filename = %result.filename,
        prediction = %result.prediction,
        confidence = result.confidence,
        "classified upload"
    );
    Ok(HttpResponse::Ok().json(result))
}

struct Upload {
    bytes: Vec<u8>,
    content_type: String,
    filename: String,
}

/// Buffers the first file field of the multipart payload, enforcing the
/// upload limit while streaming so an oversized body is cut off early.
async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<Upload, ClassifyError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ClassifyError::Multipart(e.to_string()))?;
        let filename = match field.content_disposition().get_filename() {
            Some(name) => name.to_string(),
            // Plain form fields carry no filename; drain and keep looking
            // for the actual file part.
            None => {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| ClassifyError::Multipart(e.to_string()))?;
                }
                continue;
            }
        };
        let content_type = field.content_type().to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| ClassifyError::Multipart(e.to_string()))?;
            if bytes.len() + data.len() > limit {
                warn!(filename = %filename, limit, "upload rejected: over size limit");
                return Err(ClassifyError::PayloadTooLarge(limit));
            }
            bytes.extend_from_slice(&data);
        }

        return Ok(Upload {
            bytes,
            content_type,
            filename,
        });
    }
    Err(ClassifyError::Multipart("no file field in request".to_string()))
}
