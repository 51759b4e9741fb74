use crate::config::ModelSpec;
use crate::errors::ClassifyError;
use crate::model_store::ModelStore;
use crate::models::PredictionResponse;
use image::imageops::FilterType;
use ndarray::Array4;
use std::collections::BTreeMap;
use tracing::error;

/// Turns one uploaded image into a structured classification result.
///
/// Validation order matters: readiness first, then the cheap content-type
/// check, and only then the expensive decode. The filename is an opaque
/// string echoed back in the response, never touched as a path.
pub fn classify(
    store: &ModelStore,
    bytes: &[u8],
    content_type: &str,
    filename: &str,
) -> Result<PredictionResponse, ClassifyError> {
    if !store.is_ready() {
        return Err(ClassifyError::NotReady);
    }
    if !is_image_content_type(content_type) {
        return Err(ClassifyError::UnsupportedMediaType(content_type.to_string()));
    }

    let spec = store.spec();
    let tensor = decode_to_tensor(bytes, spec)?;
    let scores = store.infer(tensor).map_err(|e| {
        error!("forward pass failed: {e}");
        ClassifyError::Internal("inference failed".to_string())
    })?;

    Ok(shape_result(&scores, &spec.class_labels, filename))
}

fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Decodes the upload, resizes it to the model's input dimensions and lays it
/// out as a batch-of-one NHWC tensor with pixels rescaled to [0, 1]. The
/// rescale must match the training normalization exactly; nothing here
/// applies a mean/std shift because the model was trained on plain 1/255.
fn decode_to_tensor(bytes: &[u8], spec: &ModelSpec) -> Result<Array4<f32>, ClassifyError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| ClassifyError::InvalidImage(e.to_string()))?;

    let (height, width) = (spec.input_height, spec.input_width);
    let resized = decoded.resize_exact(width, height, FilterType::Triangle);

    let (h, w) = (height as usize, width as usize);
    let tensor = match spec.input_channels {
        1 => {
            let gray = resized.to_luma8();
            Array4::from_shape_fn((1, h, w, 1), |(_, y, x, _)| {
                gray.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
            })
        }
        3 => {
            let rgb = resized.to_rgb8();
            Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| {
                rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
            })
        }
        other => {
            return Err(ClassifyError::Internal(format!(
                "unsupported channel count {other} in model spec"
            )))
        }
    };
    Ok(tensor)
}

/// Derives the prediction from the raw output vector: argmax for the label
/// (ties break to the lowest class index), its score as the confidence, and
/// the full label-to-score map taken verbatim — the model's softmax output is
/// already a probability distribution, so no re-normalization.
fn shape_result(scores: &[f32], labels: &[String], filename: &str) -> PredictionResponse {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = i;
        }
    }

    let probabilities: BTreeMap<String, f32> = labels
        .iter()
        .cloned()
        .zip(scores.iter().copied())
        .collect();

    PredictionResponse {
        filename: filename.to_string(),
        prediction: labels[best].clone(),
        confidence: scores[best],
        probabilities,
    }
}
