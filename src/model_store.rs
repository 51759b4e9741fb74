use crate::config::ModelSpec;
use crate::errors::ModelError;
use ndarray::Array4;
use std::path::Path;
use tract_onnx::prelude::*;

type OnnxPlan = TypedRunnableModel<TypedModel>;

enum Engine {
    Onnx(OnnxPlan),
    /// Deterministic scores for tests that have no model artifact on disk.
    #[cfg(test)]
    Fixed(Vec<f32>),
}

/// Holds the one loaded model instance for the process lifetime.
///
/// Loaded once at startup and shared read-only across all workers. tract's
/// `SimplePlan::run` takes `&self` and builds per-call state, so concurrent
/// forward passes need no lock.
pub struct ModelStore {
    engine: Option<Engine>,
    spec: ModelSpec,
}

impl ModelStore {
    /// Loads the ONNX artifact and pins its input to `(1, h, w, c)` f32.
    /// A failure here must abort startup; the process never serves with a
    /// null model.
    pub fn load(path: &Path, spec: ModelSpec) -> Result<Self, ModelError> {
        let shape = tvec!(
            1,
            spec.input_height as usize,
            spec.input_width as usize,
            spec.input_channels as usize
        );
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), shape)))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| ModelError::Load {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        tracing::info!(
            model = %path.display(),
            classes = spec.class_labels.len(),
            "model loaded"
        );
        Ok(Self {
            engine: Some(Engine::Onnx(plan)),
            spec,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Runs one forward pass over a batch-of-one NHWC tensor and returns one
    /// score per class, in the fixed class order. Never mutates the model;
    /// any runtime failure is scoped to this call.
    pub fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>, ModelError> {
        let engine = self.engine.as_ref().ok_or(ModelError::NotLoaded)?;
        let scores: Vec<f32> = match engine {
            Engine::Onnx(plan) => {
                let (b, h, w, c) = input.dim();
                let tensor = tract_ndarray::Array4::from_shape_vec((b, h, w, c), input.into_raw_vec())
                    .map_err(|e| ModelError::Forward(e.to_string()))?
                    .into_tensor();
                let outputs = plan
                    .run(tvec!(tensor.into()))
                    .map_err(|e| ModelError::Forward(e.to_string()))?;
                let view = outputs[0]
                    .to_array_view::<f32>()
                    .map_err(|e| ModelError::Forward(e.to_string()))?;
                view.iter().copied().collect()
            }
            #[cfg(test)]
            Engine::Fixed(scores) => scores.clone(),
        };
        if scores.len() != self.spec.class_labels.len() {
            return Err(ModelError::Forward(format!(
                "model returned {} scores for {} classes",
                scores.len(),
                self.spec.class_labels.len()
            )));
        }
        Ok(scores)
    }

    /// A store with no model, as seen by requests arriving before load.
    #[cfg(test)]
    pub fn unloaded(spec: ModelSpec) -> Self {
        Self { engine: None, spec }
    }

    /// A store whose forward pass always returns `scores`.
    #[cfg(test)]
    pub fn with_fixed_output(spec: ModelSpec, scores: Vec<f32>) -> Self {
        Self {
            engine: Some(Engine::Fixed(scores)),
            spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(spec: &ModelSpec) -> Array4<f32> {
        Array4::zeros((
            1,
            spec.input_height as usize,
            spec.input_width as usize,
            spec.input_channels as usize,
        ))
    }

    #[test]
    fn load_fails_for_missing_artifact() {
        let result = ModelStore::load(Path::new("/nonexistent/model.onnx"), ModelSpec::default());
        assert!(matches!(result, Err(ModelError::Load { .. })));
    }

    #[test]
    fn unloaded_store_is_not_ready() {
        let spec = ModelSpec::default();
        let store = ModelStore::unloaded(spec.clone());
        assert!(!store.is_ready());
        assert!(matches!(store.infer(input(&spec)), Err(ModelError::NotLoaded)));
    }

    #[test]
    fn infer_returns_one_score_per_class() {
        let spec = ModelSpec::default();
        let store = ModelStore::with_fixed_output(spec.clone(), vec![0.1, 0.9]);
        assert!(store.is_ready());
        let scores = store.infer(input(&spec)).unwrap();
        assert_eq!(scores, vec![0.1, 0.9]);
    }

    #[test]
    fn infer_rejects_mismatched_output_arity() {
        let spec = ModelSpec::default();
        let store = ModelStore::with_fixed_output(spec.clone(), vec![0.2, 0.3, 0.5]);
        assert!(matches!(store.infer(input(&spec)), Err(ModelError::Forward(_))));
    }
}
