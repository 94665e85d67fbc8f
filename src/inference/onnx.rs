use super::InferenceEngine;
use crate::config::EngineConfig;
use anyhow::{Context, Result};
use ndarray::{ArrayD, ArrayView4};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

/// ONNX Runtime session behind the [`InferenceEngine`] seam
pub struct OnnxEngine {
    session: Session,
    width: u32,
    height: u32,
}

impl OnnxEngine {
    /// Load a model expecting `input_size` (width, height) NHWC input
    pub fn new(config: &EngineConfig, input_size: (u32, u32)) -> Result<Self> {
        let path = config.model_path.as_path();

        tracing::info!("Loading model from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!(
            "Model loaded: {} input(s), {} output(s)",
            session.inputs.len(),
            session.outputs.len()
        );

        Ok(Self {
            session,
            width: input_size.0,
            height: input_size.1,
        })
    }
}

impl InferenceEngine for OnnxEngine {
    fn infer(&mut self, input: ArrayView4<'_, f32>) -> Result<Vec<ArrayD<f32>>> {
        let _span = tracing::debug_span!("inference").entered();

        let tensor = Tensor::from_array(input.to_owned())?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("Failed to run inference")?;

        let mut extracted = Vec::with_capacity(outputs.len());
        for index in 0..outputs.len() {
            let array = outputs[index]
                .try_extract_array::<f32>()
                .with_context(|| format!("Output {index} is not a float tensor"))?;
            extracted.push(array.to_owned());
        }
        Ok(extracted)
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
