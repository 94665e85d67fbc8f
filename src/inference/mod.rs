#[cfg(feature = "onnx")]
mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::OnnxEngine;

use anyhow::Result;
use ndarray::{ArrayD, ArrayView4};

/// Synchronous tensor-in, tensors-out model
///
/// Implementations own every native resource they hold; dropping the
/// engine releases them.
pub trait InferenceEngine {
    /// Run the model on one NHWC RGB tensor and return its outputs in order
    fn infer(&mut self, input: ArrayView4<'_, f32>) -> Result<Vec<ArrayD<f32>>>;

    /// Input (width, height) the model expects
    fn input_size(&self) -> (u32, u32);
}
