use crate::error::{try_zeroed, FilterError, Result};
use crate::frame::VideoFrame;
use crate::geometry::{crop_frame, CropBuffer, FrameGeometry, GeometryPlanner};
use crate::inference::InferenceEngine;
use crate::preprocess::Preprocessor;
use crate::scaler::{FrameScaler, ImageScaler, ScalerKey};
use ndarray::{Array4, ArrayD};

/// Buffers whose size follows the crop plan; replaced as one unit
#[derive(Debug)]
struct FrameBuffers {
    crop: CropBuffer,
    bgr: Vec<u8>,
    mask: Vec<u8>,
}

impl FrameBuffers {
    fn allocate(geometry: &FrameGeometry, with_mask: bool) -> Result<Self> {
        let bgr_len = geometry.inference_width as usize * geometry.inference_height as usize * 3;
        Ok(Self {
            crop: CropBuffer::allocate(geometry)?,
            bgr: try_zeroed(bgr_len)?,
            mask: if with_mask {
                try_zeroed(geometry.output_len())?
            } else {
                Vec::new()
            },
        })
    }
}

/// Result of pushing one frame through the shared stages
#[derive(Debug)]
pub struct FrameRun {
    pub geometry: FrameGeometry,
    /// The crop plan changed with this frame
    pub resized: bool,
    pub outputs: Vec<ArrayD<f32>>,
}

/// Plan, crop, scale, tensor and inference stages shared by both filters
pub struct FramePipeline {
    planner: GeometryPlanner,
    buffers: Option<FrameBuffers>,
    scaler: Option<Box<dyn FrameScaler>>,
    preprocessor: Preprocessor,
    tensor: Array4<f32>,
    engine: Box<dyn InferenceEngine>,
    inference: (u32, u32),
    with_mask: bool,
}

impl FramePipeline {
    /// Fails when the engine disagrees on the input size or the tensor
    /// cannot be allocated.
    pub fn new(
        engine: Box<dyn InferenceEngine>,
        inference: (u32, u32),
        mirror: bool,
        with_mask: bool,
    ) -> Result<Self> {
        let actual = engine.input_size();
        if actual != inference {
            return Err(FilterError::InputShape {
                expected: inference,
                actual,
            });
        }
        let mut preprocessor = Preprocessor::new(inference.0, inference.1);
        if mirror {
            preprocessor = preprocessor.mirrored();
        }
        let tensor = preprocessor.allocate()?;

        Ok(Self {
            planner: GeometryPlanner::new(inference.0, inference.1),
            buffers: None,
            scaler: None,
            preprocessor,
            tensor,
            engine,
            inference,
            with_mask,
        })
    }

    pub fn geometry(&self) -> Option<&FrameGeometry> {
        self.planner.current()
    }

    pub fn is_mirrored(&self) -> bool {
        self.preprocessor.is_mirrored()
    }

    pub fn mask(&self) -> Option<&[u8]> {
        self.buffers
            .as_ref()
            .filter(|_| self.with_mask)
            .map(|b| b.mask.as_slice())
    }

    pub fn mask_mut(&mut self) -> Option<&mut [u8]> {
        if !self.with_mask {
            return None;
        }
        self.buffers.as_mut().map(|b| b.mask.as_mut_slice())
    }

    /// Drop every buffer sized by the previous plan, and the scaler with them
    pub fn invalidate(&mut self) {
        self.buffers = None;
        self.scaler = None;
    }

    pub fn reset(&mut self) {
        self.invalidate();
        self.planner.reset();
    }

    pub fn run(&mut self, frame: &VideoFrame<'_>) -> Result<FrameRun> {
        let (_, stride) = frame.primary_plane()?;

        let (geometry, resized) = {
            let _span = tracing::debug_span!("plan").entered();
            self.planner.update(frame.width(), frame.height(), stride)?
        };
        if resized {
            self.invalidate();
        }
        let buffers = match self.buffers.take() {
            Some(buffers) => buffers,
            None => FrameBuffers::allocate(&geometry, self.with_mask)?,
        };
        let buffers = self.buffers.insert(buffers);

        crop_frame(frame, &geometry, &mut buffers.crop)?;

        let key = ScalerKey {
            format: frame.format(),
            src_width: geometry.crop_width,
            src_height: geometry.crop_height,
            dst_width: self.inference.0,
            dst_height: self.inference.1,
        };
        let scaler = match self.scaler.take() {
            Some(scaler) if scaler.key() == key => scaler,
            _ => Box::new(ImageScaler::new(key).map_err(FilterError::Scaler)?) as Box<dyn FrameScaler>,
        };
        let scaler = self.scaler.insert(scaler);
        scaler
            .scale(&buffers.crop, &mut buffers.bgr)
            .map_err(FilterError::Scaler)?;

        self.preprocessor.preprocess(&buffers.bgr, &mut self.tensor);

        let outputs = self.engine.infer(self.tensor.view())?;
        tracing::debug!("Engine returned {} output tensor(s)", outputs.len());

        Ok(FrameRun {
            geometry,
            resized,
            outputs,
        })
    }
}

/// Flat view of output `index`, checked to hold at least `expected` values
pub(crate) fn output_values(outputs: &[ArrayD<f32>], index: usize, expected: usize) -> Result<&[f32]> {
    let values = outputs
        .get(index)
        .and_then(|array| array.as_slice())
        .unwrap_or(&[]);
    if values.len() < expected {
        return Err(FilterError::OutputShape {
            index,
            expected,
            actual: values.len(),
        });
    }
    Ok(&values[..expected])
}
