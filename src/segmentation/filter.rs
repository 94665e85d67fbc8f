use super::mask::{threshold_mask, MaskLayout};
use super::smooth::SmoothParams;
use crate::config::MaskSettings;
use crate::error::Result;
use crate::filter::VideoFilter;
use crate::frame::VideoFrame;
use crate::geometry::FrameGeometry;
use crate::inference::InferenceEngine;
use crate::pipeline::{output_values, FramePipeline};
use image::GrayImage;

/// Input (width, height) of the segmentation model
pub const SEGMENTATION_SIZE: (u32, u32) = (256, 256);

/// Mask texture and blur parameters for the compositing shader
#[derive(Debug, Clone, Copy)]
pub struct MaskRender<'a> {
    pub mask: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub params: SmoothParams,
}

impl MaskRender<'_> {
    /// Copy of the mask as a grayscale image, for previews and dumps
    pub fn to_image(&self) -> Option<GrayImage> {
        GrayImage::from_raw(self.width, self.height, self.mask.to_vec())
    }
}

/// Removes the background by thresholding a person-probability map
pub struct BackgroundMaskFilter {
    pipeline: FramePipeline,
    settings: MaskSettings,
    params: Option<(FrameGeometry, SmoothParams)>,
}

impl BackgroundMaskFilter {
    /// Wrap an engine taking 256x256 input and producing one probability map
    pub fn new(engine: Box<dyn InferenceEngine>, settings: MaskSettings) -> Result<Self> {
        let settings = settings.sanitized();
        let pipeline = FramePipeline::new(engine, SEGMENTATION_SIZE, true, true)?;
        tracing::info!("Background mask filter ready, threshold {}", settings.threshold);
        Ok(Self {
            pipeline,
            settings,
            params: None,
        })
    }

    /// Load the segmentation model through ONNX Runtime
    #[cfg(feature = "onnx")]
    pub fn from_config(config: &crate::config::EngineConfig, settings: MaskSettings) -> anyhow::Result<Self> {
        let engine = crate::inference::OnnxEngine::new(config, SEGMENTATION_SIZE)?;
        Ok(Self::new(Box::new(engine), settings)?)
    }

    pub fn settings(&self) -> MaskSettings {
        self.settings
    }

    pub fn update(&mut self, settings: MaskSettings) {
        self.settings = settings.sanitized();
        tracing::debug!("Mask threshold set to {}", self.settings.threshold);
    }

    /// Current mask, `None` until a frame has been planned
    pub fn mask_render(&self) -> Option<MaskRender<'_>> {
        let (geometry, params) = self.params.as_ref()?;
        if self.pipeline.geometry() != Some(geometry) {
            return None;
        }
        let mask = self.pipeline.mask()?;
        Some(MaskRender {
            mask,
            width: geometry.output_stride as u32,
            height: geometry.output_height as u32,
            params: *params,
        })
    }
}

impl VideoFilter for BackgroundMaskFilter {
    fn name(&self) -> &'static str {
        "background_mask"
    }

    fn process(&mut self, frame: &VideoFrame<'_>) -> Result<()> {
        let run = self.pipeline.run(frame)?;
        let geometry = run.geometry;

        if self.params.map_or(true, |(cached, _)| cached != geometry) {
            let params = SmoothParams::compute(
                geometry.source_width as f32,
                geometry.source_height as f32,
                geometry.output_stride as f32,
                geometry.output_height as f32,
            );
            self.params = Some((geometry, params));
        }

        let (width, height) = SEGMENTATION_SIZE;
        let probabilities = output_values(&run.outputs, 0, (width * height) as usize)?;
        let layout = MaskLayout::from_geometry(&geometry, self.pipeline.is_mirrored());
        let threshold = self.settings.threshold as f32;
        if let Some(mask) = self.pipeline.mask_mut() {
            threshold_mask(probabilities, &layout, threshold, mask);
        }
        Ok(())
    }
}
