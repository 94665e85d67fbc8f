use super::anchors::{generate_anchors, Anchor, FACE_ANCHOR_LEVELS};
use super::decode::{decode_box, select_best, BoxCorrection, BOX_RECORD_LEN, SCORE_THRESHOLD};
use super::focal::FocalRegion;
use super::smoother::TemporalSmoother;
use super::types::DetectionBox;
use crate::config::AvatarSettings;
use crate::error::Result;
use crate::filter::VideoFilter;
use crate::frame::VideoFrame;
use crate::inference::InferenceEngine;
use crate::pipeline::{output_values, FramePipeline};

/// Input (width, height) of the face detector
pub const DETECTION_SIZE: (u32, u32) = (128, 128);

/// Crops the frame to a circle that follows the most prominent face
pub struct CircleAvatarFilter {
    pipeline: FramePipeline,
    settings: AvatarSettings,
    anchors: Vec<Anchor>,
    smoother: TemporalSmoother,
    focal: Option<FocalRegion>,
}

impl CircleAvatarFilter {
    /// Wrap an engine taking 128x128 input and producing box records and scores
    pub fn new(engine: Box<dyn InferenceEngine>, settings: AvatarSettings) -> Result<Self> {
        let settings = settings.sanitized();
        let (width, height) = DETECTION_SIZE;
        let pipeline = FramePipeline::new(engine, DETECTION_SIZE, false, false)?;
        let anchors = generate_anchors(width, height, &FACE_ANCHOR_LEVELS);
        tracing::info!(
            "Circle avatar filter ready, {} anchors, face scale {}",
            anchors.len(),
            settings.face_size_scale
        );
        Ok(Self {
            pipeline,
            settings,
            anchors,
            smoother: TemporalSmoother::new(width, height),
            focal: None,
        })
    }

    /// Load the face detector through ONNX Runtime
    #[cfg(feature = "onnx")]
    pub fn from_config(config: &crate::config::EngineConfig, settings: AvatarSettings) -> anyhow::Result<Self> {
        let engine = crate::inference::OnnxEngine::new(config, DETECTION_SIZE)?;
        Ok(Self::new(Box::new(engine), settings)?)
    }

    pub fn settings(&self) -> AvatarSettings {
        self.settings
    }

    pub fn update(&mut self, settings: AvatarSettings) {
        self.settings = settings.sanitized();
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Box currently shown, possibly the sentinel
    pub fn smoothed_box(&self) -> DetectionBox {
        self.smoother.current()
    }

    /// Region for the shader, `None` until a frame has been processed
    pub fn focal_region(&self) -> Option<FocalRegion> {
        self.focal
    }

    /// Forget tracking state, e.g. after a scene cut
    pub fn reset(&mut self) {
        tracing::info!("Resetting face tracking");
        self.smoother.reset();
        self.focal = None;
    }
}

impl VideoFilter for CircleAvatarFilter {
    fn name(&self) -> &'static str {
        "circle_avatar"
    }

    fn process(&mut self, frame: &VideoFrame<'_>) -> Result<()> {
        let run = self.pipeline.run(frame)?;
        let count = self.anchors.len();
        let records = output_values(&run.outputs, 0, count * BOX_RECORD_LEN)?;
        let scores = output_values(&run.outputs, 1, count)?;

        let detection = {
            let _span = tracing::debug_span!("decode").entered();
            select_best(scores, SCORE_THRESHOLD).map(|index| {
                let correction = BoxCorrection::new(&run.geometry, &self.settings);
                decode_box(records, &self.anchors, index, &correction)
            })
        };
        match &detection {
            Some(found) => tracing::debug!("Face at {:?}", found),
            None => tracing::debug!("No face above threshold"),
        }

        let shown = self.smoother.advance(detection);
        self.focal = Some(FocalRegion::resolve(
            &shown,
            self.focal,
            &run.geometry,
            self.settings.face_size_scale as f32,
        ));
        Ok(())
    }
}
