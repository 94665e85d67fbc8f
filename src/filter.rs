use crate::error::{FilterError, Result};
use crate::frame::VideoFrame;

/// What happened to a frame handed to a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Render state was updated from this frame
    Processed,
    /// The frame is shown untouched and render state kept from before
    PassThrough(PassReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// Zero-area, planar or truncated frame
    DegradedInput,
    /// The crop plan came out with a zero stride
    Geometry,
    /// A per-frame buffer could not be allocated
    Resources,
    /// Scaling, the engine or its outputs failed
    Inference,
}

impl From<&FilterError> for PassReason {
    fn from(err: &FilterError) -> Self {
        match err {
            FilterError::InvalidFrame { .. }
            | FilterError::PlaneTooSmall { .. }
            | FilterError::UnsupportedFormat(_) => PassReason::DegradedInput,
            FilterError::ZeroStride { .. } => PassReason::Geometry,
            FilterError::Allocation { .. } => PassReason::Resources,
            FilterError::InputShape { .. }
            | FilterError::OutputShape { .. }
            | FilterError::Scaler(_)
            | FilterError::Inference(_) => PassReason::Inference,
        }
    }
}

/// A per-source video filter driven one frame at a time by the host
pub trait VideoFilter {
    fn name(&self) -> &'static str;

    /// Run every stage on `frame`, updating the render state
    fn process(&mut self, frame: &VideoFrame<'_>) -> Result<()>;

    /// Host entry point: never fails, degrades to passing the frame through
    fn filter_video(&mut self, frame: &VideoFrame<'_>) -> FrameStatus {
        if frame.is_empty() {
            return FrameStatus::PassThrough(PassReason::DegradedInput);
        }
        match self.process(frame) {
            Ok(()) => FrameStatus::Processed,
            Err(err) => {
                tracing::warn!("{}: {}; passing frame through", self.name(), err);
                FrameStatus::PassThrough(PassReason::from(&err))
            }
        }
    }
}
