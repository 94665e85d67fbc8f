//! Per-frame crop, inference and smoothing core for two video filters:
//! a background mask and a face-following circular avatar.
//!
//! Each filter takes host frames one at a time, cuts a centered 4:3 crop,
//! scales it to the model resolution, runs the model and turns its output
//! into render state (an 8-bit mask, or a normalized face region).

pub mod config;
pub mod detection;
pub mod error;
pub mod filter;
pub mod frame;
pub mod geometry;
pub mod inference;
pub mod pipeline;
pub mod preprocess;
pub mod scaler;
pub mod segmentation;

pub use config::{AvatarSettings, EngineConfig, MaskSettings};
pub use detection::CircleAvatarFilter;
pub use error::{FilterError, Result};
pub use filter::{FrameStatus, PassReason, VideoFilter};
pub use frame::{PixelFormat, VideoFrame};
pub use inference::InferenceEngine;
pub use segmentation::BackgroundMaskFilter;
