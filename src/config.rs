use std::path::PathBuf;

/// Settings of the background mask filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskSettings {
    /// Probabilities below this become transparent, in [0, 1]
    pub threshold: f64,
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self { threshold: 0.8 }
    }
}

impl MaskSettings {
    pub fn sanitized(self) -> Self {
        Self {
            threshold: clamp_or(self.threshold, 0.0, 1.0, 0.8),
        }
    }
}

/// Settings of the circle avatar filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarSettings {
    /// Multiplier applied to the detected face size, in [1, 4]
    pub face_size_scale: f64,
    /// Horizontal offset added to the face center, inference pixels
    pub x_bias: f64,
    /// Vertical offset added to the face center, inference pixels
    pub y_bias: f64,
    /// Apply the crop-ratio correction to the vertical axis as well.
    /// Off reproduces the established behavior where only x and width
    /// are corrected.
    pub correct_height: bool,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            face_size_scale: 2.0,
            x_bias: 0.0,
            y_bias: 0.0,
            correct_height: false,
        }
    }
}

impl AvatarSettings {
    pub fn sanitized(self) -> Self {
        Self {
            face_size_scale: clamp_or(self.face_size_scale, 1.0, 4.0, 2.0),
            x_bias: clamp_or(self.x_bias, -10.0, 10.0, 0.0),
            y_bias: clamp_or(self.y_bias, -10.0, 10.0, 0.0),
            correct_height: self.correct_height,
        }
    }
}

/// How to construct an inference engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub model_path: PathBuf,
    /// Intra-op thread hint
    pub threads: usize,
}

impl EngineConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            threads: 2,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
