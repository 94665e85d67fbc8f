/// Face box in inference-resolution pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionBox {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl DetectionBox {
    /// Reserved value meaning "nothing detected"
    pub const INVALID: DetectionBox = DetectionBox {
        center_x: -1.0,
        center_y: -1.0,
        width: -1.0,
        height: -1.0,
    };

    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Every component is strictly positive
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.center_x > 0.0 && self.center_y > 0.0
    }

    /// Center lies strictly inside a `width` x `height` image
    pub fn in_bounds(&self, width: f32, height: f32) -> bool {
        self.center_x > 0.0 && self.center_x < width && self.center_y > 0.0 && self.center_y < height
    }
}

impl Default for DetectionBox {
    fn default() -> Self {
        Self::INVALID
    }
}
