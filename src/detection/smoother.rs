use super::types::DetectionBox;

/// Boxes remembered by the smoother
pub const HISTORY_LEN: usize = 3;

/// Fixed ring of the most recent boxes, sentinels included
#[derive(Debug, Clone, PartialEq)]
pub struct BoxHistory {
    slots: [DetectionBox; HISTORY_LEN],
    next: usize,
}

impl BoxHistory {
    pub fn new() -> Self {
        Self {
            slots: [DetectionBox::INVALID; HISTORY_LEN],
            next: 0,
        }
    }

    /// Overwrite the oldest slot
    pub fn push(&mut self, detection: DetectionBox) {
        self.slots[self.next] = detection;
        self.next = (self.next + 1) % HISTORY_LEN;
    }

    pub fn valid_count(&self) -> usize {
        self.slots.iter().filter(|b| b.is_valid()).count()
    }

    /// Component-wise mean of the valid slots
    pub fn valid_mean(&self) -> Option<DetectionBox> {
        let mut sum = DetectionBox::new(0.0, 0.0, 0.0, 0.0);
        let mut count = 0usize;
        for b in self.slots.iter().filter(|b| b.is_valid()) {
            sum.center_x += b.center_x;
            sum.center_y += b.center_y;
            sum.width += b.width;
            sum.height += b.height;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f32;
        Some(DetectionBox::new(
            sum.center_x / n,
            sum.center_y / n,
            sum.width / n,
            sum.height / n,
        ))
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for BoxHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Dead-zone thresholds and damping of the smoother
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadZone {
    /// Position changes up to this fraction of the input size are ignored
    pub position_fraction: f32,
    /// Size changes up to this fraction of the input size are ignored
    pub size_fraction: f32,
    /// Larger position changes move by delta / position_scale per frame
    pub position_scale: f32,
    /// Larger size changes move by delta / size_scale per frame
    pub size_scale: f32,
}

impl Default for DeadZone {
    fn default() -> Self {
        Self {
            position_fraction: 0.01,
            size_fraction: 0.05,
            position_scale: 6.0,
            size_scale: 15.0,
        }
    }
}

/// Keeps the visible face box steady across frames.
///
/// The first detections are taken as they come. Once the history is full
/// of real boxes, the visible box only drifts toward the history mean, and
/// only along dimensions where the gap leaves the dead zone. Frames without
/// a face fall back to the mean of what the history still remembers.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    history: BoxHistory,
    current: DetectionBox,
    dead_zone: DeadZone,
    width: f32,
    height: f32,
}

impl TemporalSmoother {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_dead_zone(width, height, DeadZone::default())
    }

    pub fn with_dead_zone(width: u32, height: u32, dead_zone: DeadZone) -> Self {
        Self {
            history: BoxHistory::new(),
            current: DetectionBox::INVALID,
            dead_zone,
            width: width as f32,
            height: height as f32,
        }
    }

    /// The box consumers should show
    pub fn current(&self) -> DetectionBox {
        self.current
    }

    pub fn history(&self) -> &BoxHistory {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.current = DetectionBox::INVALID;
    }

    /// Advance by one frame with this frame's detection, if any
    pub fn advance(&mut self, detection: Option<DetectionBox>) -> DetectionBox {
        let _span = tracing::debug_span!("smooth").entered();

        let previous_mean = self.history.valid_mean();
        let previous_valid = self.history.valid_count();

        match detection {
            None => {
                self.history.push(DetectionBox::INVALID);
                self.current = previous_mean.unwrap_or(DetectionBox::INVALID);
            }
            Some(detected) => {
                self.history.push(detected);
                match previous_mean {
                    Some(mean) if previous_valid == HISTORY_LEN => self.nudge_toward(mean),
                    _ => self.current = detected,
                }
            }
        }
        self.current
    }

    fn nudge_toward(&mut self, target: DetectionBox) {
        let dz = self.dead_zone;
        let position_x = self.width * dz.position_fraction;
        let position_y = self.height * dz.position_fraction;
        let size_x = self.width * dz.size_fraction;
        let size_y = self.height * dz.size_fraction;

        let c = &mut self.current;
        c.center_x = damp(c.center_x, target.center_x, position_x, dz.position_scale);
        c.center_y = damp(c.center_y, target.center_y, position_y, dz.position_scale);
        c.width = damp(c.width, target.width, size_x, dz.size_scale);
        c.height = damp(c.height, target.height, size_y, dz.size_scale);
    }
}

fn damp(current: f32, target: f32, dead_zone: f32, scale: f32) -> f32 {
    let delta = target - current;
    if delta.abs() > dead_zone {
        current + delta / scale
    } else {
        current
    }
}
