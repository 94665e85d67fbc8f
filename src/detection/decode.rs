use super::anchors::Anchor;
use super::types::DetectionBox;
use crate::config::AvatarSettings;
use crate::geometry::FrameGeometry;

/// Values per anchor in the box tensor: center offset, size, 6 keypoints
pub const BOX_RECORD_LEN: usize = 16;

/// A score must exceed this to count as a face
pub const SCORE_THRESHOLD: f32 = 0.0;

/// Index of the strictly highest score above `threshold`; the first one wins ties
pub fn select_best(scores: &[f32], threshold: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        let floor = best.map_or(threshold, |(_, best_score)| best_score);
        if score > floor {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

/// Maps a box decoded on the crop back to source-frame proportions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCorrection {
    pub width_ratio: f32,
    pub height_ratio: f32,
    pub x_bias: f32,
    pub y_bias: f32,
    pub correct_height: bool,
    pub inference_width: f32,
    pub inference_height: f32,
}

impl BoxCorrection {
    pub fn new(geometry: &FrameGeometry, settings: &AvatarSettings) -> Self {
        Self {
            width_ratio: geometry.width_ratio(),
            height_ratio: geometry.height_ratio(),
            x_bias: settings.x_bias as f32,
            y_bias: settings.y_bias as f32,
            correct_height: settings.correct_height,
            inference_width: geometry.inference_width as f32,
            inference_height: geometry.inference_height as f32,
        }
    }

    /// No crop, no bias
    pub fn identity(inference_width: f32, inference_height: f32) -> Self {
        Self {
            width_ratio: 1.0,
            height_ratio: 1.0,
            x_bias: 0.0,
            y_bias: 0.0,
            correct_height: false,
            inference_width,
            inference_height,
        }
    }
}

/// Decode the record of anchor `index` from the flat box tensor
pub fn decode_box(records: &[f32], anchors: &[Anchor], index: usize, correction: &BoxCorrection) -> DetectionBox {
    let record = &records[index * BOX_RECORD_LEN..(index + 1) * BOX_RECORD_LEN];
    let anchor = anchors[index];
    let c = correction;

    let center_x = (record[0] + anchor.x) * c.width_ratio
        + (1.0 - c.width_ratio) / 2.0 * c.inference_width
        + c.x_bias;
    let width = record[2] * c.width_ratio;

    let (center_y, height) = if c.correct_height {
        (
            (record[1] + anchor.y) * c.height_ratio
                + (1.0 - c.height_ratio) / 2.0 * c.inference_height
                + c.y_bias,
            record[3] * c.height_ratio,
        )
    } else {
        (record[1] + anchor.y + c.y_bias, record[3])
    };

    DetectionBox::new(center_x, center_y, width, height)
}
