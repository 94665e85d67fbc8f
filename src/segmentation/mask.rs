use crate::geometry::FrameGeometry;

/// Placement of the inference-resolution probability map in the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskLayout {
    /// Probability map width
    pub width: usize,
    /// Probability map height
    pub height: usize,
    /// Mask row length
    pub stride: usize,
    pub x_offset: usize,
    pub y_offset: usize,
    /// The map was computed from a mirrored tensor and is flipped back
    pub mirrored: bool,
}

impl MaskLayout {
    pub fn from_geometry(geometry: &FrameGeometry, mirrored: bool) -> Self {
        Self {
            width: geometry.inference_width as usize,
            height: geometry.inference_height as usize,
            stride: geometry.output_stride,
            x_offset: geometry.output_column_offset(),
            y_offset: geometry.output_row_offset(),
            mirrored,
        }
    }
}

/// 0 below `threshold`, otherwise the probability scaled to a byte
pub fn mask_value(probability: f32, threshold: f32) -> u8 {
    if probability < threshold {
        0
    } else {
        (probability * 255.0).round().clamp(0.0, 255.0) as u8
    }
}

/// Write the thresholded probability map into `mask`.
///
/// Only the centered inference-sized window is written; columns and rows
/// outside it keep whatever they held.
pub fn threshold_mask(probabilities: &[f32], layout: &MaskLayout, threshold: f32, mask: &mut [u8]) {
    let _span = tracing::debug_span!("decode").entered();

    for (y, row) in probabilities
        .chunks_exact(layout.width)
        .take(layout.height)
        .enumerate()
    {
        let start = (layout.y_offset + y) * layout.stride + layout.x_offset;
        let Some(out) = mask.get_mut(start..start + layout.width) else {
            break;
        };
        for (x, dst) in out.iter_mut().enumerate() {
            let src = if layout.mirrored { layout.width - 1 - x } else { x };
            *dst = mask_value(row[src], threshold);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::plan;

    #[test]
    fn values_around_the_threshold() {
        assert_eq!(mask_value(0.79, 0.8), 0);
        assert_eq!(mask_value(0.81, 0.8), 207);
        assert_eq!(mask_value(0.8, 0.8), 204);
        assert_eq!(mask_value(1.0, 0.0), 255);
        assert_eq!(mask_value(0.0, 0.0), 0);
    }

    #[test]
    fn window_is_centered_in_wider_mask() {
        let layout = MaskLayout {
            width: 2,
            height: 2,
            stride: 6,
            x_offset: 2,
            y_offset: 0,
            mirrored: false,
        };
        let mut mask = vec![9u8; 12];
        threshold_mask(&[1.0, 0.0, 0.5, 1.0], &layout, 0.4, &mut mask);
        assert_eq!(mask, vec![9, 9, 255, 0, 9, 9, 9, 9, 128, 255, 9, 9]);
    }

    #[test]
    fn mirrored_map_is_flipped_back() {
        let layout = MaskLayout {
            width: 3,
            height: 1,
            stride: 3,
            x_offset: 0,
            y_offset: 0,
            mirrored: true,
        };
        let mut mask = vec![0u8; 3];
        threshold_mask(&[1.0, 0.5, 0.0], &layout, 0.0, &mut mask);
        assert_eq!(mask, vec![0, 128, 255]);
    }

    #[test]
    fn layout_follows_geometry() {
        let g = plan(1920, 1080, 7680, (256, 256)).unwrap();
        let layout = MaskLayout::from_geometry(&g, false);
        assert_eq!(layout.stride, 342);
        assert_eq!(layout.x_offset, 43);
        assert_eq!(layout.y_offset, 0);

        let g = plan(1080, 1920, 4320, (256, 256)).unwrap();
        let layout = MaskLayout::from_geometry(&g, false);
        assert_eq!(layout.stride, 256);
        assert_eq!(layout.x_offset, 0);
        assert_eq!(layout.y_offset, (606 - 256) / 2);
    }

    #[test]
    fn raising_threshold_never_adds_pixels() {
        let probabilities: Vec<f32> = (0..256).map(|i| (i as f32 * 0.618).fract()).collect();
        let layout = MaskLayout {
            width: 16,
            height: 16,
            stride: 16,
            x_offset: 0,
            y_offset: 0,
            mirrored: false,
        };
        let mut previous = usize::MAX;
        for step in 0..=20 {
            let mut mask = vec![0u8; 256];
            threshold_mask(&probabilities, &layout, step as f32 / 20.0, &mut mask);
            let visible = mask.iter().filter(|&&v| v > 0).count();
            assert!(visible <= previous);
            previous = visible;
        }
    }
}
