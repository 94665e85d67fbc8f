use super::types::DetectionBox;
use crate::geometry::FrameGeometry;

/// Face center and size as fractions of the frame, fed to the avatar shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocalRegion {
    pub center: (f32, f32),
    pub size: (f32, f32),
}

impl FocalRegion {
    /// Centered circle spanning the frame height
    pub fn full_frame(frame_width: f32, frame_height: f32) -> Self {
        let side = frame_height / frame_width;
        Self {
            center: (0.5, 0.5),
            size: (side, side),
        }
    }

    /// Region for this frame's smoothed box.
    ///
    /// A box centered outside the inference image keeps `previous`.
    pub fn resolve(
        smoothed: &DetectionBox,
        previous: Option<FocalRegion>,
        geometry: &FrameGeometry,
        face_size_scale: f32,
    ) -> Self {
        let inference_width = geometry.inference_width as f32;
        let inference_height = geometry.inference_height as f32;
        let frame_width = geometry.source_width as f32;
        let frame_height = geometry.source_height as f32;

        if !smoothed.in_bounds(inference_width, inference_height) {
            return previous.unwrap_or_else(|| Self::full_frame(frame_width, frame_height));
        }

        let mut center = (
            smoothed.center_x / inference_width,
            smoothed.center_y / inference_height,
        );
        let size = (
            smoothed.width * frame_width / inference_width / geometry.crop_width as f32,
            smoothed.height * frame_height / inference_height / geometry.crop_height as f32,
        );

        if center.0 - size.0 / 2.0 < 0.0 {
            center.0 = size.0 / 2.0;
        } else if center.0 + size.0 / 2.0 > 1.0 {
            center.0 = 1.0 - size.0 / 2.0;
        }
        if center.1 - size.1 < 0.0 {
            center.1 = size.1;
        } else if center.1 + size.1 > 1.0 {
            center.1 = 1.0 - size.1;
        }

        if center.0 < 0.0 || center.1 < 0.0 || size.0 <= 0.0 || size.1 <= 0.0 {
            return Self::full_frame(frame_width, frame_height);
        }
        Self {
            center,
            size: (size.0 * face_size_scale, size.1 * face_size_scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::plan;

    fn geometry() -> FrameGeometry {
        plan(1920, 1080, 7680, (128, 128)).unwrap()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn sentinel_without_history_is_full_frame() {
        let region = FocalRegion::resolve(&DetectionBox::INVALID, None, &geometry(), 2.0);
        assert_eq!(region.center, (0.5, 0.5));
        assert!(close(region.size.0, 1080.0 / 1920.0));
        assert_eq!(region.size.0, region.size.1);
    }

    #[test]
    fn out_of_bounds_keeps_previous_region() {
        let previous = FocalRegion {
            center: (0.3, 0.4),
            size: (0.2, 0.2),
        };
        let off = DetectionBox::new(130.0, 64.0, 10.0, 10.0);
        assert_eq!(
            FocalRegion::resolve(&off, Some(previous), &geometry(), 2.0),
            previous
        );
    }

    #[test]
    fn centered_face_is_normalized_and_scaled() {
        let face = DetectionBox::new(64.0, 64.0, 12.0, 16.0);
        let region = FocalRegion::resolve(&face, None, &geometry(), 2.0);
        assert_eq!(region.center, (0.5, 0.5));
        assert!(close(region.size.0, 2.0 * 12.0 * 1920.0 / 128.0 / 1440.0));
        assert!(close(region.size.1, 2.0 * 16.0 * 1080.0 / 128.0 / 1080.0));
    }

    #[test]
    fn region_is_pushed_back_inside_the_frame() {
        let face = DetectionBox::new(2.0, 4.0, 12.0, 16.0);
        let region = FocalRegion::resolve(&face, None, &geometry(), 1.0);
        let width = 12.0 * 1920.0 / 128.0 / 1440.0;
        let height = 16.0 / 128.0;
        assert!(close(region.center.0, width / 2.0));
        assert!(close(region.center.1, height));
    }

    #[test]
    fn collapsed_box_is_full_frame() {
        let face = DetectionBox::new(64.0, 64.0, 0.0, 16.0);
        let region = FocalRegion::resolve(&face, None, &geometry(), 2.0);
        assert_eq!(region, FocalRegion::full_frame(1920.0, 1080.0));
    }
}
