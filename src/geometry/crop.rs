use super::plan::FrameGeometry;
use crate::error::{try_zeroed, FilterError, Result};
use crate::frame::{PixelFormat, VideoFrame};

/// Owned copy of the centered crop window of a source frame
#[derive(Debug, Clone)]
pub struct CropBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
}

impl CropBuffer {
    /// Zeroed buffer sized for `geometry`
    pub fn allocate(geometry: &FrameGeometry) -> Result<Self> {
        Ok(Self {
            data: try_zeroed(geometry.crop_len())?,
            width: geometry.crop_width,
            height: geometry.crop_height,
            stride: geometry.crop_stride,
            format: PixelFormat::Rgba,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Format of the last frame copied in
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.stride)
    }
}

/// Copy the crop window described by `geometry` out of `frame`.
///
/// Each of the `crop_height` rows copies `crop_stride` bytes, starting
/// half the stride difference into the source row and, for sources taller
/// than the target aspect, half the height difference down the frame.
pub fn crop_frame(frame: &VideoFrame<'_>, geometry: &FrameGeometry, dst: &mut CropBuffer) -> Result<()> {
    let _span = tracing::debug_span!("crop").entered();

    let (plane, stride) = frame.primary_plane()?;
    let bytes_per_pixel = frame.format().bytes_per_pixel().unwrap_or(1);
    if frame.width() != geometry.source_width
        || frame.height() != geometry.source_height
        || stride != geometry.source_stride
        || stride < frame.width() as usize * bytes_per_pixel
    {
        return Err(FilterError::InvalidFrame {
            width: frame.width(),
            height: frame.height(),
        });
    }
    debug_assert_eq!(dst.stride, geometry.crop_stride);
    debug_assert_eq!(dst.height, geometry.crop_height);

    let column = geometry.source_column_offset(bytes_per_pixel);
    let first_row = geometry.source_row_offset();
    let rows = geometry.crop_height as usize;
    let needed = (first_row + rows - 1) * stride + column + geometry.crop_stride;
    if plane.len() < needed {
        return Err(FilterError::PlaneTooSmall {
            plane: 0,
            needed,
            actual: plane.len(),
        });
    }

    for (i, out) in dst.data.chunks_exact_mut(geometry.crop_stride).take(rows).enumerate() {
        let start = (first_row + i) * stride + column;
        out.copy_from_slice(&plane[start..start + geometry.crop_stride]);
    }
    dst.format = frame.format();
    Ok(())
}
