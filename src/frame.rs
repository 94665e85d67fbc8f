use crate::error::{FilterError, Result};

/// Pixel layouts a host frame may carry in its first plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba,
    Bgra,
    Bgrx,
    Rgb,
    Bgr,
    Gray,
    /// Planar 4:2:0, accepted by the host but not by the cropper
    I420,
    Nv12,
}

impl PixelFormat {
    /// Bytes per pixel of a packed format, `None` for planar ones
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Rgba | PixelFormat::Bgra | PixelFormat::Bgrx => Some(4),
            PixelFormat::Rgb | PixelFormat::Bgr => Some(3),
            PixelFormat::Gray => Some(1),
            PixelFormat::I420 | PixelFormat::Nv12 => None,
        }
    }

    pub fn is_packed(self) -> bool {
        self.bytes_per_pixel().is_some()
    }

    /// Read one packed pixel as RGB
    pub fn to_rgb(self, px: &[u8]) -> [u8; 3] {
        match self {
            PixelFormat::Rgba | PixelFormat::Rgb => [px[0], px[1], px[2]],
            PixelFormat::Bgra | PixelFormat::Bgrx | PixelFormat::Bgr => [px[2], px[1], px[0]],
            PixelFormat::Gray => [px[0], px[0], px[0]],
            PixelFormat::I420 | PixelFormat::Nv12 => [0, 0, 0],
        }
    }
}

/// Borrowed view of a frame delivered by the host
#[derive(Debug, Clone)]
pub struct VideoFrame<'a> {
    width: u32,
    height: u32,
    format: PixelFormat,
    planes: Vec<&'a [u8]>,
    strides: Vec<usize>,
}

impl<'a> VideoFrame<'a> {
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        planes: Vec<&'a [u8]>,
        strides: Vec<usize>,
    ) -> Self {
        Self {
            width,
            height,
            format,
            planes,
            strides,
        }
    }

    /// Single-plane frame
    pub fn packed(width: u32, height: u32, format: PixelFormat, data: &'a [u8], stride: usize) -> Self {
        Self::new(width, height, format, vec![data], vec![stride])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn plane(&self, index: usize) -> Option<&'a [u8]> {
        self.planes.get(index).copied()
    }

    pub fn stride(&self, index: usize) -> Option<usize> {
        self.strides.get(index).copied()
    }

    /// First plane and its stride, rejecting frames the pipeline cannot use
    pub(crate) fn primary_plane(&self) -> Result<(&'a [u8], usize)> {
        if self.is_empty() {
            return Err(FilterError::InvalidFrame {
                width: self.width,
                height: self.height,
            });
        }
        if !self.format.is_packed() {
            return Err(FilterError::UnsupportedFormat(self.format));
        }
        match (self.plane(0), self.stride(0)) {
            (Some(data), Some(stride)) if stride > 0 => Ok((data, stride)),
            _ => Err(FilterError::InvalidFrame {
                width: self.width,
                height: self.height,
            }),
        }
    }
}
