use crate::error::{FilterError, Result};

/// Width:height ratio every crop is cut to
pub const TARGET_ASPECT: (u32, u32) = (4, 3);

/// Which source dimension the crop keeps intact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropAxis {
    /// Source is 4:3 or taller; rows are dropped
    FullWidth,
    /// Source is wider than 4:3; columns are dropped
    FullHeight,
}

/// Crop rectangle and buffer layout derived from one source size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub source_width: u32,
    pub source_height: u32,
    pub source_stride: usize,
    pub crop_width: u32,
    pub crop_height: u32,
    /// Bytes copied per crop row
    pub crop_stride: usize,
    /// Row length of the output mask, inference width widened by the crop bias
    pub output_stride: usize,
    /// Rows of the output mask
    pub output_height: usize,
    pub inference_width: u32,
    pub inference_height: u32,
}

impl FrameGeometry {
    pub fn axis(&self) -> CropAxis {
        if self.crop_height == self.source_height {
            CropAxis::FullHeight
        } else {
            CropAxis::FullWidth
        }
    }

    /// crop width / source width
    pub fn width_ratio(&self) -> f32 {
        self.crop_width as f32 / self.source_width as f32
    }

    /// crop height / source height
    pub fn height_ratio(&self) -> f32 {
        self.crop_height as f32 / self.source_height as f32
    }

    /// Byte offset into each source row where the crop window starts
    pub fn source_column_offset(&self, bytes_per_pixel: usize) -> usize {
        let offset = (self.source_stride - self.crop_stride) / 2;
        offset - offset % bytes_per_pixel.max(1)
    }

    /// First source row copied into the crop
    pub fn source_row_offset(&self) -> usize {
        ((self.source_height - self.crop_height) / 2) as usize
    }

    /// Column where inference-width rows start inside an output row
    pub fn output_column_offset(&self) -> usize {
        (self.output_stride - self.inference_width as usize) / 2
    }

    /// Row where inference-height rows start inside the output
    pub fn output_row_offset(&self) -> usize {
        (self.output_height - self.inference_height as usize) / 2
    }

    pub fn crop_len(&self) -> usize {
        self.crop_stride * self.crop_height as usize
    }

    pub fn output_len(&self) -> usize {
        self.output_stride * self.output_height
    }

    fn same_layout(&self, other: &FrameGeometry) -> bool {
        self.crop_width == other.crop_width
            && self.crop_height == other.crop_height
            && self.crop_stride == other.crop_stride
            && self.output_stride == other.output_stride
            && self.output_height == other.output_height
    }
}

/// Compute the 4:3 crop of a source frame.
///
/// `source_stride` is the byte length of one source row and `inference`
/// the fixed (width, height) of the model input the crop is scaled to.
pub fn plan(
    source_width: u32,
    source_height: u32,
    source_stride: usize,
    inference: (u32, u32),
) -> Result<FrameGeometry> {
    if source_width == 0 || source_height == 0 {
        return Err(FilterError::InvalidFrame {
            width: source_width,
            height: source_height,
        });
    }
    let (aspect_w, aspect_h) = (TARGET_ASPECT.0 as f64, TARGET_ASPECT.1 as f64);
    let (inference_width, inference_height) = inference;
    let source_ratio = source_width as f64 / source_height as f64;

    let (crop_width, crop_height, crop_stride, output_stride, output_height);
    if source_ratio <= aspect_w / aspect_h {
        crop_width = source_width;
        crop_height = even_floor(source_width as f64 * aspect_h / aspect_w);
        crop_stride = source_stride;
        output_stride = inference_width as usize;
        output_height = if crop_height == 0 {
            0
        } else {
            inference_height as usize * source_height as usize / crop_height as usize
        };
    } else {
        crop_height = source_height;
        crop_width = even_floor(source_height as f64 * aspect_w / aspect_h);
        crop_stride = source_stride * crop_width as usize / source_width as usize;
        output_stride = if crop_width == 0 {
            0
        } else {
            inference_width as usize * source_width as usize / crop_width as usize
        };
        output_height = inference_height as usize;
    }

    if crop_stride == 0 || output_stride == 0 || output_height == 0 {
        return Err(FilterError::ZeroStride {
            width: source_width,
            height: source_height,
        });
    }

    Ok(FrameGeometry {
        source_width,
        source_height,
        source_stride,
        crop_width,
        crop_height,
        crop_stride,
        output_stride: (output_stride + 1) / 2 * 2,
        output_height,
        inference_width,
        inference_height,
    })
}

fn even_floor(value: f64) -> u32 {
    (value.floor() as u32) / 2 * 2
}

/// Caches the plan of the last source size seen by a filter instance
#[derive(Debug, Clone)]
pub struct GeometryPlanner {
    inference: (u32, u32),
    cached: Option<FrameGeometry>,
}

impl GeometryPlanner {
    pub fn new(inference_width: u32, inference_height: u32) -> Self {
        Self {
            inference: (inference_width, inference_height),
            cached: None,
        }
    }

    pub fn current(&self) -> Option<&FrameGeometry> {
        self.cached.as_ref()
    }

    /// Plan for the given source size.
    ///
    /// Returns the geometry and whether its buffer layout differs from the
    /// previously cached one. On error the cache is left untouched.
    pub fn update(
        &mut self,
        source_width: u32,
        source_height: u32,
        source_stride: usize,
    ) -> Result<(FrameGeometry, bool)> {
        if let Some(cached) = &self.cached {
            if cached.source_width == source_width
                && cached.source_height == source_height
                && cached.source_stride == source_stride
            {
                return Ok((*cached, false));
            }
        }

        let geometry = plan(source_width, source_height, source_stride, self.inference)?;
        let changed = self
            .cached
            .map_or(true, |cached| !cached.same_layout(&geometry));
        if changed {
            tracing::info!(
                "Source {}x{} cropped to {}x{} (output {}x{})",
                source_width,
                source_height,
                geometry.crop_width,
                geometry.crop_height,
                geometry.output_stride,
                geometry.output_height
            );
        }
        self.cached = Some(geometry);
        Ok((geometry, changed))
    }

    pub fn reset(&mut self) {
        self.cached = None;
    }
}
