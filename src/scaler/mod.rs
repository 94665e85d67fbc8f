mod image_scaler;

pub use image_scaler::{ImageScaler, ScalerKey};

use crate::geometry::CropBuffer;
use anyhow::Result;

/// Converts a crop into a packed BGR buffer at the inference resolution
pub trait FrameScaler {
    /// Scale `crop` into `dst`, 3 bytes per pixel, row-major
    fn scale(&mut self, crop: &CropBuffer, dst: &mut [u8]) -> Result<()>;

    /// Source layout this scaler was built for
    fn key(&self) -> ScalerKey;
}
