use super::FrameScaler;
use crate::frame::PixelFormat;
use crate::geometry::CropBuffer;
use anyhow::{ensure, Result};
use image::{imageops, Rgb, RgbImage};

/// Everything a scaler is specialised for; a change means a new scaler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalerKey {
    pub format: PixelFormat,
    pub src_width: u32,
    pub src_height: u32,
    pub dst_width: u32,
    pub dst_height: u32,
}

/// CPU scaler built on `image::imageops`
pub struct ImageScaler {
    key: ScalerKey,
    staging: RgbImage,
}

impl ImageScaler {
    pub fn new(key: ScalerKey) -> Result<Self> {
        ensure!(
            key.format.is_packed(),
            "scaler cannot read {:?} frames",
            key.format
        );
        ensure!(
            key.src_width > 0 && key.src_height > 0 && key.dst_width > 0 && key.dst_height > 0,
            "scaler needs non-empty source and destination, got {:?}",
            key
        );
        tracing::debug!(
            "Creating {:?} scaler {}x{} -> {}x{}",
            key.format,
            key.src_width,
            key.src_height,
            key.dst_width,
            key.dst_height
        );
        Ok(Self {
            key,
            staging: RgbImage::new(key.src_width, key.src_height),
        })
    }

    fn fill_staging(&mut self, crop: &CropBuffer) {
        let format = self.key.format;
        let bytes_per_pixel = format.bytes_per_pixel().unwrap_or(1);
        let width = self.key.src_width as usize;
        for (y, row) in crop.rows().enumerate().take(self.key.src_height as usize) {
            for (x, px) in row
                .chunks_exact(bytes_per_pixel)
                .take(width)
                .enumerate()
            {
                self.staging
                    .put_pixel(x as u32, y as u32, Rgb(format.to_rgb(px)));
            }
        }
    }
}

impl FrameScaler for ImageScaler {
    fn scale(&mut self, crop: &CropBuffer, dst: &mut [u8]) -> Result<()> {
        let _span = tracing::debug_span!("scale").entered();
        let key = self.key;
        ensure!(
            crop.format() == key.format && crop.width() == key.src_width && crop.height() == key.src_height,
            "crop {:?} {}x{} does not match scaler {:?}",
            crop.format(),
            crop.width(),
            crop.height(),
            key
        );
        let needed = key.dst_width as usize * key.dst_height as usize * 3;
        ensure!(
            dst.len() >= needed,
            "destination holds {} bytes, needs {}",
            dst.len(),
            needed
        );

        self.fill_staging(crop);

        let resized;
        let scaled = if (key.src_width, key.src_height) == (key.dst_width, key.dst_height) {
            &self.staging
        } else {
            resized = imageops::resize(
                &self.staging,
                key.dst_width,
                key.dst_height,
                imageops::FilterType::Triangle,
            );
            &resized
        };

        for (px, out) in scaled.pixels().zip(dst.chunks_exact_mut(3)) {
            out[0] = px[2];
            out[1] = px[1];
            out[2] = px[0];
        }
        Ok(())
    }

    fn key(&self) -> ScalerKey {
        self.key
    }
}
