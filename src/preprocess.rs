use crate::error::{try_zeroed, FilterError, Result};
use ndarray::Array4;

/// Preprocessor for converting BGR bytes to model input tensors
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    width: u32,
    height: u32,
    mirror: bool,
}

impl Preprocessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mirror: false,
        }
    }

    /// Flip every row horizontally while converting
    pub fn mirrored(mut self) -> Self {
        self.mirror = true;
        self
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirror
    }

    /// Zeroed NHWC tensor with shape [1, height, width, 3]
    pub fn allocate(&self) -> Result<Array4<f32>> {
        let shape = (1, self.height as usize, self.width as usize, 3);
        let data = try_zeroed::<f32>(shape.1 * shape.2 * 3)?;
        Array4::from_shape_vec(shape, data).map_err(|_| FilterError::Allocation {
            bytes: shape.1 * shape.2 * 3 * std::mem::size_of::<f32>(),
        })
    }

    /// Normalize a packed BGR buffer into `tensor`.
    ///
    /// Samples are scaled to [0, 1] and reordered to RGB. When mirrored,
    /// tensor column `x` takes source column `width - 1 - x`.
    pub fn preprocess(&self, bgr: &[u8], tensor: &mut Array4<f32>) {
        let _span = tracing::debug_span!("tensor").entered();

        let width = self.width as usize;
        debug_assert_eq!(tensor.shape(), &[1, self.height as usize, width, 3]);

        for (y, row) in bgr.chunks_exact(width * 3).take(self.height as usize).enumerate() {
            for (x, px) in row.chunks_exact(3).enumerate() {
                let col = if self.mirror { width - 1 - x } else { x };
                tensor[[0, y, col, 0]] = px[2] as f32 / 255.0;
                tensor[[0, y, col, 1]] = px[1] as f32 / 255.0;
                tensor[[0, y, col, 2]] = px[0] as f32 / 255.0;
            }
        }
    }
}
