use crate::frame::PixelFormat;

pub type Result<T> = std::result::Result<T, FilterError>;

/// Failures of a single filter instance
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("invalid source frame {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },

    #[error("derived stride is zero for {width}x{height} source")]
    ZeroStride { width: u32, height: u32 },

    #[error("plane {plane} holds {actual} bytes, crop needs {needed}")]
    PlaneTooSmall {
        plane: usize,
        needed: usize,
        actual: usize,
    },

    #[error("failed to allocate {bytes} bytes")]
    Allocation { bytes: usize },

    #[error("unsupported pixel format {0:?}")]
    UnsupportedFormat(PixelFormat),

    #[error("engine expects {actual:?} input, filter needs {expected:?}")]
    InputShape {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("output tensor {index} has {actual} values, expected at least {expected}")]
    OutputShape {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("scaler failed: {0:#}")]
    Scaler(#[source] anyhow::Error),

    #[error("inference failed: {0:#}")]
    Inference(#[from] anyhow::Error),
}

/// Allocate a zeroed buffer, reporting exhaustion instead of aborting.
pub(crate) fn try_zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| FilterError::Allocation {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buf.resize(len, T::default());
    Ok(buf)
}
