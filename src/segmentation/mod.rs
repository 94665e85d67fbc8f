mod filter;
mod mask;
mod smooth;

pub use filter::{BackgroundMaskFilter, MaskRender, SEGMENTATION_SIZE};
pub use mask::{mask_value, threshold_mask, MaskLayout};
pub use smooth::SmoothParams;
