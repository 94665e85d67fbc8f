mod crop;
mod plan;

pub use crop::{crop_frame, CropBuffer};
pub use plan::{plan, CropAxis, FrameGeometry, GeometryPlanner, TARGET_ASPECT};
