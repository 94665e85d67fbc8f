mod anchors;
mod decode;
mod filter;
mod focal;
mod smoother;
pub mod types;

pub use anchors::{anchor_count, generate_anchors, Anchor, AnchorLevel, FACE_ANCHOR_LEVELS};
pub use decode::{decode_box, select_best, BoxCorrection, BOX_RECORD_LEN, SCORE_THRESHOLD};
pub use filter::{CircleAvatarFilter, DETECTION_SIZE};
pub use focal::FocalRegion;
pub use smoother::{BoxHistory, DeadZone, TemporalSmoother, HISTORY_LEN};
pub use types::DetectionBox;
