/// Cell center a detector record is expressed relative to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

/// One feature-map level of the anchor grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorLevel {
    /// Cell size in input pixels
    pub stride: u32,
    /// Anchors emitted per cell
    pub per_cell: usize,
}

/// Levels of the short-range face detector: 896 anchors at 128x128
pub const FACE_ANCHOR_LEVELS: [AnchorLevel; 2] = [
    AnchorLevel {
        stride: 8,
        per_cell: 2,
    },
    AnchorLevel {
        stride: 16,
        per_cell: 6,
    },
];

fn grid(width: u32, height: u32, stride: u32) -> (u32, u32) {
    (height.div_ceil(stride), width.div_ceil(stride))
}

pub fn anchor_count(width: u32, height: u32, levels: &[AnchorLevel]) -> usize {
    levels
        .iter()
        .map(|level| {
            let (rows, cols) = grid(width, height, level.stride);
            rows as usize * cols as usize * level.per_cell
        })
        .sum()
}

/// Anchor list for a `width` x `height` input, level by level in row-major
/// cell order, each cell repeated `per_cell` times.
pub fn generate_anchors(width: u32, height: u32, levels: &[AnchorLevel]) -> Vec<Anchor> {
    let mut anchors = Vec::with_capacity(anchor_count(width, height, levels));
    for level in levels {
        let stride = level.stride as f32;
        let (rows, cols) = grid(width, height, level.stride);
        for row in 0..rows {
            let y = stride * (row as f32 + 0.5);
            for col in 0..cols {
                let x = stride * (col as f32 + 0.5);
                anchors.extend(std::iter::repeat(Anchor { x, y }).take(level.per_cell));
            }
        }
    }
    anchors
}
