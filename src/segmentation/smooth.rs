/// Edge-aware blur parameters handed to the mask shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothParams {
    pub texel_size: (f32, f32),
    pub step: f32,
    pub radius: f32,
    pub offset: f32,
    pub sigma_texel: f32,
    pub sigma_color: f32,
}

const SPARSITY_FACTOR: f32 = 0.66;
const SIGMA_COLOR: f32 = 0.1;

impl SmoothParams {
    /// Derive the blur from how much the mask texture is upscaled
    pub fn compute(frame_width: f32, frame_height: f32, texture_width: f32, texture_height: f32) -> Self {
        let sigma_space = (frame_width / texture_width).max(frame_height / texture_height);
        let step = (sigma_space.sqrt() * SPARSITY_FACTOR).max(1.0);
        let texel_size = (1.0 / frame_width, 1.0 / frame_height);

        Self {
            texel_size,
            step,
            radius: sigma_space,
            offset: if step > 1.0 { step * 0.5 } else { 0.0 },
            sigma_texel: texel_size.0.max(texel_size.1) * sigma_space,
            sigma_color: SIGMA_COLOR,
        }
    }
}
