use glam::{vec4, UVec2, Vec4};

use crate::TexRgba32;

/// Noisy ambient-occlusion estimate produced by the AO source for a single
/// pixel.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct RawSample {
    /// AO coefficient in `<0.0, 1.0>`; negative when there's no sample (e.g.
    /// the pixel doesn't cover any geometry)
    pub ao: f32,

    /// Distance to the closest occluder; negative when undefined
    pub hit_distance: f32,
}

impl RawSample {
    pub const NONE: f32 = -1.0;

    pub fn new(ao: f32, hit_distance: f32) -> Self {
        Self { ao, hit_distance }
    }

    /// Creates a sample whose rays haven't hit anything.
    pub fn without_hit(ao: f32) -> Self {
        Self::new(ao, Self::NONE)
    }

    pub fn invalid() -> Self {
        Self::new(Self::NONE, Self::NONE)
    }

    pub fn is_valid(&self) -> bool {
        self.ao >= 0.0
    }

    pub fn has_hit_distance(&self) -> bool {
        self.hit_distance >= 0.0
    }

    pub fn serialize(&self) -> Vec4 {
        vec4(self.ao, self.hit_distance, 0.0, 0.0)
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self {
            ao: d0.x,
            hit_distance: d0.y,
        }
    }
}

#[derive(Clone, Copy)]
pub struct RawSampleMap<'a> {
    tex: TexRgba32<'a>,
}

impl<'a> RawSampleMap<'a> {
    pub fn new(tex: TexRgba32<'a>) -> Self {
        Self { tex }
    }

    pub fn get(&self, screen_pos: UVec2) -> RawSample {
        RawSample::deserialize(self.tex.read(screen_pos))
    }
}
