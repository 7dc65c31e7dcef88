use glam::{vec4, UVec2, Vec4};

use crate::{F32Ext, TexRgba32};

/// Single pixel of the reprojection cache.
///
/// Invariant: `squared_mean >= value²` (up to rounding errors), and
/// `tspp == 0` means the pixel has no usable history.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct CacheEntry {
    /// Number of temporal samples accumulated for this pixel
    pub tspp: u32,
    pub value: f32,
    pub squared_mean: f32,
    pub hit_distance: f32,
}

impl CacheEntry {
    pub fn is_cold(&self) -> bool {
        self.tspp == 0
    }

    /// Returns the temporal variance, clamped to be non-negative.
    pub fn variance(&self) -> f32 {
        (self.squared_mean - self.value.sqr()).max(0.0)
    }

    pub fn serialize(&self) -> Vec4 {
        vec4(
            self.tspp as f32,
            self.value,
            self.squared_mean,
            self.hit_distance,
        )
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self {
            tspp: d0.x as u32,
            value: d0.y,
            squared_mean: d0.z,
            hit_distance: d0.w,
        }
    }
}

#[derive(Clone, Copy)]
pub struct CacheMap<'a> {
    tex: TexRgba32<'a>,
}

impl<'a> CacheMap<'a> {
    pub fn new(tex: TexRgba32<'a>) -> Self {
        Self { tex }
    }

    pub fn get(&self, screen_pos: UVec2) -> CacheEntry {
        CacheEntry::deserialize(self.tex.read(screen_pos))
    }

    pub fn set(&self, screen_pos: UVec2, entry: &CacheEntry) {
        unsafe {
            self.tex.write(screen_pos, entry.serialize());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization() {
        let target = CacheEntry {
            tspp: 33,
            value: 0.25,
            squared_mean: 0.125,
            hit_distance: 1.5,
        };

        let target = CacheEntry::deserialize(target.serialize());

        assert_eq!(33, target.tspp);
        assert_eq!(0.25, target.value);
        assert_eq!(0.125, target.squared_mean);
        assert_eq!(1.5, target.hit_distance);
    }

    #[test]
    fn zeroed_texel_is_cold() {
        let target = CacheEntry::deserialize(Vec4::ZERO);

        assert!(target.is_cold());
        assert_eq!(0.0, target.variance());
    }

    #[test]
    fn variance() {
        let target = CacheEntry {
            tspp: 4,
            value: 0.5,
            squared_mean: 0.3,
            hit_distance: 0.0,
        };

        assert!((target.variance() - 0.05).abs() < 1e-6);

        let target = CacheEntry {
            squared_mean: 0.2499,
            ..target
        };

        assert_eq!(0.0, target.variance());
    }
}
