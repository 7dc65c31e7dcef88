use glam::{ivec2, vec4, IVec2, Vec2, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

/// 2x2 footprint of texels surrounding a sub-pixel position.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct BilinearFilter {
    /// Texel at `f(x=0, y=0)`
    pub origin: IVec2,

    /// Position within the footprint, `<0.0, 1.0)` on each axis
    pub uv: Vec2,
}

impl BilinearFilter {
    /// Creates a filter for given position, expressed in pixels (i.e. with
    /// texel centers located at `n + 0.5`).
    pub fn new(pos: Vec2) -> Self {
        let pos = pos - 0.5;
        let origin = pos.floor();

        Self {
            origin: origin.as_ivec2(),
            uv: pos - origin,
        }
    }

    /// Returns coordinates of given texel of the footprint:
    ///
    /// - `0` is `f(x=0, y=0)`,
    /// - `1` is `f(x=1, y=0)`,
    /// - `2` is `f(x=0, y=1)`,
    /// - `3` is `f(x=1, y=1)`.
    pub fn tap(&self, idx: u32) -> IVec2 {
        self.origin + ivec2((idx & 1) as i32, (idx >> 1) as i32)
    }

    pub fn weights(&self) -> Vec4 {
        let uv = self.uv;

        vec4(
            (1.0 - uv.x) * (1.0 - uv.y),
            uv.x * (1.0 - uv.y),
            (1.0 - uv.x) * uv.y,
            uv.x * uv.y,
        )
    }

    /// Returns [`Self::weights()`] with texels not present in `validity`
    /// (a bitmask indexed the same way as [`Self::tap()`]) zeroed out.
    pub fn masked_weights(&self, validity: u32) -> Vec4 {
        let mask = vec4(
            (validity & 0b0001) as f32,
            ((validity >> 1) & 1) as f32,
            ((validity >> 2) & 1) as f32,
            ((validity >> 3) & 1) as f32,
        );

        self.weights() * mask
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec2;

    use super::*;

    #[test]
    fn texel_center() {
        let target = BilinearFilter::new(vec2(3.5, 7.5));

        assert_eq!(ivec2(3, 7), target.origin);
        assert_eq!(vec4(1.0, 0.0, 0.0, 0.0), target.weights());
    }

    #[test]
    fn between_texels() {
        let target = BilinearFilter::new(vec2(4.0, 7.75));

        assert_eq!(ivec2(3, 7), target.origin);
        assert_eq!(ivec2(4, 8), target.tap(3));

        let weights = target.weights();

        assert_relative_eq!(weights.x, 0.375);
        assert_relative_eq!(weights.y, 0.375);
        assert_relative_eq!(weights.z, 0.125);
        assert_relative_eq!(weights.w, 0.125);
        assert_relative_eq!(weights.dot(Vec4::ONE), 1.0);
    }

    #[test]
    fn masked_weights() {
        let target = BilinearFilter::new(vec2(4.0, 8.0));
        let weights = target.masked_weights(0b1001);

        assert_relative_eq!(weights.x, 0.25);
        assert_relative_eq!(weights.y, 0.0);
        assert_relative_eq!(weights.z, 0.0);
        assert_relative_eq!(weights.w, 0.25);
    }
}
