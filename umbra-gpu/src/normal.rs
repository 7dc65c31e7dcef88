use glam::{vec3, Vec2, Vec3, Vec3Swizzles};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

/// Octahedral normal packing, so that a surface (normal + depth + hint) fits
/// into a single `Rgba32Float` texel.
pub struct Normal;

impl Normal {
    /// Maps a unit vector into `<0.0, 1.0>²`.
    pub fn encode(n: Vec3) -> Vec2 {
        let n = n / (n.x.abs() + n.y.abs() + n.z.abs());

        let n = if n.z >= 0.0 {
            n.xy()
        } else {
            let mut folded = 1.0 - n.yx().abs();

            folded.x = folded.x.copysign(n.x);
            folded.y = folded.y.copysign(n.y);
            folded
        };

        n * 0.5 + 0.5
    }

    /// See: [`Self::encode()`].
    pub fn decode(n: Vec2) -> Vec3 {
        let n = n * 2.0 - 1.0;
        let mut n = vec3(n.x, n.y, 1.0 - n.x.abs() - n.y.abs());
        let fold = (-n.z).max(0.0);

        n.x -= fold.copysign(n.x);
        n.y -= fold.copysign(n.y);
        n.normalize()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn hemispheres() {
        for n in [
            vec3(0.0, 0.0, 1.0),
            vec3(0.0, 1.0, 0.0),
            vec3(0.48, -0.6, 0.64),
            vec3(-0.36, 0.48, -0.8),
        ] {
            let actual = Normal::decode(Normal::encode(n));

            assert_abs_diff_eq!(n.x, actual.x, epsilon = 0.001);
            assert_abs_diff_eq!(n.y, actual.y, epsilon = 0.001);
            assert_abs_diff_eq!(n.z, actual.z, epsilon = 0.001);
        }
    }
}
