use glam::{ivec2, vec2, vec4, IVec2, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::{DenoiserParams, Normal, TexRgba32};

/// Geometry visible through a single pixel.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct Surface {
    pub normal: Vec3,

    /// Linear (view-space) depth; zero (or less) for pixels that don't cover
    /// any geometry.
    pub depth: f32,

    /// Roughness-style material hint in `<0.0, 1.0>`, used to avoid blurring
    /// across sharply different materials.
    pub hint: f32,
}

impl Surface {
    pub fn new(normal: Vec3, depth: f32, hint: f32) -> Self {
        Self {
            normal,
            depth,
            hint,
        }
    }

    pub fn sky() -> Self {
        Self::default()
    }

    pub fn is_sky(&self) -> bool {
        self.depth <= 0.0
    }

    pub fn serialize(&self) -> Vec4 {
        let normal = Normal::encode(self.normal);

        vec4(normal.x, normal.y, self.depth, self.hint)
    }

    pub fn deserialize(d0: Vec4) -> Self {
        let depth = d0.z;

        // Zeroed texels (e.g. freshly allocated ones) don't decode into a unit
        // vector, so let's not try
        let normal = if depth > 0.0 {
            Normal::decode(d0.xy())
        } else {
            Vec3::ZERO
        };

        Self {
            normal,
            depth,
            hint: d0.w,
        }
    }
}

#[derive(Clone, Copy)]
pub struct SurfaceMap<'a> {
    tex: TexRgba32<'a>,
}

impl<'a> SurfaceMap<'a> {
    pub fn new(tex: TexRgba32<'a>) -> Self {
        Self { tex }
    }

    pub fn get(&self, screen_pos: UVec2) -> Surface {
        Surface::deserialize(self.tex.read(screen_pos))
    }

    pub fn set(&self, screen_pos: UVec2, surface: &Surface) {
        unsafe {
            self.tex.write(screen_pos, surface.serialize());
        }
    }
}

/// Estimates screen-space partial derivatives of linear depth at given pixel,
/// i.e. `(∂z/∂x, ∂z/∂y)` in depth-units per pixel.
///
/// Each axis picks the smaller (in magnitude) of the forward and backward
/// differences, so that derivatives don't get polluted by the neighbouring
/// object at silhouettes; neighbours outside of the screen or without any
/// geometry are skipped.
pub fn depth_gradient(
    params: &DenoiserParams,
    screen_pos: UVec2,
    depth: impl Fn(UVec2) -> f32,
) -> Vec2 {
    let center = depth(screen_pos);

    if center <= 0.0 {
        return Vec2::ZERO;
    }

    let screen_pos = screen_pos.as_ivec2();

    vec2(
        depth_difference(params, screen_pos, ivec2(1, 0), center, &depth),
        depth_difference(params, screen_pos, ivec2(0, 1), center, &depth),
    )
}

fn depth_difference(
    params: &DenoiserParams,
    screen_pos: IVec2,
    axis: IVec2,
    center: f32,
    depth: &impl Fn(UVec2) -> f32,
) -> f32 {
    let mut forward = f32::MAX;
    let mut backward = f32::MAX;

    if params.contains(screen_pos + axis) {
        let neighbour = depth((screen_pos + axis).as_uvec2());

        if neighbour > 0.0 {
            forward = neighbour - center;
        }
    }

    if params.contains(screen_pos - axis) {
        let neighbour = depth((screen_pos - axis).as_uvec2());

        if neighbour > 0.0 {
            backward = center - neighbour;
        }
    }

    let diff = if forward.abs() < backward.abs() {
        forward
    } else {
        backward
    };

    if diff == f32::MAX {
        0.0
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;

    fn params() -> DenoiserParams {
        DenoiserParams {
            screen_width: 8,
            screen_height: 8,
            ..Default::default()
        }
    }

    #[test]
    fn serialization() {
        let target = Surface::new(vec3(0.0, 0.6, 0.8), 12.5, 0.25);
        let actual = Surface::deserialize(target.serialize());

        assert_relative_eq!(actual.normal.y, 0.6, epsilon = 0.001);
        assert_relative_eq!(actual.normal.z, 0.8, epsilon = 0.001);
        assert_eq!(12.5, actual.depth);
        assert_eq!(0.25, actual.hint);
    }

    #[test]
    fn sky() {
        let target = Surface::deserialize(Vec4::ZERO);

        assert!(target.is_sky());
        assert_eq!(Vec3::ZERO, target.normal);
    }

    #[test]
    fn gradient_of_a_slope() {
        let actual =
            depth_gradient(&params(), uvec2(3, 3), |pos| 10.0 + pos.x as f32);

        assert_eq!(vec2(1.0, 0.0), actual);
    }

    #[test]
    fn gradient_at_screen_edge() {
        let actual = depth_gradient(&params(), uvec2(0, 7), |pos| {
            10.0 + 0.5 * pos.x as f32 - 0.25 * pos.y as f32
        });

        assert_eq!(vec2(0.5, -0.25), actual);
    }

    #[test]
    fn gradient_ignores_silhouettes() {
        // Pixels to the right of x=4 belong to a distant object
        let actual = depth_gradient(&params(), uvec2(4, 4), |pos| {
            if pos.x > 4 {
                100.0
            } else {
                10.0 + 0.5 * pos.x as f32
            }
        });

        assert_eq!(vec2(0.5, 0.0), actual);
    }

    #[test]
    fn gradient_next_to_sky() {
        let actual = depth_gradient(&params(), uvec2(4, 4), |pos| {
            if pos == uvec2(4, 4) {
                10.0
            } else {
                0.0
            }
        });

        assert_eq!(Vec2::ZERO, actual);
    }
}
