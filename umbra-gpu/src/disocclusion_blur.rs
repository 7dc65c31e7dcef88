use glam::{ivec2, UVec2};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{lerp, DenoiserParams, DisocclusionBlurPassParams, Surface};

const KERNEL: [f32; 3] = [0.25, 0.5, 0.25];

/// Strided 3x3 blur that smooths pixels with short history, i.e. the ones that
/// have just been disoccluded and are still mostly raw noise.
///
/// Taps are weighted by depth and surface-hint similarity; the result is mixed
/// with the input by `blur_strength`, so converged pixels (strength zero) pass
/// through unchanged.
pub fn disocclusion_blur(
    params: &DenoiserParams,
    pass: &DisocclusionBlurPassParams,
    screen_pos: UVec2,
    center: Surface,
    value: f32,
    blur_strength: f32,
    sample: impl Fn(UVec2) -> (f32, Surface),
) -> f32 {
    if blur_strength <= 0.0 || center.is_sky() {
        return value;
    }

    let center_pos = screen_pos.as_ivec2();
    let stride = pass.stride.max(1) as i32;
    let depth_leeway = params.blur_depth_sigma * center.depth;

    let mut w_sum = 0.0;
    let mut v_sum = 0.0;
    let mut offset = ivec2(-1, -1);

    loop {
        let pos = center_pos + offset * stride;

        if params.contains(pos) {
            let (tap_value, tap_surface) = sample(pos.as_uvec2());

            if !tap_surface.is_sky() {
                let kernel_weight = KERNEL[(offset.x + 1) as usize]
                    * KERNEL[(offset.y + 1) as usize];

                let depth_weight = if depth_leeway > 0.0 {
                    (-(tap_surface.depth - center.depth).abs() / depth_leeway)
                        .exp()
                } else {
                    1.0
                };

                let hint_weight = (-(tap_surface.hint - center.hint).abs()
                    * params.blur_surface_hint_sigma)
                    .exp();

                let weight = kernel_weight * depth_weight * hint_weight;

                w_sum += weight;
                v_sum += weight * tap_value;
            }
        }

        offset.x += 1;

        if offset.x > 1 {
            offset.x = -1;
            offset.y += 1;

            if offset.y > 1 {
                break;
            }
        }
    }

    if w_sum <= 0.0 {
        return value;
    }

    lerp(value, v_sum / w_sum, blur_strength)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, Vec3};

    use super::*;

    fn params() -> DenoiserParams {
        DenoiserParams {
            screen_width: 16,
            screen_height: 16,
            blur_depth_sigma: 0.05,
            blur_surface_hint_sigma: 8.0,
            ..Default::default()
        }
    }

    fn wall() -> Surface {
        Surface::new(Vec3::Z, 10.0, 0.5)
    }

    fn noise(pos: UVec2) -> f32 {
        ((pos.x * 7 + pos.y * 13) % 5) as f32 / 4.0
    }

    #[test]
    fn converged_pixels_pass_through() {
        for stride in [0, 1, 2] {
            let actual = disocclusion_blur(
                &params(),
                &DisocclusionBlurPassParams::nth(stride),
                uvec2(8, 8),
                wall(),
                0.3,
                0.0,
                |pos| (noise(pos), wall()),
            );

            assert_eq!(0.3, actual);
        }
    }

    #[test]
    fn uniform_input_is_preserved() {
        for pos in [uvec2(0, 0), uvec2(8, 8), uvec2(15, 15)] {
            let actual = disocclusion_blur(
                &params(),
                &DisocclusionBlurPassParams::nth(1),
                pos,
                wall(),
                0.6,
                1.0,
                |_| (0.6, wall()),
            );

            assert_relative_eq!(actual, 0.6, epsilon = 1e-6);
        }
    }

    #[test]
    fn noise_gets_reduced() {
        let pos = uvec2(8, 8);
        let center = noise(pos);

        let actual = disocclusion_blur(
            &params(),
            &DisocclusionBlurPassParams::nth(0),
            pos,
            wall(),
            center,
            1.0,
            |pos| (noise(pos), wall()),
        );

        let mean = {
            let mut sum = 0.0;

            for y in 7..=9 {
                for x in 7..=9 {
                    sum += noise(uvec2(x, y));
                }
            }

            sum / 9.0
        };

        assert!((actual - mean).abs() < (center - mean).abs());
    }

    #[test]
    fn strength_mixes_linearly() {
        let blur = |strength| {
            disocclusion_blur(
                &params(),
                &DisocclusionBlurPassParams::nth(0),
                uvec2(8, 8),
                wall(),
                0.0,
                strength,
                |pos| {
                    if pos == uvec2(8, 8) {
                        (0.0, wall())
                    } else {
                        (1.0, wall())
                    }
                },
            )
        };

        let full = blur(1.0);

        assert_relative_eq!(full, 0.75, epsilon = 1e-6);
        assert_relative_eq!(blur(0.5), 0.5 * full, epsilon = 1e-6);
    }

    #[test]
    fn other_objects_are_ignored() {
        let actual = disocclusion_blur(
            &params(),
            &DisocclusionBlurPassParams::nth(0),
            uvec2(8, 8),
            wall(),
            0.2,
            1.0,
            |pos| {
                if pos == uvec2(8, 8) {
                    (0.2, wall())
                } else {
                    (1.0, Surface::new(Vec3::Z, 3.0, 0.5))
                }
            },
        );

        assert_relative_eq!(actual, 0.2, epsilon = 1e-4);
    }
}
