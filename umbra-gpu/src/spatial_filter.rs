use glam::{ivec2, UVec2, Vec2};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    DenoiserParams, F32Ext, SpatialFilterPassParams, Surface, UMBRA_EPSILON,
};

/// 1D B3-spline coefficients; the 2D kernel is their outer product.
const KERNEL: [f32; 5] = [1.0 / 16.0, 1.0 / 4.0, 3.0 / 8.0, 1.0 / 4.0, 1.0 / 16.0];

/// Returns the filter radius (in pixels) for a pixel whose occluders are
/// `hit_distance` away: the further the occluders, the smoother the AO and
/// the wider we can blur.
pub fn kernel_radius(
    params: &DenoiserParams,
    pass: &SpatialFilterPassParams,
    hit_distance: f32,
) -> f32 {
    let radius = params.hit_distance_to_kernel_width_scale
        * hit_distance
            .max(0.0)
            .powf(params.hit_distance_to_kernel_size_scale_exponent)
        * pass.radius_scale;

    radius.clamp(params.min_kernel_width, params.max_kernel_width)
}

/// Edge-stopping 5x5 à-trous filter whose tap spacing follows
/// [`kernel_radius()`].
///
/// Each tap is weighted by the kernel and by how similar it is to the center
/// pixel: normals must point the same way, depths must agree with the plane
/// spanned by `depth_gradient` and values must agree within a few standard
/// deviations (so noisy pixels accept more).
///
/// `sample` returns the value and surface of given pixel. Pixels without
/// geometry pass through.
pub fn spatial_filter(
    params: &DenoiserParams,
    pass: &SpatialFilterPassParams,
    screen_pos: UVec2,
    center: Surface,
    depth_gradient: Vec2,
    value: f32,
    hit_distance: f32,
    variance: f32,
    sample: impl Fn(UVec2) -> (f32, Surface),
) -> f32 {
    if center.is_sky() {
        return value;
    }

    let radius = kernel_radius(params, pass, hit_distance);
    let step = ((radius * 0.5).round() as i32).max(1);

    let value_leeway =
        params.filter_value_sigma * variance.safe_sqrt() + UMBRA_EPSILON;

    let center_pos = screen_pos.as_ivec2();
    let mut w_sum = 0.0;
    let mut v_sum = 0.0;
    let mut offset = ivec2(-2, -2);

    loop {
        let pos = center_pos + offset * step;

        if params.contains(pos) {
            let (tap_value, tap_surface) = sample(pos.as_uvec2());

            if !tap_surface.is_sky() {
                let offset_px = (offset * step).as_vec2();

                let kernel_weight = KERNEL[(offset.x + 2) as usize]
                    * KERNEL[(offset.y + 2) as usize];

                let normal_weight = center
                    .normal
                    .dot(tap_surface.normal)
                    .max(0.0)
                    .powf(params.filter_normal_sigma);

                let expected_depth =
                    center.depth + depth_gradient.dot(offset_px);

                let depth_leeway = params.filter_depth_sigma
                    * (depth_gradient.abs().dot(offset_px.abs())
                        + 0.01 * center.depth)
                    + UMBRA_EPSILON;

                let depth_weight = (-(tap_surface.depth - expected_depth).abs()
                    / depth_leeway)
                    .exp();

                let value_weight =
                    (-(tap_value - value).abs() / value_leeway).exp();

                let weight =
                    kernel_weight * normal_weight * depth_weight * value_weight;

                w_sum += weight;
                v_sum += weight * tap_value;
            }
        }

        offset.x += 1;

        if offset.x > 2 {
            offset.x = -2;
            offset.y += 1;

            if offset.y > 2 {
                break;
            }
        }
    }

    if w_sum <= UMBRA_EPSILON {
        value
    } else {
        v_sum / w_sum
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec2, vec3, Vec3};

    use super::*;

    fn params() -> DenoiserParams {
        DenoiserParams {
            screen_width: 32,
            screen_height: 32,
            hit_distance_to_kernel_width_scale: 4.0,
            hit_distance_to_kernel_size_scale_exponent: 1.0,
            min_kernel_width: 2.0,
            max_kernel_width: 8.0,
            filter_depth_sigma: 1.0,
            filter_normal_sigma: 64.0,
            filter_value_sigma: 2.0,
            ..Default::default()
        }
    }

    fn pass() -> SpatialFilterPassParams {
        SpatialFilterPassParams { radius_scale: 1.0 }
    }

    fn wall() -> Surface {
        Surface::new(Vec3::Z, 10.0, 0.5)
    }

    #[test]
    fn radius() {
        assert_eq!(2.0, kernel_radius(&params(), &pass(), 0.0));
        assert_eq!(6.0, kernel_radius(&params(), &pass(), 1.5));
        assert_eq!(8.0, kernel_radius(&params(), &pass(), 100.0));

        let half = SpatialFilterPassParams { radius_scale: 0.5 };

        assert_eq!(3.0, kernel_radius(&params(), &half, 1.5));
    }

    #[test]
    fn radius_grows_with_hit_distance() {
        let mut prev = 0.0;

        for hit_distance in [0.0, 0.25, 0.5, 1.0, 1.5, 2.0, 4.0] {
            let curr = kernel_radius(&params(), &pass(), hit_distance);

            assert!(curr >= prev);
            prev = curr;
        }
    }

    #[test]
    fn uniform_input_is_preserved() {
        for hit_distance in [0.0, 1.0, 10.0] {
            for pos in [uvec2(0, 0), uvec2(16, 16), uvec2(31, 3)] {
                let actual = spatial_filter(
                    &params(),
                    &pass(),
                    pos,
                    wall(),
                    Vec2::ZERO,
                    0.4,
                    hit_distance,
                    0.01,
                    |_| (0.4, wall()),
                );

                assert_relative_eq!(actual, 0.4, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn uniform_slope_is_preserved() {
        let floor = |pos: UVec2| {
            Surface::new(vec3(0.0, 0.8, 0.6), 10.0 + 0.5 * pos.y as f32, 0.5)
        };

        let actual = spatial_filter(
            &params(),
            &pass(),
            uvec2(16, 16),
            floor(uvec2(16, 16)),
            vec2(0.0, 0.5),
            0.7,
            1.0,
            0.0,
            |pos| (0.7, floor(pos)),
        );

        assert_relative_eq!(actual, 0.7, epsilon = 1e-6);
    }

    #[test]
    fn noise_gets_smoothed() {
        let value = |pos: UVec2| ((pos.x + pos.y) % 2) as f32;

        let actual = spatial_filter(
            &params(),
            &pass(),
            uvec2(16, 16),
            wall(),
            Vec2::ZERO,
            value(uvec2(16, 16)),
            0.0,
            0.25,
            |pos| (value(pos), wall()),
        );

        assert!(actual < 0.9);
        assert!(actual > 0.1);
    }

    #[test]
    fn edges_are_preserved() {
        // Right half of the screen is a different, closer object
        let surface = |pos: UVec2| {
            if pos.x >= 16 {
                Surface::new(Vec3::Z, 2.0, 0.5)
            } else {
                wall()
            }
        };

        let value = |pos: UVec2| if pos.x >= 16 { 1.0 } else { 0.2 };

        let actual = spatial_filter(
            &params(),
            &pass(),
            uvec2(15, 16),
            surface(uvec2(15, 16)),
            Vec2::ZERO,
            0.2,
            1.0,
            1.0,
            |pos| (value(pos), surface(pos)),
        );

        assert_relative_eq!(actual, 0.2, epsilon = 1e-4);
    }

    #[test]
    fn isolated_pixel_falls_back_to_itself() {
        // Every neighbour faces another way
        let actual = spatial_filter(
            &params(),
            &pass(),
            uvec2(16, 16),
            wall(),
            Vec2::ZERO,
            0.3,
            1.0,
            0.0,
            |pos| {
                if pos == uvec2(16, 16) {
                    (0.3, wall())
                } else {
                    (0.9, Surface::new(-Vec3::Z, 10.0, 0.5))
                }
            },
        );

        assert_relative_eq!(actual, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn sky_passes_through() {
        let actual = spatial_filter(
            &params(),
            &pass(),
            uvec2(16, 16),
            Surface::sky(),
            Vec2::ZERO,
            1.0,
            1.0,
            0.0,
            |_| (0.0, wall()),
        );

        assert_eq!(1.0, actual);
    }
}
