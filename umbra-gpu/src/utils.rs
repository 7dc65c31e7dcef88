mod bilinear_filter;
mod f32_ext;

use core::ops;

use spirv_std::Image;

pub use self::bilinear_filter::*;
pub use self::f32_ext::*;

pub type TexRgba32<'a> = &'a Image!(2D, format = rgba32f, sampled = false);

/// Linear interpolation that returns exactly `a` for `t <= 0.0` and exactly
/// `b` for `t >= 1.0`.
pub fn lerp<T>(a: T, b: T, t: f32) -> T
where
    T: ops::Add<Output = T>,
    T: ops::Mul<f32, Output = T>,
    T: Copy,
{
    let t = t.clamp(0.0, 1.0);

    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_are_exact() {
        let a = 0.1f32;
        let b = 0.7f32;

        assert_eq!(a, lerp(a, b, 0.0));
        assert_eq!(b, lerp(a, b, 1.0));
        assert_eq!(b, lerp(a, b, 3.0));
        assert_eq!(a, lerp(a, b, -1.0));
    }
}
