#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

pub trait F32Ext
where
    Self: Sized,
{
    fn sqr(self) -> Self;
    fn saturate(self) -> Self;
    fn safe_sqrt(self) -> Self;
}

impl F32Ext for f32 {
    fn sqr(self) -> Self {
        self * self
    }

    fn saturate(self) -> Self {
        self.clamp(0.0, 1.0)
    }

    /// Square root that treats negative inputs (e.g. variances that went
    /// slightly below zero due to rounding) as zero.
    fn safe_sqrt(self) -> Self {
        self.max(0.0).sqrt()
    }
}
