use bytemuck::{Pod, Zeroable};
use glam::{uvec2, IVec2, UVec2};

/// Denoiser's configuration, as seen by the shaders.
///
/// Built from the host-side config, which is responsible for validating it;
/// the kernels here assume all values are finite and within their ranges.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct DenoiserParams {
    pub screen_width: u32,
    pub screen_height: u32,
    pub max_tspp: u32,
    pub min_smoothing_factor: f32,

    /// Whether cached values should be clamped toward raw samples (bool)
    pub clamp_cached_values: u32,
    pub std_dev_tolerance: f32,
    pub min_std_dev: f32,
    pub min_tspp_to_trust_variance: u32,

    /// Relative depth tolerance used by reprojection
    pub depth_threshold: f32,

    /// Cosine of the maximum angle between reprojected normals
    pub normal_threshold: f32,

    pub local_window_radius: u32,
    pub blur_strength_max_tspp: u32,

    pub hit_distance_to_kernel_width_scale: f32,
    pub hit_distance_to_kernel_size_scale_exponent: f32,

    /// Minimum kernel radius, in pixels
    pub min_kernel_width: f32,

    /// Maximum kernel radius, in pixels
    pub max_kernel_width: f32,

    pub filter_depth_sigma: f32,
    pub filter_normal_sigma: f32,
    pub filter_value_sigma: f32,
    pub blur_decay_strength: f32,

    pub blur_depth_sigma: f32,
    pub blur_surface_hint_sigma: f32,
    pub _padding: [u32; 2],
}

impl DenoiserParams {
    pub fn screen_size(&self) -> UVec2 {
        uvec2(self.screen_width, self.screen_height)
    }

    /// Returns whether given point lays inside the screen.
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.x < self.screen_width as i32
            && pos.y < self.screen_height as i32
    }

    pub fn clamps_cached_values(&self) -> bool {
        self.clamp_cached_values != 0
    }
}

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct SpatialFilterPassParams {
    /// Multiplier applied to the hit-distance-derived kernel radius before it
    /// gets clamped into `<min_kernel_width, max_kernel_width>`
    pub radius_scale: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct DisocclusionBlurPassParams {
    /// Distance between taps, in pixels
    pub stride: u32,
}

impl DisocclusionBlurPassParams {
    /// Returns params for the `nth` blur pass, which samples with stride `2^n`.
    pub fn nth(n: u32) -> Self {
        Self { stride: 1 << n }
    }
}
