use glam::UVec2;

use crate::{gpu, ConfigError};

/// Maximum number of spatial-filter and disocclusion-blur passes.
pub const MAX_PASSES: u32 = 8;

/// Maximum radius of the local-statistics window, in pixels.
pub const MAX_LOCAL_WINDOW_RADIUS: u32 = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct DenoiserConfig {
    /// Maximum number of temporal samples accumulated per pixel; caps how long
    /// the history gets and so how slowly the denoiser reacts to changes.
    pub max_tspp: u32,

    /// Minimum weight of the fresh sample, applied once `1 / tspp` falls
    /// below it.
    pub min_smoothing_factor: f32,

    /// Whether young history should be clamped toward the raw sample before
    /// it's blended, which reduces ghosting.
    pub clamp_cached_values: bool,

    /// How many local standard deviations away from the raw sample the cached
    /// value may be before it's clamped.
    pub std_dev_tolerance: f32,

    /// Lower bound on the standard deviation used for clamping, so that
    /// clamping doesn't collapse history in flat regions.
    pub min_std_dev: f32,

    /// Below this many temporal samples the temporal variance is considered
    /// unreliable: the local one gets used instead and clamping is enabled.
    pub min_tspp_to_trust_variance: u32,

    /// Relative depth difference above which the reprojected history gets
    /// rejected.
    pub depth_threshold: f32,

    /// Angle (in degrees) between normals above which the reprojected history
    /// gets rejected.
    pub normal_threshold: f32,

    /// Radius of the local-statistics window; `4` means a 9x9 window.
    pub local_window_radius: u32,

    pub hit_distance_to_kernel_width_scale: f32,
    pub hit_distance_to_kernel_size_scale_exponent: f32,

    /// Minimum radius of the spatial filter, in pixels.
    pub min_kernel_width: f32,

    /// Maximum radius of the spatial filter, as a percentage of the frame
    /// width; never smaller than `min_kernel_width`.
    pub max_kernel_width_percentage: f32,

    pub spatial_filter_passes: u32,
    pub filter_depth_sigma: f32,
    pub filter_normal_sigma: f32,
    pub filter_value_sigma: f32,

    /// Number of temporal samples at which pixels stop being blurred by the
    /// disocclusion blur.
    pub blur_strength_max_tspp: u32,

    /// Exponent of the blur strength's falloff; larger values make the blur
    /// fade out faster as history accumulates.
    pub blur_decay_strength: f32,

    pub disocclusion_blur_passes: u32,
    pub blur_depth_sigma: f32,
    pub blur_surface_hint_sigma: f32,
}

impl DenoiserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tspp == 0 {
            return Err(ConfigError::ZeroMaxTspp);
        }

        range("min_smoothing_factor", self.min_smoothing_factor, 0.0, 1.0)?;
        non_negative("std_dev_tolerance", self.std_dev_tolerance)?;
        non_negative("min_std_dev", self.min_std_dev)?;
        non_negative("depth_threshold", self.depth_threshold)?;
        range("normal_threshold", self.normal_threshold, 0.0, 180.0)?;

        at_most(
            "local_window_radius",
            self.local_window_radius,
            MAX_LOCAL_WINDOW_RADIUS,
        )?;

        non_negative(
            "hit_distance_to_kernel_width_scale",
            self.hit_distance_to_kernel_width_scale,
        )?;

        non_negative(
            "hit_distance_to_kernel_size_scale_exponent",
            self.hit_distance_to_kernel_size_scale_exponent,
        )?;

        positive("min_kernel_width", self.min_kernel_width)?;

        range(
            "max_kernel_width_percentage",
            self.max_kernel_width_percentage,
            0.0,
            100.0,
        )?;

        at_most(
            "spatial_filter_passes",
            self.spatial_filter_passes,
            MAX_PASSES,
        )?;

        non_negative("filter_depth_sigma", self.filter_depth_sigma)?;
        non_negative("filter_normal_sigma", self.filter_normal_sigma)?;
        non_negative("filter_value_sigma", self.filter_value_sigma)?;
        positive("blur_decay_strength", self.blur_decay_strength)?;

        at_most(
            "disocclusion_blur_passes",
            self.disocclusion_blur_passes,
            MAX_PASSES,
        )?;

        non_negative("blur_depth_sigma", self.blur_depth_sigma)?;
        non_negative("blur_surface_hint_sigma", self.blur_surface_hint_sigma)?;

        Ok(())
    }

    /// Validates the config and converts it into the layout expected by the
    /// shaders, for a frame of given size.
    pub fn serialize(
        &self,
        size: UVec2,
    ) -> Result<gpu::DenoiserParams, ConfigError> {
        self.validate()?;

        let max_kernel_width = (self.max_kernel_width_percentage / 100.0
            * size.x as f32)
            .max(self.min_kernel_width);

        Ok(gpu::DenoiserParams {
            screen_width: size.x,
            screen_height: size.y,
            max_tspp: self.max_tspp,
            min_smoothing_factor: self.min_smoothing_factor,
            clamp_cached_values: self.clamp_cached_values as u32,
            std_dev_tolerance: self.std_dev_tolerance,
            min_std_dev: self.min_std_dev,
            min_tspp_to_trust_variance: self.min_tspp_to_trust_variance,
            depth_threshold: self.depth_threshold,
            normal_threshold: self.normal_threshold.to_radians().cos(),
            local_window_radius: self.local_window_radius,
            blur_strength_max_tspp: self.blur_strength_max_tspp,
            hit_distance_to_kernel_width_scale: self
                .hit_distance_to_kernel_width_scale,
            hit_distance_to_kernel_size_scale_exponent: self
                .hit_distance_to_kernel_size_scale_exponent,
            min_kernel_width: self.min_kernel_width,
            max_kernel_width,
            filter_depth_sigma: self.filter_depth_sigma,
            filter_normal_sigma: self.filter_normal_sigma,
            filter_value_sigma: self.filter_value_sigma,
            blur_decay_strength: self.blur_decay_strength,
            blur_depth_sigma: self.blur_depth_sigma,
            blur_surface_hint_sigma: self.blur_surface_hint_sigma,
            _padding: Default::default(),
        })
    }

    /// Returns whether switching from `self` to `new` requires rebuilding the
    /// passes (rather than just re-uploading the params).
    pub fn is_invalidated_by(&self, new: &Self) -> bool {
        self.spatial_filter_passes != new.spatial_filter_passes
            || self.disocclusion_blur_passes != new.disocclusion_blur_passes
    }

    /// Returns the number of passes run after the temporal blend.
    pub(crate) fn filter_passes(&self) -> usize {
        (self.spatial_filter_passes + self.disocclusion_blur_passes) as usize
    }
}

impl Default for DenoiserConfig {
    fn default() -> Self {
        Self {
            max_tspp: 33,
            min_smoothing_factor: 0.03,
            clamp_cached_values: true,
            std_dev_tolerance: 3.0,
            min_std_dev: 0.05,
            min_tspp_to_trust_variance: 12,
            depth_threshold: 0.05,
            normal_threshold: 25.0,
            local_window_radius: 4,
            hit_distance_to_kernel_width_scale: 10.0,
            hit_distance_to_kernel_size_scale_exponent: 0.8,
            min_kernel_width: 3.0,
            max_kernel_width_percentage: 1.5,
            spatial_filter_passes: 1,
            filter_depth_sigma: 1.0,
            filter_normal_sigma: 64.0,
            filter_value_sigma: 2.0,
            blur_strength_max_tspp: 12,
            blur_decay_strength: 1.0,
            disocclusion_blur_passes: 3,
            blur_depth_sigma: 0.05,
            blur_surface_hint_sigma: 8.0,
        }
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;

    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;

    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn range(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), ConfigError> {
    finite(field, value)?;

    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn at_most(field: &'static str, value: u32, max: u32) -> Result<(), ConfigError> {
    if value <= max {
        Ok(())
    } else {
        Err(ConfigError::TooLarge { field, value, max })
    }
}
