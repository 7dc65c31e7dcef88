use glam::{vec4, UVec2, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    lerp, CacheEntry, DenoiserParams, F32Ext, LocalStats, RawSample, TexRgba32,
};

/// Per-pixel byproducts of the temporal blend, consumed by the spatial
/// stages.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct Confidence {
    /// Variance estimate used to gate the spatial filter's value weights
    pub variance: f32,

    /// How strongly the disocclusion blur should smooth this pixel, `<0.0, 1.0>`
    pub blur_strength: f32,
}

impl Confidence {
    pub fn serialize(&self) -> Vec4 {
        vec4(self.variance, self.blur_strength, 0.0, 0.0)
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self {
            variance: d0.x,
            blur_strength: d0.y,
        }
    }
}

#[derive(Clone, Copy)]
pub struct ConfidenceMap<'a> {
    tex: TexRgba32<'a>,
}

impl<'a> ConfidenceMap<'a> {
    pub fn new(tex: TexRgba32<'a>) -> Self {
        Self { tex }
    }

    pub fn get(&self, screen_pos: UVec2) -> Confidence {
        Confidence::deserialize(self.tex.read(screen_pos))
    }

    pub fn set(&self, screen_pos: UVec2, confidence: &Confidence) {
        unsafe {
            self.tex.write(screen_pos, confidence.serialize());
        }
    }
}

#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct TemporalBlend {
    pub entry: CacheEntry,
    pub confidence: Confidence,
}

/// Returns the weight given to the fresh raw sample.
pub fn smoothing_factor(params: &DenoiserParams, tspp: u32) -> f32 {
    (1.0 / (tspp.max(1) as f32)).max(params.min_smoothing_factor)
}

/// Returns blur strength for a pixel with given history length; decreases
/// monotonically, reaching zero at `blur_strength_max_tspp`.
pub fn blur_strength(params: &DenoiserParams, tspp: u32) -> f32 {
    if params.blur_strength_max_tspp == 0 {
        return 0.0;
    }

    let strength =
        (1.0 - tspp as f32 / params.blur_strength_max_tspp as f32).saturate();

    strength.powf(params.blur_decay_strength)
}

/// Blends reprojected history with the current raw sample.
///
/// `cached` is the entry produced by [`crate::resample()`], whose `tspp` has
/// already been incremented; it's stored as-is.
///
/// Pixels without a fresh sample (inactive checkerboard pixels, invalid raw
/// samples) keep their history; if there's no history either, they take the
/// local mean so that every pixel leaves this stage with a defined value.
pub fn temporal_blend(
    params: &DenoiserParams,
    raw: RawSample,
    is_active: bool,
    stats: LocalStats,
    cached: CacheEntry,
) -> TemporalBlend {
    let tspp = cached.tspp;
    let alpha = smoothing_factor(params, tspp);
    let has_sample = is_active && raw.is_valid();
    let has_history = alpha < 1.0;

    let mut cached_value = cached.value;
    let mut cached_squared_mean = cached.squared_mean;

    if has_sample
        && has_history
        && params.clamps_cached_values()
        && tspp < params.min_tspp_to_trust_variance
    {
        let tolerance =
            params.std_dev_tolerance * stats.std_dev().max(params.min_std_dev);

        let clamped =
            cached_value.clamp(raw.ao - tolerance, raw.ao + tolerance);

        // Shift the second moment together with the mean, so that the
        // temporal variance survives clamping
        cached_squared_mean += clamped.sqr() - cached_value.sqr();
        cached_value = clamped;
    }

    let value;
    let squared_mean;
    let hit_distance;

    if has_sample {
        value = lerp(cached_value, raw.ao, alpha);
        squared_mean = lerp(cached_squared_mean, raw.ao.sqr(), alpha);

        hit_distance = if raw.has_hit_distance() {
            lerp(cached.hit_distance, raw.hit_distance, alpha)
        } else {
            cached.hit_distance
        };
    } else if has_history {
        value = cached_value;
        squared_mean = cached_squared_mean;
        hit_distance = cached.hit_distance;
    } else {
        value = stats.mean;
        squared_mean = stats.squared_mean();
        hit_distance = cached.hit_distance;
    }

    let entry = CacheEntry {
        tspp,
        value,
        squared_mean,
        hit_distance,
    };

    let variance = if tspp >= params.min_tspp_to_trust_variance {
        entry.variance()
    } else {
        stats.variance.max(0.0)
    };

    TemporalBlend {
        entry,
        confidence: Confidence {
            variance,
            blur_strength: blur_strength(params, tspp),
        },
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn params() -> DenoiserParams {
        DenoiserParams {
            max_tspp: 33,
            min_smoothing_factor: 0.05,
            clamp_cached_values: 1,
            std_dev_tolerance: 2.0,
            min_std_dev: 0.01,
            min_tspp_to_trust_variance: 12,
            blur_strength_max_tspp: 12,
            blur_decay_strength: 1.0,
            ..Default::default()
        }
    }

    fn history(tspp: u32, value: f32) -> CacheEntry {
        CacheEntry {
            tspp,
            value,
            squared_mean: value * value + 0.01,
            hit_distance: 2.0,
        }
    }

    fn stats() -> LocalStats {
        LocalStats {
            mean: 0.5,
            variance: 0.04,
        }
    }

    #[test]
    fn smoothing_factors() {
        assert_eq!(1.0, smoothing_factor(&params(), 0));
        assert_eq!(1.0, smoothing_factor(&params(), 1));
        assert_eq!(0.25, smoothing_factor(&params(), 4));
        assert_eq!(0.05, smoothing_factor(&params(), 30));
    }

    #[test]
    fn cold_start() {
        for ao in [0.0, 0.123, 0.5, 0.987, 1.0] {
            for tspp in [0, 1] {
                let target = temporal_blend(
                    &params(),
                    RawSample::new(ao, 3.0),
                    true,
                    stats(),
                    CacheEntry {
                        tspp,
                        value: 0.77,
                        squared_mean: 0.9,
                        hit_distance: 1.0,
                    },
                );

                assert_eq!(ao, target.entry.value);
                assert_eq!(ao * ao, target.entry.squared_mean);
                assert_eq!(3.0, target.entry.hit_distance);
                assert_eq!(tspp, target.entry.tspp);
            }
        }
    }

    #[test]
    fn running_average() {
        let target = temporal_blend(
            &params(),
            RawSample::new(0.8, 1.0),
            true,
            stats(),
            history(4, 0.4),
        );

        assert_relative_eq!(target.entry.value, 0.5, epsilon = 1e-6);
        assert_relative_eq!(target.entry.hit_distance, 1.75, epsilon = 1e-6);
        assert_eq!(4, target.entry.tspp);
    }

    #[test]
    fn undefined_hit_distance_is_held() {
        let target = temporal_blend(
            &params(),
            RawSample::without_hit(0.8),
            true,
            stats(),
            history(4, 0.4),
        );

        assert_eq!(2.0, target.entry.hit_distance);
    }

    #[test]
    fn inactive_pixel_keeps_history() {
        let target = temporal_blend(
            &params(),
            RawSample::new(100.0, 100.0),
            false,
            stats(),
            history(4, 0.4),
        );

        assert_eq!(history(4, 0.4), target.entry);
    }

    #[test]
    fn inactive_pixel_without_history_takes_local_mean() {
        let target = temporal_blend(
            &params(),
            RawSample::new(100.0, 100.0),
            false,
            stats(),
            CacheEntry::default(),
        );

        assert_eq!(0.5, target.entry.value);
        assert_relative_eq!(target.entry.squared_mean, 0.29, epsilon = 1e-6);
        assert_relative_eq!(target.entry.variance(), 0.04, epsilon = 1e-6);
    }

    #[test]
    fn clamping() {
        // Tolerance is 2.0 * sqrt(0.04) = 0.4, so the cached value gets pulled
        // from 0.9 into 0.1 + 0.4
        let target = temporal_blend(
            &params(),
            RawSample::without_hit(0.1),
            true,
            stats(),
            history(2, 0.9),
        );

        assert_relative_eq!(target.entry.value, 0.3, epsilon = 1e-6);

        // Temporal variance of the history (0.01) is preserved
        assert_relative_eq!(
            target.entry.squared_mean,
            0.5 * (0.25 + 0.01) + 0.5 * 0.01,
            epsilon = 1e-6
        );
    }

    #[test]
    fn no_clamping_with_trusted_history() {
        let target = temporal_blend(
            &params(),
            RawSample::without_hit(0.1),
            true,
            stats(),
            history(20, 0.9),
        );

        assert_relative_eq!(target.entry.value, 0.86, epsilon = 1e-6);
    }

    #[test]
    fn no_clamping_when_disabled() {
        let params = DenoiserParams {
            clamp_cached_values: 0,
            ..params()
        };

        let target = temporal_blend(
            &params,
            RawSample::without_hit(0.1),
            true,
            stats(),
            history(2, 0.9),
        );

        assert_relative_eq!(target.entry.value, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn variance_source() {
        let target = temporal_blend(
            &params(),
            RawSample::without_hit(0.5),
            true,
            stats(),
            history(4, 0.5),
        );

        assert_eq!(0.04, target.confidence.variance);

        let target = temporal_blend(
            &params(),
            RawSample::without_hit(0.5),
            true,
            stats(),
            history(20, 0.5),
        );

        assert_relative_eq!(
            target.confidence.variance,
            0.95 * 0.01,
            epsilon = 1e-6
        );
    }

    #[test]
    fn blur_strength_decreases() {
        let mut prev = blur_strength(&params(), 0);

        assert_eq!(1.0, prev);

        for tspp in 1..=33 {
            let curr = blur_strength(&params(), tspp);

            assert!(curr <= prev);
            prev = curr;
        }

        assert_eq!(0.0, blur_strength(&params(), 12));
        assert_eq!(0.0, blur_strength(&params(), 33));
    }

    #[test]
    fn blur_strength_decay() {
        let params = DenoiserParams {
            blur_decay_strength: 2.0,
            ..params()
        };

        assert_relative_eq!(blur_strength(&params, 6), 0.25, epsilon = 1e-6);
    }
}
