use derivative::Derivative;
use glam::{UVec2, Vec2};
use log::debug;

use crate::gpu::{
    self, CacheEntry, Checkerboard, Confidence, DisocclusionBlurPassParams,
    LocalStats, RawSample, SpatialFilterPassParams, Surface,
};
use crate::{
    measure, validate_size, validate_size_of, CacheGeneration, DenoiserConfig,
    DoubleBuffered, Image, Result,
};

/// Inputs of a single frame.
#[derive(Clone, Copy, Debug)]
pub struct CpuFrame<'a> {
    pub raw_samples: &'a Image<RawSample>,
    pub surfaces: &'a Image<Surface>,

    /// Screen-space motion from the previous frame into this one, in pixels
    pub motion: &'a Image<Vec2>,

    pub checkerboard: Checkerboard,
}

/// Runs the same pipeline as [`crate::Denoiser`], but on the CPU; useful for
/// testing and for offline processing of captured frames.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CpuDenoiser {
    config: DenoiserConfig,
    size: UVec2,
    generation: CacheGeneration,

    #[derivative(Debug = "ignore")]
    params: gpu::DenoiserParams,

    #[derivative(Debug = "ignore")]
    cache: DoubleBuffered<Image<CacheEntry>>,

    #[derivative(Debug = "ignore")]
    prev_surfaces: Option<Image<Surface>>,

    #[derivative(Debug = "ignore")]
    local_stats: Image<LocalStats>,

    #[derivative(Debug = "ignore")]
    confidence: Image<Confidence>,

    #[derivative(Debug = "ignore")]
    filtered: Image<f32>,

    #[derivative(Debug = "ignore")]
    output: Image<f32>,
}

impl CpuDenoiser {
    pub fn new(size: UVec2, config: DenoiserConfig) -> Result<Self> {
        validate_size(size)?;

        let params = config.serialize(size)?;

        debug!("Creating CPU denoiser: size={size}");

        Ok(Self {
            config,
            size,
            generation: Default::default(),
            params,
            cache: DoubleBuffered::from_fn(|| {
                Image::filled(size, CacheEntry::default())
            }),
            prev_surfaces: None,
            local_stats: Image::filled(size, Default::default()),
            confidence: Image::filled(size, Default::default()),
            filtered: Image::filled(size, 0.0),
            output: Image::filled(size, 0.0),
        })
    }

    /// Applies a new config; history is kept.
    pub fn configure(&mut self, config: DenoiserConfig) -> Result<()> {
        self.params = config.serialize(self.size)?;
        self.config = config;

        Ok(())
    }

    /// Changes the frame size; history is discarded.
    pub fn resize(&mut self, size: UVec2) -> Result<()> {
        *self = Self::new(size, self.config.clone())?;

        Ok(())
    }

    /// Denoises given frame, returning the final ambient occlusion.
    pub fn denoise(&mut self, frame: CpuFrame) -> Result<&Image<f32>> {
        validate_size_of("raw samples", self.size, frame.raw_samples.size())?;
        validate_size_of("surfaces", self.size, frame.surfaces.size())?;
        validate_size_of("motion", self.size, frame.motion.size())?;

        let params = &self.params;
        let size = self.size;
        let checkerboard = frame.checkerboard;
        let raw_samples = frame.raw_samples;
        let surfaces = frame.surfaces;

        let depth_gradients = measure("depth_gradient", || {
            Image::from_fn(size, |pos| {
                gpu::depth_gradient(params, pos, |pos| surfaces.get(pos).depth)
            })
        });

        // First frame has nothing to compare against, so it's compared with
        // itself
        let prev_surfaces =
            &*self.prev_surfaces.get_or_insert_with(|| surfaces.clone());

        // ---

        self.generation.advance();

        let (past, curr) = self.cache.split_mut(self.generation.is_alternate());

        *curr = measure("reprojection", || {
            Image::from_fn(size, |pos| {
                let reprojection = gpu::reproject(
                    params,
                    pos,
                    surfaces.get(pos),
                    depth_gradients.get(pos),
                    frame.motion.get(pos),
                    |pos| prev_surfaces.get(pos),
                );

                gpu::resample(params, reprojection, |pos| past.get(pos))
            })
        });

        self.local_stats = measure("local_stats", || {
            let stats = Image::from_fn(size, |pos| {
                gpu::local_stats(params, checkerboard, pos, |pos| {
                    raw_samples.get(pos)
                })
            });

            Image::from_fn(size, |pos| {
                gpu::fill_in(params, checkerboard, pos, |pos| stats.get(pos))
            })
        });

        // ---

        self.generation.advance();

        let (past, curr) = self.cache.split_mut(self.generation.is_alternate());
        let local_stats = &self.local_stats;

        let blended = measure("temporal_blend", || {
            Image::from_fn(size, |pos| {
                gpu::temporal_blend(
                    params,
                    raw_samples.get(pos),
                    checkerboard.is_active(pos),
                    local_stats.get(pos),
                    past.get(pos),
                )
            })
        });

        *curr = blended.map(|blend| blend.entry);
        self.confidence = blended.map(|blend| blend.confidence);

        let cache = &*curr;
        let confidence = &self.confidence;
        let mut value = blended.map(|blend| blend.entry.value);

        // ---

        for nth in 0..self.config.spatial_filter_passes {
            let pass = SpatialFilterPassParams {
                radius_scale: 0.5f32.powi(nth as i32),
            };

            value = measure("spatial_filter", || {
                Image::from_fn(size, |pos| {
                    gpu::spatial_filter(
                        params,
                        &pass,
                        pos,
                        surfaces.get(pos),
                        depth_gradients.get(pos),
                        value.get(pos),
                        cache.get(pos).hit_distance,
                        confidence.get(pos).variance,
                        |pos| (value.get(pos), surfaces.get(pos)),
                    )
                })
            });
        }

        self.filtered = value.clone();

        for nth in 0..self.config.disocclusion_blur_passes {
            let pass = DisocclusionBlurPassParams::nth(nth);

            value = measure("disocclusion_blur", || {
                Image::from_fn(size, |pos| {
                    gpu::disocclusion_blur(
                        params,
                        &pass,
                        pos,
                        surfaces.get(pos),
                        value.get(pos),
                        confidence.get(pos).blur_strength,
                        |pos| (value.get(pos), surfaces.get(pos)),
                    )
                })
            });
        }

        self.output = value;
        self.prev_surfaces = Some(surfaces.clone());

        Ok(&self.output)
    }

    pub fn config(&self) -> &DenoiserConfig {
        &self.config
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn generation(&self) -> CacheGeneration {
        self.generation
    }

    /// History written by the latest frame.
    pub fn cache(&self) -> &Image<CacheEntry> {
        self.cache.get(self.generation.is_alternate())
    }

    /// Local statistics of the latest frame, after the fill-in.
    pub fn local_stats(&self) -> &Image<LocalStats> {
        &self.local_stats
    }

    pub fn variance(&self) -> Image<f32> {
        self.confidence.map(|c| c.variance)
    }

    pub fn blur_strength(&self) -> Image<f32> {
        self.confidence.map(|c| c.blur_strength)
    }

    /// Output of the spatial filter, before the disocclusion blur.
    pub fn filtered(&self) -> &Image<f32> {
        &self.filtered
    }

    pub fn output(&self) -> &Image<f32> {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec2, Vec3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::{ConfigError, Error};

    const SIZE: UVec2 = UVec2::new(16, 16);

    struct Scene {
        raw_samples: Image<RawSample>,
        surfaces: Image<Surface>,
        motion: Image<Vec2>,
        checkerboard: Checkerboard,
    }

    impl Scene {
        fn wall(size: UVec2, depth: f32) -> Self {
            Self {
                raw_samples: Image::filled(size, RawSample::invalid()),
                surfaces: Image::filled(
                    size,
                    Surface::new(Vec3::Z, depth, 0.5),
                ),
                motion: Image::filled(size, Vec2::ZERO),
                checkerboard: Checkerboard::disabled(),
            }
        }

        fn sample(&mut self, f: impl Fn(UVec2) -> f32 + Sync) {
            let checkerboard = self.checkerboard;

            self.raw_samples =
                Image::from_fn(self.raw_samples.size(), |pos| {
                    if checkerboard.is_active(pos) {
                        RawSample::without_hit(f(pos))
                    } else {
                        RawSample::invalid()
                    }
                });
        }

        fn sample_noise(&mut self, rng: &mut StdRng) {
            let size = self.raw_samples.size();
            let noise: Vec<f32> =
                (0..size.x * size.y).map(|_| rng.gen()).collect();

            self.sample(|pos| noise[(pos.y * size.x + pos.x) as usize]);
        }

        fn frame(&self) -> CpuFrame<'_> {
            CpuFrame {
                raw_samples: &self.raw_samples,
                surfaces: &self.surfaces,
                motion: &self.motion,
                checkerboard: self.checkerboard,
            }
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    #[test]
    fn history_grows_up_to_max_tspp() {
        let mut target = CpuDenoiser::new(
            SIZE,
            DenoiserConfig {
                max_tspp: 8,
                ..Default::default()
            },
        )
        .unwrap();

        let mut scene = Scene::wall(SIZE, 10.0);

        scene.sample(|_| 0.5);

        for frame in 1..=8 {
            target.denoise(scene.frame()).unwrap();

            for entry in target.cache().pixels() {
                assert_eq!(frame, entry.tspp);
            }
        }

        for _ in 0..4 {
            target.denoise(scene.frame()).unwrap();
        }

        for entry in target.cache().pixels() {
            assert_eq!(8, entry.tspp);
            assert_relative_eq!(entry.value, 0.5, epsilon = 1e-6);
        }

        assert_eq!(24, target.generation().get());
    }

    #[test]
    fn zero_depth_threshold_rejects_all_history() {
        let mut rng = rng();

        let mut target = CpuDenoiser::new(
            SIZE,
            DenoiserConfig {
                depth_threshold: 0.0,
                ..Default::default()
            },
        )
        .unwrap();

        let mut scene = Scene::wall(SIZE, 10.0);

        for _ in 0..4 {
            scene.sample_noise(&mut rng);
            target.denoise(scene.frame()).unwrap();

            for (entry, raw) in target
                .cache()
                .pixels()
                .iter()
                .zip(scene.raw_samples.pixels())
            {
                assert_eq!(0, entry.tspp);
                assert_eq!(raw.ao, entry.value);
            }
        }
    }

    #[test]
    fn variances_are_never_negative() {
        let mut rng = rng();
        let mut target = CpuDenoiser::new(SIZE, Default::default()).unwrap();
        let mut scene = Scene::wall(SIZE, 10.0);

        scene.checkerboard = Checkerboard::new(0);

        for _ in 0..12 {
            scene.motion = Image::from_fn(SIZE, |pos| {
                vec2((pos.x % 5) as f32 - 2.0, (pos.y % 3) as f32 - 1.0) * 0.7
            });

            scene.sample_noise(&mut rng);
            target.denoise(scene.frame()).unwrap();
            scene.checkerboard = scene.checkerboard.next();

            assert!(target.variance().pixels().iter().all(|&v| v >= 0.0));

            assert!(target
                .local_stats()
                .pixels()
                .iter()
                .all(|stats| stats.variance >= 0.0));

            assert!(target.output().pixels().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn constant_input_converges() {
        for checkerboard in [Checkerboard::disabled(), Checkerboard::new(0)] {
            let mut target =
                CpuDenoiser::new(SIZE, Default::default()).unwrap();

            let mut scene = Scene::wall(SIZE, 10.0);

            scene.checkerboard = checkerboard;

            for _ in 0..6 {
                scene.sample(|_| 0.3);

                let output = target.denoise(scene.frame()).unwrap();

                for &value in output.pixels() {
                    assert_relative_eq!(value, 0.3, epsilon = 1e-5);
                }

                scene.checkerboard = scene.checkerboard.next();
            }
        }
    }

    #[test]
    fn disoccluded_pixels_get_blurred() {
        let mut rng = rng();

        let mut target = CpuDenoiser::new(
            uvec2(32, 32),
            DenoiserConfig {
                spatial_filter_passes: 0,
                disocclusion_blur_passes: 3,
                ..Default::default()
            },
        )
        .unwrap();

        let mut scene = Scene::wall(uvec2(32, 32), 10.0);

        for _ in 0..4 {
            scene.sample_noise(&mut rng);
            target.denoise(scene.frame()).unwrap();
        }

        // Camera cut: everything jumps away, so no history survives
        scene = Scene::wall(uvec2(32, 32), 20.0);
        scene.sample_noise(&mut rng);

        let raw = scene.raw_samples.map(|sample| sample.ao);
        let output = target.denoise(scene.frame()).unwrap().clone();

        assert!(target.cache().pixels().iter().all(|entry| entry.is_cold()));
        assert!(target.blur_strength().pixels().iter().all(|&s| s == 1.0));
        assert!(output.variance() < 0.25 * raw.variance());
    }

    #[test]
    fn inactive_pixels_keep_their_history() {
        let mut target = CpuDenoiser::new(SIZE, Default::default()).unwrap();
        let mut scene = Scene::wall(SIZE, 10.0);

        scene.checkerboard = Checkerboard::new(0);

        for _ in 0..40 {
            scene.sample(|_| 0.2);
            target.denoise(scene.frame()).unwrap();
            scene.checkerboard = scene.checkerboard.next();
        }

        scene.sample(|_| 0.8);
        target.denoise(scene.frame()).unwrap();

        for y in 0..SIZE.y {
            for x in 0..SIZE.x {
                let pos = uvec2(x, y);
                let entry = target.cache().get(pos);

                if scene.checkerboard.is_active(pos) {
                    assert!(entry.value > 0.21);
                } else {
                    assert_relative_eq!(entry.value, 0.2, epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn resize_discards_history() {
        let mut target = CpuDenoiser::new(SIZE, Default::default()).unwrap();
        let mut scene = Scene::wall(SIZE, 10.0);

        scene.sample(|_| 0.5);

        for _ in 0..5 {
            target.denoise(scene.frame()).unwrap();
        }

        target.resize(uvec2(8, 4)).unwrap();

        assert_eq!(uvec2(8, 4), target.size());
        assert_eq!(0, target.generation().get());

        assert!(matches!(
            target.denoise(scene.frame()),
            Err(Error::SizeMismatch {
                what: "raw samples",
                ..
            })
        ));

        let mut scene = Scene::wall(uvec2(8, 4), 10.0);

        scene.sample(|_| 0.5);
        target.denoise(scene.frame()).unwrap();

        assert!(target.cache().pixels().iter().all(|entry| entry.tspp == 1));
    }

    #[test]
    fn configure_keeps_history() {
        let mut target = CpuDenoiser::new(SIZE, Default::default()).unwrap();
        let mut scene = Scene::wall(SIZE, 10.0);

        scene.sample(|_| 0.5);

        for _ in 0..5 {
            target.denoise(scene.frame()).unwrap();
        }

        target
            .configure(DenoiserConfig {
                filter_value_sigma: 4.0,
                ..Default::default()
            })
            .unwrap();

        assert!(target
            .configure(DenoiserConfig {
                max_tspp: 0,
                ..Default::default()
            })
            .is_err());

        assert_eq!(4.0, target.config().filter_value_sigma);

        target.denoise(scene.frame()).unwrap();

        assert!(target.cache().pixels().iter().all(|entry| entry.tspp == 6));
    }

    #[test]
    fn invalid_setup_is_rejected() {
        assert!(matches!(
            CpuDenoiser::new(
                SIZE,
                DenoiserConfig {
                    max_tspp: 0,
                    ..Default::default()
                }
            ),
            Err(Error::InvalidConfig(ConfigError::ZeroMaxTspp))
        ));

        assert!(matches!(
            CpuDenoiser::new(uvec2(0, 16), Default::default()),
            Err(Error::InvalidSize(_))
        ));
    }
}
