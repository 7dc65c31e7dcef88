mod buffers;
mod pass;
mod passes;

use glam::{UVec2, Vec2, Vec4};
use log::{debug, info};

pub use self::buffers::*;
pub use self::pass::*;
pub use self::passes::*;
use crate::{
    gpu, validate_size, CacheGeneration, DenoiserConfig, Error, Result,
    Shaders, Texture,
};

/// GPU instance of the denoising pipeline, with its own history.
///
/// Created through [`crate::Engine::create_denoiser()`]; each frame the
/// caller uploads raw samples, surfaces and motion, then records the pipeline
/// with [`crate::Engine::render_denoiser()`] and reads [`Self::ao_map()`].
#[derive(Debug)]
pub struct Denoiser {
    config: DenoiserConfig,
    size: UVec2,
    buffers: DenoiserBuffers,
    passes: DenoiserPasses,
    generation: CacheGeneration,
    primed: bool,
}

impl Denoiser {
    pub(crate) fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        size: UVec2,
        config: DenoiserConfig,
    ) -> Result<Self> {
        validate_size(size)?;

        let params = config.serialize(size)?;

        info!("Creating denoiser: size={size}");

        let buffers = allocate_buffers(device, size, params)?;
        let passes = build_passes(shaders, device, &config, &buffers)?;

        debug!("Denoiser created");

        Ok(Self {
            config,
            size,
            buffers,
            passes,
            generation: Default::default(),
            primed: false,
        })
    }

    /// Applies a new config; history is kept.
    pub(crate) fn configure(
        &mut self,
        shaders: &Shaders,
        device: &wgpu::Device,
        config: DenoiserConfig,
    ) -> Result<()> {
        let params = config.serialize(self.size)?;
        let needs_rebuilding = self.config.is_invalidated_by(&config);

        self.config = config;
        *self.buffers.params = params;

        if needs_rebuilding {
            self.rebuild_passes(shaders, device)?;
        }

        Ok(())
    }

    /// Reallocates all resources for the new size; history is discarded.
    ///
    /// On error the denoiser is left unusable and should be deleted.
    pub(crate) fn resize(
        &mut self,
        shaders: &Shaders,
        device: &wgpu::Device,
        size: UVec2,
    ) -> Result<()> {
        validate_size(size)?;

        let params = self.config.serialize(size)?;

        debug!("Resizing denoiser: {} -> {}", self.size, size);

        self.size = size;
        self.buffers = allocate_buffers(device, size, params)?;
        self.generation = Default::default();
        self.primed = false;
        self.rebuild_passes(shaders, device)
    }

    fn rebuild_passes(
        &mut self,
        shaders: &Shaders,
        device: &wgpu::Device,
    ) -> Result<()> {
        debug!("Rebuilding denoiser passes");

        self.passes =
            build_passes(shaders, device, &self.config, &self.buffers)?;

        Ok(())
    }

    pub fn write_raw_samples(
        &self,
        queue: &wgpu::Queue,
        samples: &[gpu::RawSample],
    ) -> Result<()> {
        self.write(queue, "raw samples", &self.buffers.raw_samples, samples, |s| {
            s.serialize()
        })
    }

    pub fn write_surfaces(
        &self,
        queue: &wgpu::Queue,
        surfaces: &[gpu::Surface],
    ) -> Result<()> {
        self.write(queue, "surfaces", &self.buffers.surface_map, surfaces, |s| {
            s.serialize()
        })
    }

    /// Uploads per-pixel screen-space motion from the previous frame into the
    /// current one, in pixels.
    pub fn write_motion(
        &self,
        queue: &wgpu::Queue,
        motion: &[Vec2],
    ) -> Result<()> {
        self.write(queue, "motion", &self.buffers.motion_map, motion, |m| {
            m.extend(0.0).extend(0.0)
        })
    }

    fn write<T>(
        &self,
        queue: &wgpu::Queue,
        what: &'static str,
        texture: &Texture,
        items: &[T],
        serialize: impl Fn(&T) -> Vec4,
    ) -> Result<()> {
        let expected = (self.size.x * self.size.y) as usize;

        if items.len() != expected {
            return Err(Error::LengthMismatch {
                what,
                expected,
                actual: items.len(),
            });
        }

        let texels: Vec<_> = items.iter().map(serialize).collect();

        texture.write(queue, &texels);

        Ok(())
    }

    pub(crate) fn flush(&mut self, queue: &wgpu::Queue) {
        self.buffers.params.flush(queue);
    }

    /// Records the whole pipeline for the current frame.
    pub(crate) fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        checkerboard: gpu::Checkerboard,
    ) {
        // Right after allocation there's no geometry the history could have
        // been accumulated for, so let's pretend it was this frame's
        if !self.primed {
            self.buffers
                .surface_map
                .copy_to(encoder, &self.buffers.prev_surface_map);

            self.primed = true;
        }

        self.generation.advance();
        self.passes.reprojection.run(self, encoder);
        self.passes.local_stats.run(self, encoder, checkerboard);

        self.generation.advance();
        self.passes.temporal_blend.run(self, encoder, checkerboard);

        if self.config.filter_passes() == 0 {
            self.buffers.blended.copy_to(encoder, &self.buffers.ao_map);
        } else {
            self.passes.spatial_filter.run(self, encoder);
            self.passes.disocclusion_blur.run(self, encoder);
        }

        self.buffers
            .surface_map
            .copy_to(encoder, &self.buffers.prev_surface_map);
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

    /// Final ambient occlusion, in the `x` channel of an `Rgba32Float`
    /// texture.
    pub fn ao_map(&self) -> &wgpu::Texture {
        self.buffers.ao_map.tex()
    }

    /// Diagnostics: per-pixel variance (`x`) and blur strength (`y`).
    pub fn confidence_map(&self) -> &wgpu::Texture {
        self.buffers.confidence.tex()
    }

    /// Diagnostics: history written by the latest frame (`gpu::CacheEntry`).
    pub fn cache_map(&self) -> &wgpu::Texture {
        self.buffers.cache.get(self.generation.is_alternate()).tex()
    }
}

impl Drop for Denoiser {
    fn drop(&mut self) {
        info!("Deleting denoiser: size={}", self.size);
    }
}

fn allocate_buffers(
    device: &wgpu::Device,
    size: UVec2,
    params: gpu::DenoiserParams,
) -> Result<DenoiserBuffers> {
    scoped(device, wgpu::ErrorFilter::OutOfMemory, || {
        DenoiserBuffers::new(device, size, params)
    })
    .map_err(|err| Error::Allocation(err.to_string()))
}

fn build_passes(
    shaders: &Shaders,
    device: &wgpu::Device,
    config: &DenoiserConfig,
    buffers: &DenoiserBuffers,
) -> Result<DenoiserPasses> {
    scoped(device, wgpu::ErrorFilter::Validation, || {
        DenoiserPasses::new(shaders, device, config, buffers)
    })
    .map_err(|err| Error::Pipeline(err.to_string()))
}

/// Runs `f` inside a wgpu error scope, waiting for the device to report
/// whether it succeeded.
fn scoped<T>(
    device: &wgpu::Device,
    filter: wgpu::ErrorFilter,
    f: impl FnOnce() -> T,
) -> Result<T, wgpu::Error> {
    device.push_error_scope(filter);

    let value = f();

    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(err),
        None => Ok(value),
    }
}
