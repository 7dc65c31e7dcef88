//! Temporal-spatial denoiser for noisy ambient occlusion.
//!
//! Each frame the raw (possibly checkerboarded) AO signal goes through:
//!
//! - reprojection, which locates every pixel in the previous frame and
//!   resamples its history,
//! - local statistics, with a fill-in pass for pixels skipped by the
//!   checkerboard,
//! - temporal blend, which mixes history with the fresh samples,
//! - edge-stopping spatial filter, whose radius follows the ray-hit distance,
//! - disocclusion blur, which smooths pixels that have just lost history.
//!
//! The per-pixel algorithms live in [`gpu`] and are shared by two backends:
//! [`Engine`], which records wgpu compute passes (requires the `shaders`
//! feature), and [`CpuDenoiser`], which runs them through rayon.

mod buffers;
mod config;
mod cpu;
mod denoiser;
mod denoisers;
mod error;
mod generation;
mod shaders;
mod utils;

use glam::UVec2;
use log::info;
pub use umbra_gpu as gpu;

pub(crate) use self::buffers::*;
pub use self::config::*;
pub use self::cpu::*;
pub use self::denoiser::*;
pub use self::denoisers::*;
pub use self::error::*;
pub use self::generation::*;
pub(crate) use self::shaders::*;
pub(crate) use self::utils::*;

#[derive(Debug)]
pub struct Engine {
    shaders: Shaders,
    denoisers: Denoisers,
}

impl Engine {
    pub fn new(device: &wgpu::Device) -> Result<Self> {
        info!("Initializing");

        Ok(Self {
            shaders: Shaders::new(device)?,
            denoisers: Default::default(),
        })
    }

    /// Features the device has to be created with.
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::PUSH_CONSTANTS
            | wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES
    }

    /// Limits the device has to be created with.
    pub fn required_limits() -> wgpu::Limits {
        wgpu::Limits {
            max_push_constant_size: 128,
            ..Default::default()
        }
    }

    /// Creates a denoiser for frames of given size.
    ///
    /// Every resource gets allocated here, so any failure (including the
    /// device running out of memory) is reported before the first frame.
    pub fn create_denoiser(
        &mut self,
        device: &wgpu::Device,
        size: UVec2,
        config: DenoiserConfig,
    ) -> Result<DenoiserHandle> {
        let denoiser = Denoiser::new(&self.shaders, device, size, config)?;

        Ok(self.denoisers.add(denoiser))
    }

    /// Returns given denoiser; panics if it doesn't exist.
    pub fn denoiser(&self, handle: DenoiserHandle) -> &Denoiser {
        self.denoisers.get(handle)
    }

    pub fn configure_denoiser(
        &mut self,
        device: &wgpu::Device,
        handle: DenoiserHandle,
        config: DenoiserConfig,
    ) -> Result<()> {
        self.denoisers
            .get_mut(handle)
            .configure(&self.shaders, device, config)
    }

    /// Changes denoiser's frame size, discarding its history.
    pub fn resize_denoiser(
        &mut self,
        device: &wgpu::Device,
        handle: DenoiserHandle,
        size: UVec2,
    ) -> Result<()> {
        self.denoisers
            .get_mut(handle)
            .resize(&self.shaders, device, size)
    }

    pub fn delete_denoiser(&mut self, handle: DenoiserHandle) {
        self.denoisers.remove(handle);
    }

    /// Uploads pending changes (e.g. new configs) to the GPU; must be called
    /// before submitting work recorded by [`Self::render_denoiser()`].
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        for denoiser in self.denoisers.iter_mut() {
            denoiser.flush(queue);
        }
    }

    /// Records given denoiser's pipeline for the current frame.
    ///
    /// `checkerboard` tells which pixels got fresh raw samples; the caller is
    /// expected to flip its phase every frame.
    pub fn render_denoiser(
        &mut self,
        handle: DenoiserHandle,
        encoder: &mut wgpu::CommandEncoder,
        checkerboard: gpu::Checkerboard,
    ) {
        self.denoisers.get_mut(handle).render(encoder, checkerboard);
    }
}
