use glam::UVec2;
use log::debug;

use crate::{gpu, DoubleBuffered, MappedUniformBuffer, Texture};

#[derive(Debug)]
pub struct DenoiserBuffers {
    pub params: MappedUniformBuffer<gpu::DenoiserParams>,

    /// Current frame's raw samples (`gpu::RawSample`); written by the caller
    pub raw_samples: Texture,

    /// Current frame's geometry (`gpu::Surface`); written by the caller
    pub surface_map: Texture,

    /// Geometry the history was accumulated for (`gpu::Surface`)
    pub prev_surface_map: Texture,

    /// Per-pixel screen-space motion, in pixels, stored in `xy`; written by
    /// the caller
    pub motion_map: Texture,

    /// History (`gpu::CacheEntry`)
    pub cache: DoubleBuffered<Texture>,

    /// Local statistics of active pixels (`gpu::LocalStats`)
    pub raw_stats: Texture,

    /// Local statistics of all pixels, after the checkerboard fill-in
    pub local_stats: Texture,

    /// Temporally blended value, stored in `x`
    pub blended: Texture,

    /// Variance and blur strength (`gpu::Confidence`)
    pub confidence: Texture,

    /// Intermediate values of the spatial filter and disocclusion blur
    pub scratch: [Texture; 2],

    /// Final ambient occlusion, stored in `x`
    pub ao_map: Texture,
}

impl DenoiserBuffers {
    pub fn new(
        device: &wgpu::Device,
        size: UVec2,
        params: gpu::DenoiserParams,
    ) -> Self {
        debug!("Initializing denoiser buffers");

        Self {
            params: MappedUniformBuffer::new(device, "umbra_params", params),
            raw_samples: Texture::new(device, "umbra_raw_samples", size),
            surface_map: Texture::new(device, "umbra_surface_map", size),
            prev_surface_map: Texture::new(
                device,
                "umbra_prev_surface_map",
                size,
            ),
            motion_map: Texture::new(device, "umbra_motion_map", size),
            cache: DoubleBuffered::<Texture>::new(device, "umbra_cache", size),
            raw_stats: Texture::new(device, "umbra_raw_stats", size),
            local_stats: Texture::new(device, "umbra_local_stats", size),
            blended: Texture::new(device, "umbra_blended", size),
            confidence: Texture::new(device, "umbra_confidence", size),
            scratch: [
                Texture::new(device, "umbra_scratch_a", size),
                Texture::new(device, "umbra_scratch_b", size),
            ],
            ao_map: Texture::new(device, "umbra_ao_map", size),
        }
    }

    /// Returns textures read and written by the `nth` out of `len` passes run
    /// after the temporal blend (spatial filter passes first, then the
    /// disocclusion blur ones).
    ///
    /// The chain starts at the blended value, ping-pongs through the scratch
    /// textures and ends at the AO map.
    pub fn filter_chain(&self, nth: usize, len: usize) -> (&Texture, &Texture) {
        let input = if nth == 0 {
            &self.blended
        } else {
            &self.scratch[(nth - 1) % 2]
        };

        let output = if nth + 1 == len {
            &self.ao_map
        } else {
            &self.scratch[nth % 2]
        };

        (input, output)
    }
}
