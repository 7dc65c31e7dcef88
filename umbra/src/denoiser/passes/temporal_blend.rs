use crate::{
    gpu, Denoiser, DenoiserBuffers, DenoiserComputePass, DenoiserConfig,
    Shaders,
};

#[derive(Debug)]
pub struct TemporalBlendPass {
    pass: DenoiserComputePass<gpu::Checkerboard>,
}

impl TemporalBlendPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        _: &DenoiserConfig,
        buffers: &DenoiserBuffers,
    ) -> Self {
        // Runs after the generation has advanced again, so the past slot
        // holds what reprojection has just written
        let pass = DenoiserComputePass::builder("temporal_blend")
            .bind([
                &buffers.params.bind_readable(),
                &buffers.raw_samples.bind_readable(),
                &buffers.local_stats.bind_readable(),
            ])
            .bind([
                &buffers.cache.past().bind_readable(),
                &buffers.cache.curr().bind_writable(),
                &buffers.blended.bind_writable(),
                &buffers.confidence.bind_writable(),
            ])
            .build(device, &shaders.temporal_blend);

        Self { pass }
    }

    pub fn run(
        &self,
        denoiser: &Denoiser,
        encoder: &mut wgpu::CommandEncoder,
        checkerboard: gpu::Checkerboard,
    ) {
        self.pass.run(denoiser, encoder, checkerboard);
    }
}
