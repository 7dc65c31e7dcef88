use crate::{
    gpu, Denoiser, DenoiserBuffers, DenoiserComputePass, DenoiserConfig,
    Shaders,
};

#[derive(Debug)]
pub struct LocalStatsPass {
    stats: DenoiserComputePass<gpu::Checkerboard>,
    fill_in: DenoiserComputePass<gpu::Checkerboard>,
}

impl LocalStatsPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        _: &DenoiserConfig,
        buffers: &DenoiserBuffers,
    ) -> Self {
        let stats = DenoiserComputePass::builder("local_stats")
            .bind([
                &buffers.params.bind_readable(),
                &buffers.raw_samples.bind_readable(),
            ])
            .bind([&buffers.raw_stats.bind_writable()])
            .build(device, &shaders.local_stats);

        let fill_in = DenoiserComputePass::builder("local_stats_fill_in")
            .bind([&buffers.params.bind_readable()])
            .bind([
                &buffers.raw_stats.bind_readable(),
                &buffers.local_stats.bind_writable(),
            ])
            .build(device, &shaders.local_stats_fill_in);

        Self { stats, fill_in }
    }

    pub fn run(
        &self,
        denoiser: &Denoiser,
        encoder: &mut wgpu::CommandEncoder,
        checkerboard: gpu::Checkerboard,
    ) {
        self.stats.run(denoiser, encoder, checkerboard);
        self.fill_in.run(denoiser, encoder, checkerboard);
    }
}
