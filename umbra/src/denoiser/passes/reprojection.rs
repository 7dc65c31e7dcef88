use crate::{
    Denoiser, DenoiserBuffers, DenoiserComputePass, DenoiserConfig, Shaders,
};

#[derive(Debug)]
pub struct ReprojectionPass {
    pass: DenoiserComputePass,
}

impl ReprojectionPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        _: &DenoiserConfig,
        buffers: &DenoiserBuffers,
    ) -> Self {
        let pass = DenoiserComputePass::builder("reprojection")
            .bind([
                &buffers.params.bind_readable(),
                &buffers.surface_map.bind_readable(),
                &buffers.prev_surface_map.bind_readable(),
                &buffers.motion_map.bind_readable(),
            ])
            .bind([
                &buffers.cache.past().bind_readable(),
                &buffers.cache.curr().bind_writable(),
            ])
            .build(device, &shaders.reprojection);

        Self { pass }
    }

    pub fn run(&self, denoiser: &Denoiser, encoder: &mut wgpu::CommandEncoder) {
        self.pass.run(denoiser, encoder, ());
    }
}
