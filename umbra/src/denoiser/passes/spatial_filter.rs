use crate::{
    gpu, Denoiser, DenoiserBuffers, DenoiserComputePass, DenoiserConfig,
    Shaders,
};

#[derive(Debug)]
pub struct SpatialFilterPass {
    passes: Vec<DenoiserComputePass<gpu::SpatialFilterPassParams>>,
}

impl SpatialFilterPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        config: &DenoiserConfig,
        buffers: &DenoiserBuffers,
    ) -> Self {
        let passes = (0..config.spatial_filter_passes as usize)
            .map(|nth| {
                let (input, output) =
                    buffers.filter_chain(nth, config.filter_passes());

                DenoiserComputePass::builder(format!("spatial_filter_{nth}"))
                    .bind([
                        &buffers.params.bind_readable(),
                        &buffers.surface_map.bind_readable(),
                        &buffers.cache.curr().bind_readable(),
                        &buffers.confidence.bind_readable(),
                    ])
                    .bind([&input.bind_readable(), &output.bind_writable()])
                    .build(device, &shaders.spatial_filter)
            })
            .collect();

        Self { passes }
    }

    pub fn run(&self, denoiser: &Denoiser, encoder: &mut wgpu::CommandEncoder) {
        for (nth, pass) in self.passes.iter().enumerate() {
            let params = gpu::SpatialFilterPassParams {
                radius_scale: 0.5f32.powi(nth as i32),
            };

            pass.run(denoiser, encoder, params);
        }
    }
}
