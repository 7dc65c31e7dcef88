use crate::{
    gpu, Denoiser, DenoiserBuffers, DenoiserComputePass, DenoiserConfig,
    Shaders,
};

#[derive(Debug)]
pub struct DisocclusionBlurPass {
    passes: Vec<DenoiserComputePass<gpu::DisocclusionBlurPassParams>>,
}

impl DisocclusionBlurPass {
    pub fn new(
        shaders: &Shaders,
        device: &wgpu::Device,
        config: &DenoiserConfig,
        buffers: &DenoiserBuffers,
    ) -> Self {
        let offset = config.spatial_filter_passes as usize;

        let passes = (0..config.disocclusion_blur_passes as usize)
            .map(|nth| {
                let (input, output) =
                    buffers.filter_chain(offset + nth, config.filter_passes());

                DenoiserComputePass::builder(format!("disocclusion_blur_{nth}"))
                    .bind([
                        &buffers.params.bind_readable(),
                        &buffers.surface_map.bind_readable(),
                        &buffers.confidence.bind_readable(),
                    ])
                    .bind([&input.bind_readable(), &output.bind_writable()])
                    .build(device, &shaders.disocclusion_blur)
            })
            .collect();

        Self { passes }
    }

    pub fn run(&self, denoiser: &Denoiser, encoder: &mut wgpu::CommandEncoder) {
        for (nth, pass) in self.passes.iter().enumerate() {
            pass.run(
                denoiser,
                encoder,
                gpu::DisocclusionBlurPassParams::nth(nth as u32),
            );
        }
    }
}
