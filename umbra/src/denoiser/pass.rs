use std::marker::PhantomData;
use std::mem;

use bytemuck::Pod;
use glam::UVec2;
use log::debug;

use crate::{BindGroup, BindGroupBuilder, Denoiser, DoubleBufferedBindable};

/// Side of the square workgroup every `umbra-shaders` entry point uses.
const WORKGROUP_SIZE: u32 = 8;

/// Single compute dispatch over the whole frame; `P` is the push-constant
/// block (`()` when the shader takes none).
#[derive(Debug)]
pub struct DenoiserComputePass<P = ()> {
    label: String,
    bind_groups: Vec<BindGroup>,
    pipeline: wgpu::ComputePipeline,
    _params: PhantomData<P>,
}

impl<P> DenoiserComputePass<P>
where
    P: Pod,
{
    pub fn builder<'a>(label: impl ToString) -> DenoiserPassBuilder<'a, P> {
        DenoiserPassBuilder {
            label: label.to_string(),
            bind_groups: Vec::new(),
            _params: PhantomData,
        }
    }

    /// Records the dispatch, picking bind groups that match the denoiser's
    /// current cache generation.
    pub fn run(
        &self,
        denoiser: &Denoiser,
        encoder: &mut wgpu::CommandEncoder,
        params: P,
    ) {
        let workgroups = workgroups(denoiser.size());
        let alternate = denoiser.generation().is_alternate();

        let mut pass =
            encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&format!("umbra_{}_pass", self.label)),
            });

        pass.set_pipeline(&self.pipeline);

        if has_push_constants::<P>() {
            pass.set_push_constants(0, bytemuck::bytes_of(&params));
        }

        for (idx, bind_group) in self.bind_groups.iter().enumerate() {
            pass.set_bind_group(idx as u32, bind_group.get(alternate), &[]);
        }

        pass.dispatch_workgroups(workgroups.x, workgroups.y, 1);
    }
}

pub struct DenoiserPassBuilder<'a, P> {
    label: String,
    bind_groups: Vec<BindGroupBuilder<'a>>,
    _params: PhantomData<P>,
}

impl<'a, P> DenoiserPassBuilder<'a, P>
where
    P: Pod,
{
    /// Adds a descriptor set; the n-th call describes `descriptor_set = n`.
    pub fn bind<const N: usize>(
        mut self,
        items: [&'a dyn DoubleBufferedBindable; N],
    ) -> Self {
        let label = format!("{}_set{}", self.label, self.bind_groups.len());

        let bind_group = items
            .into_iter()
            .fold(BindGroup::builder(label), |bind_group, item| {
                bind_group.add(item)
            });

        self.bind_groups.push(bind_group);
        self
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        (module, entry_point): &(wgpu::ShaderModule, &'static str),
    ) -> DenoiserComputePass<P> {
        debug!("Building pass `{}` ({entry_point})", self.label);

        let bind_groups: Vec<_> = self
            .bind_groups
            .into_iter()
            .map(|bind_group| bind_group.build(device))
            .collect();

        let layouts: Vec<_> =
            bind_groups.iter().map(|bind_group| bind_group.layout()).collect();

        let push_constant_ranges: Vec<_> = has_push_constants::<P>()
            .then(|| wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::COMPUTE,
                range: 0..mem::size_of::<P>() as u32,
            })
            .into_iter()
            .collect();

        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("umbra_{}_layout", self.label)),
                bind_group_layouts: &layouts,
                push_constant_ranges: &push_constant_ranges,
            });

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&format!("umbra_{}_pipeline", self.label)),
                layout: Some(&layout),
                module,
                entry_point,
            });

        DenoiserComputePass {
            label: self.label,
            bind_groups,
            pipeline,
            _params: PhantomData,
        }
    }
}

fn has_push_constants<P>() -> bool {
    mem::size_of::<P>() > 0
}

/// Number of workgroups covering a frame of given size.
fn workgroups(size: UVec2) -> UVec2 {
    (size + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn workgroups_cover_the_frame() {
        assert_eq!(uvec2(1, 1), workgroups(uvec2(1, 1)));
        assert_eq!(uvec2(1, 1), workgroups(uvec2(8, 8)));
        assert_eq!(uvec2(240, 135), workgroups(uvec2(1920, 1080)));
        assert_eq!(uvec2(2, 3), workgroups(uvec2(9, 17)));
    }

    #[test]
    fn push_constants() {
        assert!(!has_push_constants::<()>());
        assert!(has_push_constants::<crate::gpu::Checkerboard>());
    }
}
