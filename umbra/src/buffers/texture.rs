use std::mem;

use glam::{UVec2, Vec4};
use log::debug;

use crate::Bindable;

/// Every texel is four floats; stages decode them through the `serialize()` /
/// `deserialize()` pairs of `umbra-gpu` types.
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

#[derive(Debug)]
pub struct Texture {
    tex: wgpu::Texture,
    view: wgpu::TextureView,
    size: UVec2,
}

impl Texture {
    pub fn new(device: &wgpu::Device, label: impl AsRef<str>, size: UVec2) -> Self {
        let label = label.as_ref();

        debug!("Allocating texture `{label}`; size={size}");

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = tex.create_view(&Default::default());

        Self { tex, view, size }
    }

    pub fn tex(&self) -> &wgpu::Texture {
        &self.tex
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Uploads texels, given in row-major order.
    pub fn write(&self, queue: &wgpu::Queue, texels: &[Vec4]) {
        assert_eq!(
            texels.len(),
            (self.size.x * self.size.y) as usize,
            "texel count doesn't match texture's size"
        );

        queue.write_texture(
            self.tex.as_image_copy(),
            bytemuck::cast_slice(texels),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(self.size.x * mem::size_of::<Vec4>() as u32),
                rows_per_image: Some(self.size.y),
            },
            extent(self.size),
        );
    }

    pub fn copy_to(&self, encoder: &mut wgpu::CommandEncoder, target: &Self) {
        assert_eq!(self.size, target.size);

        encoder.copy_texture_to_texture(
            self.tex.as_image_copy(),
            target.tex.as_image_copy(),
            extent(self.size),
        );
    }

    pub fn bind_readable(&self) -> impl Bindable + '_ {
        TextureBinder { parent: self }
    }

    pub fn bind_writable(&self) -> impl Bindable + '_ {
        TextureBinder { parent: self }
    }
}

fn extent(size: UVec2) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.x,
        height: size.y,
        depth_or_array_layers: 1,
    }
}

struct TextureBinder<'a> {
    parent: &'a Texture,
}

impl Bindable for TextureBinder<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        // rust-gpu doesn't emit `NonWritable` decorations, so even the
        // textures we only read from have to be declared as read-write
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::ReadWrite,
                format: FORMAT,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        };

        vec![(layout, wgpu::BindingResource::TextureView(&self.parent.view))]
    }
}
