use log::debug;

use crate::{Error, Result};

/// Loads given `umbra-shaders` entry point, as exported by the shader builder.
#[cfg(feature = "shaders")]
macro_rules! spirv {
    ($device:expr, $name:ident) => {{
        debug!("Loading shader: {}", stringify!($name));

        let module = $device.create_shader_module(wgpu::include_spirv!(env!(
            concat!("umbra_shaders::", stringify!($name), ".path")
        )));

        let entry_point =
            env!(concat!("umbra_shaders::", stringify!($name), ".entry_point"));

        Ok::<_, Error>((module, entry_point))
    }};
}

#[cfg(not(feature = "shaders"))]
macro_rules! spirv {
    ($device:expr, $name:ident) => {{
        let _ = $device;

        debug!("Shader unavailable: {}", stringify!($name));

        Err::<(wgpu::ShaderModule, &'static str), _>(Error::ShadersUnavailable)
    }};
}

macro_rules! shaders {
    ([ $( $name:ident, )* ]) => {
        #[derive(Debug)]
        pub struct Shaders {
            $( pub $name: (wgpu::ShaderModule, &'static str), )*
        }

        impl Shaders {
            pub fn new(device: &wgpu::Device) -> Result<Self> {
                Ok(Self {
                    $( $name: spirv!(device, $name)?, )*
                })
            }
        }
    };
}

shaders!([
    disocclusion_blur,
    local_stats,
    local_stats_fill_in,
    reprojection,
    spatial_filter,
    temporal_blend,
]);
