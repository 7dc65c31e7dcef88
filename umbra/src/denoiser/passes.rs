use log::debug;

use crate::{DenoiserBuffers, DenoiserConfig, Shaders};

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct DenoiserPasses {
            $( pub $name: $class, )*
        }

        impl DenoiserPasses {
            pub fn new(
                shaders: &Shaders,
                device: &wgpu::Device,
                config: &DenoiserConfig,
                buffers: &DenoiserBuffers,
            ) -> Self {
                debug!("Initializing denoiser passes");

                Self {
                    $( $name: $class::new(shaders, device, config, buffers), )*
                }
            }
        }
    };
}

passes!([
    disocclusion_blur => DisocclusionBlurPass,
    local_stats => LocalStatsPass,
    reprojection => ReprojectionPass,
    spatial_filter => SpatialFilterPass,
    temporal_blend => TemporalBlendPass,
]);
