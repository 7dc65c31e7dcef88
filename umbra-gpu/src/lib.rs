//! Per-pixel algorithms and data layouts shared by Umbra's shaders and its
//! CPU reference backend.
//!
//! Every stage is written as a pure function over sampling closures, so that
//! the very same code can read from storage images on the GPU and from plain
//! buffers on the CPU.

#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::too_many_arguments)]

mod cache;
mod checkerboard;
mod disocclusion_blur;
mod local_stats;
mod normal;
mod params;
mod raw_sample;
mod reprojection;
mod spatial_filter;
mod surface;
mod temporal_blend;
mod utils;

pub use self::cache::*;
pub use self::checkerboard::*;
pub use self::disocclusion_blur::*;
pub use self::local_stats::*;
pub use self::normal::*;
pub use self::params::*;
pub use self::raw_sample::*;
pub use self::reprojection::*;
pub use self::spatial_filter::*;
pub use self::surface::*;
pub use self::temporal_blend::*;
pub use self::utils::*;

pub mod prelude {
    pub use spirv_std::glam::*;
    #[cfg(target_arch = "spirv")]
    pub use spirv_std::num_traits::Float;
    pub use spirv_std::{spirv, Image};

    pub use crate::*;
}

pub const UMBRA_EPSILON: f32 = 0.0001;
