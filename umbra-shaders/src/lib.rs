#![cfg_attr(target_arch = "spirv", no_std)]

pub mod disocclusion_blur;
pub mod local_stats;
pub mod reprojection;
pub mod spatial_filter;
pub mod temporal_blend;
