use glam::{ivec2, vec4, IVec2, UVec2, Vec4};

use crate::{Checkerboard, DenoiserParams, F32Ext, RawSample, TexRgba32};

/// Mean and variance of raw AO samples around a pixel.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct LocalStats {
    pub mean: f32,
    pub variance: f32,
}

impl LocalStats {
    pub fn std_dev(&self) -> f32 {
        self.variance.safe_sqrt()
    }

    /// Second raw moment, `E[x²]`.
    pub fn squared_mean(&self) -> f32 {
        self.variance + self.mean.sqr()
    }

    pub fn serialize(&self) -> Vec4 {
        vec4(self.mean, self.variance, 0.0, 0.0)
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self {
            mean: d0.x,
            variance: d0.y,
        }
    }
}

#[derive(Clone, Copy)]
pub struct LocalStatsMap<'a> {
    tex: TexRgba32<'a>,
}

impl<'a> LocalStatsMap<'a> {
    pub fn new(tex: TexRgba32<'a>) -> Self {
        Self { tex }
    }

    pub fn get(&self, screen_pos: UVec2) -> LocalStats {
        LocalStats::deserialize(self.tex.read(screen_pos))
    }

    pub fn set(&self, screen_pos: UVec2, stats: &LocalStats) {
        unsafe {
            self.tex.write(screen_pos, stats.serialize());
        }
    }
}

/// Computes mean and variance of raw samples within a square window around
/// given pixel; the window is clamped at screen edges.
///
/// Under checkerboard sampling only active pixels contribute and the window
/// spans twice as many rows, so that it sees roughly the same number of
/// samples; pixels that are inactive themselves are left for [`fill_in()`]
/// and get zeroed stats here.
pub fn local_stats(
    params: &DenoiserParams,
    checkerboard: Checkerboard,
    screen_pos: UVec2,
    raw: impl Fn(UVec2) -> RawSample,
) -> LocalStats {
    if !checkerboard.is_active(screen_pos) {
        return Default::default();
    }

    let radius = params.local_window_radius as i32;

    let radius_y = if checkerboard.is_enabled() {
        2 * radius
    } else {
        radius
    };

    let center = screen_pos.as_ivec2();
    let mut offset = ivec2(-radius, -radius_y);
    let mut sum = 0.0;
    let mut squared_sum = 0.0;
    let mut count = 0.0;

    loop {
        let pos = center + offset;

        if params.contains(pos) {
            let pos = pos.as_uvec2();
            let sample = raw(pos);
            let weight = checkerboard.activity(pos);

            if sample.is_valid() && weight > 0.0 {
                sum += weight * sample.ao;
                squared_sum += weight * sample.ao.sqr();
                count += weight;
            }
        }

        offset.x += 1;

        if offset.x > radius {
            offset.x = -radius;
            offset.y += 1;

            if offset.y > radius_y {
                break;
            }
        }
    }

    if count <= 0.0 {
        return Default::default();
    }

    let mean = sum / count;

    LocalStats {
        mean,
        variance: (squared_sum / count - mean.sqr()).max(0.0),
    }
}

/// Reconstructs stats of pixels that weren't sampled this frame by averaging
/// their up/down/left/right neighbours (which, in a checkerboard, all are
/// active); active pixels are passed through.
pub fn fill_in(
    params: &DenoiserParams,
    checkerboard: Checkerboard,
    screen_pos: UVec2,
    stats: impl Fn(UVec2) -> LocalStats,
) -> LocalStats {
    if checkerboard.is_active(screen_pos) {
        return stats(screen_pos);
    }

    let center = screen_pos.as_ivec2();
    let mut mean = 0.0;
    let mut variance = 0.0;
    let mut count = 0.0;
    let mut neighbour_idx = 0;

    while neighbour_idx < 4 {
        let pos = center + cross_offset(neighbour_idx);

        if params.contains(pos) {
            let neighbour = stats(pos.as_uvec2());

            mean += neighbour.mean;
            variance += neighbour.variance;
            count += 1.0;
        }

        neighbour_idx += 1;
    }

    if count <= 0.0 {
        return stats(screen_pos);
    }

    LocalStats {
        mean: mean / count,
        variance: variance / count,
    }
}

fn cross_offset(idx: u32) -> IVec2 {
    match idx {
        0 => ivec2(0, -1),
        1 => ivec2(-1, 0),
        2 => ivec2(1, 0),
        _ => ivec2(0, 1),
    }
}
