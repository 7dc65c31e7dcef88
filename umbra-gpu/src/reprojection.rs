use glam::{vec2, UVec2, Vec2};

use crate::{BilinearFilter, CacheEntry, DenoiserParams, Surface};

/// Location of the current pixel's surface in the previous frame.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct Reprojection {
    /// Previous position, in pixels (texel centers at `n + 0.5`)
    pub prev_x: f32,
    pub prev_y: f32,

    /// Which texels of the 2x2 footprint around the previous position have
    /// passed the geometry test; see [`BilinearFilter::tap()`]
    pub validity: u32,
}

impl Reprojection {
    pub fn is_some(&self) -> bool {
        self.validity != 0
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    pub fn prev_pos(&self) -> Vec2 {
        vec2(self.prev_x, self.prev_y)
    }

    pub fn filter(&self) -> BilinearFilter {
        BilinearFilter::new(self.prev_pos())
    }
}

/// Locates the current pixel in the previous frame and checks which of the
/// surrounding texels still show the same surface.
///
/// `motion` is the screen-space motion of the pixel, in pixels, from the
/// previous frame into the current one; `past_surface` reads the geometry
/// cached together with the history.
pub fn reproject(
    params: &DenoiserParams,
    screen_pos: UVec2,
    surface: Surface,
    depth_gradient: Vec2,
    motion: Vec2,
    past_surface: impl Fn(UVec2) -> Surface,
) -> Reprojection {
    if surface.is_sky() {
        return Default::default();
    }

    let prev_pos = screen_pos.as_vec2() + 0.5 - motion;
    let screen_size = params.screen_size().as_vec2();

    if !(prev_pos.x >= 0.0
        && prev_pos.y >= 0.0
        && prev_pos.x < screen_size.x
        && prev_pos.y < screen_size.y)
    {
        return Default::default();
    }

    let filter = BilinearFilter::new(prev_pos);
    let mut validity = 0;
    let mut tap_idx = 0;

    while tap_idx < 4 {
        let tap = filter.tap(tap_idx);

        if params.contains(tap) {
            let tap_offset = tap.as_vec2() + 0.5 - prev_pos;

            if is_same_surface(
                params,
                surface,
                depth_gradient,
                tap_offset,
                past_surface(tap.as_uvec2()),
            ) {
                validity |= 1 << tap_idx;
            }
        }

        tap_idx += 1;
    }

    Reprojection {
        prev_x: prev_pos.x,
        prev_y: prev_pos.y,
        validity,
    }
}

/// Checks whether `past` (located `offset` pixels away from the exact
/// reprojected position) shows the same surface as `surface`.
///
/// Depth is extrapolated along the local depth gradient and the tolerance
/// grows with the gradient, so that surfaces seen at grazing angles (where
/// depth changes a lot from pixel to pixel) don't get rejected.
///
/// Both comparisons are strict, so a zero threshold rejects everything.
fn is_same_surface(
    params: &DenoiserParams,
    surface: Surface,
    depth_gradient: Vec2,
    offset: Vec2,
    past: Surface,
) -> bool {
    if past.is_sky() {
        return false;
    }

    let expected_depth = surface.depth + depth_gradient.dot(offset);

    let depth_tolerance = params.depth_threshold
        * (surface.depth + depth_gradient.abs().dot(Vec2::ONE));

    let depth_ok = (past.depth - expected_depth).abs() < depth_tolerance;
    let normal_ok = surface.normal.dot(past.normal) > params.normal_threshold;

    depth_ok && normal_ok
}

/// Resamples the previous cache slot at the reprojected position, using only
/// the texels that have passed the geometry test.
///
/// Returns a cold entry (`tspp = 0`, no history) for pixels that couldn't be
/// reprojected; otherwise `tspp` is the smallest count among contributing
/// texels, incremented and capped at `max_tspp`.
pub fn resample(
    params: &DenoiserParams,
    reprojection: Reprojection,
    past_cache: impl Fn(UVec2) -> CacheEntry,
) -> CacheEntry {
    if reprojection.is_none() {
        return Default::default();
    }

    let filter = reprojection.filter();
    let weights = filter.masked_weights(reprojection.validity);

    let mut w_sum = 0.0;
    let mut value = 0.0;
    let mut squared_mean = 0.0;
    let mut hit_distance = 0.0;
    let mut tspp = u32::MAX;
    let mut tap_idx = 0;

    while tap_idx < 4 {
        let weight = weights[tap_idx as usize];

        if weight > 0.0 {
            let entry = past_cache(filter.tap(tap_idx).as_uvec2());

            w_sum += weight;
            value += weight * entry.value;
            squared_mean += weight * entry.squared_mean;
            hit_distance += weight * entry.hit_distance;
            tspp = tspp.min(entry.tspp);
        }

        tap_idx += 1;
    }

    if w_sum <= 0.0 {
        return Default::default();
    }

    CacheEntry {
        tspp: (tspp + 1).min(params.max_tspp),
        value: value / w_sum,
        squared_mean: squared_mean / w_sum,
        hit_distance: hit_distance / w_sum,
    }
}
