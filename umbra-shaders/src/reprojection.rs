use umbra_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] params: &DenoiserParams,
    #[spirv(descriptor_set = 0, binding = 1)] surface_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] prev_surface_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 3)] motion_map: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 0)] prev_cache: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 1)] cache: TexRgba32,
) {
    let screen_pos = global_id.xy();
    let surface_map = SurfaceMap::new(surface_map);
    let prev_surface_map = SurfaceMap::new(prev_surface_map);
    let prev_cache = CacheMap::new(prev_cache);
    let cache = CacheMap::new(cache);

    if !params.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let surface = surface_map.get(screen_pos);

    let depth_gradient =
        depth_gradient(params, screen_pos, |pos| surface_map.get(pos).depth);

    let reprojection = reproject(
        params,
        screen_pos,
        surface,
        depth_gradient,
        motion_map.read(screen_pos).xy(),
        |pos| prev_surface_map.get(pos),
    );

    let entry = resample(params, reprojection, |pos| prev_cache.get(pos));

    cache.set(screen_pos, &entry);
}
