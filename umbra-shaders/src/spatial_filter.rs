use umbra_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] pass: &SpatialFilterPassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] params: &DenoiserParams,
    #[spirv(descriptor_set = 0, binding = 1)] surface_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] cache: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 3)] confidence: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 0)] input: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 1)] output: TexRgba32,
) {
    let screen_pos = global_id.xy();
    let surface_map = SurfaceMap::new(surface_map);
    let cache = CacheMap::new(cache);
    let confidence = ConfidenceMap::new(confidence);

    if !params.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let depth_gradient =
        depth_gradient(params, screen_pos, |pos| surface_map.get(pos).depth);

    let out = spatial_filter(
        params,
        pass,
        screen_pos,
        surface_map.get(screen_pos),
        depth_gradient,
        input.read(screen_pos).x,
        cache.get(screen_pos).hit_distance,
        confidence.get(screen_pos).variance,
        |pos| (input.read(pos).x, surface_map.get(pos)),
    );

    unsafe {
        output.write(screen_pos, vec4(out, 0.0, 0.0, 0.0));
    }
}
