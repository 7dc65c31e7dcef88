use umbra_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] checkerboard: &Checkerboard,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] params: &DenoiserParams,
    #[spirv(descriptor_set = 0, binding = 1)] raw_samples: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] stats: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 0)] reprojected: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 1)] cache: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 2)] blended: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 3)] confidence: TexRgba32,
) {
    let screen_pos = global_id.xy();
    let raw_samples = RawSampleMap::new(raw_samples);
    let stats = LocalStatsMap::new(stats);
    let reprojected = CacheMap::new(reprojected);
    let cache = CacheMap::new(cache);
    let confidence = ConfidenceMap::new(confidence);

    if !params.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let out = temporal_blend(
        params,
        raw_samples.get(screen_pos),
        checkerboard.is_active(screen_pos),
        stats.get(screen_pos),
        reprojected.get(screen_pos),
    );

    cache.set(screen_pos, &out.entry);
    confidence.set(screen_pos, &out.confidence);

    unsafe {
        blended.write(screen_pos, vec4(out.entry.value, 0.0, 0.0, 0.0));
    }
}
