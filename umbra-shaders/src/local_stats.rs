use umbra_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] checkerboard: &Checkerboard,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] params: &DenoiserParams,
    #[spirv(descriptor_set = 0, binding = 1)] raw_samples: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 0)] stats: TexRgba32,
) {
    let screen_pos = global_id.xy();
    let raw_samples = RawSampleMap::new(raw_samples);
    let stats = LocalStatsMap::new(stats);

    if !params.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let out = local_stats(params, *checkerboard, screen_pos, |pos| {
        raw_samples.get(pos)
    });

    stats.set(screen_pos, &out);
}

#[spirv(compute(threads(8, 8)))]
pub fn fill_in(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] checkerboard: &Checkerboard,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] params: &DenoiserParams,
    #[spirv(descriptor_set = 1, binding = 0)] raw_stats: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 1)] stats: TexRgba32,
) {
    let screen_pos = global_id.xy();
    let raw_stats = LocalStatsMap::new(raw_stats);
    let stats = LocalStatsMap::new(stats);

    if !params.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let out = umbra_gpu::fill_in(params, *checkerboard, screen_pos, |pos| {
        raw_stats.get(pos)
    });

    stats.set(screen_pos, &out);
}
