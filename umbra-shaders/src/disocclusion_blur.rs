use umbra_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] pass: &DisocclusionBlurPassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] params: &DenoiserParams,
    #[spirv(descriptor_set = 0, binding = 1)] surface_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] confidence: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 0)] input: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 1)] output: TexRgba32,
) {
    let screen_pos = global_id.xy();
    let surface_map = SurfaceMap::new(surface_map);
    let confidence = ConfidenceMap::new(confidence);

    if !params.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let out = disocclusion_blur(
        params,
        pass,
        screen_pos,
        surface_map.get(screen_pos),
        input.read(screen_pos).x,
        confidence.get(screen_pos).blur_strength,
        |pos| (input.read(pos).x, surface_map.get(pos)),
    );

    unsafe {
        output.write(screen_pos, vec4(out, 0.0, 0.0, 0.0));
    }
}
