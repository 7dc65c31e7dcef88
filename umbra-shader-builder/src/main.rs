use std::env;
use std::error::Error;
use std::path::Path;

use spirv_builder::{MetadataPrintout, SpirvBuilder};

fn main() -> Result<(), Box<dyn Error>> {
    let shaders_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .ok_or("shader builder must live inside the workspace")?
        .join("umbra-shaders");

    let compiled = SpirvBuilder::new(shaders_dir, "spirv-unknown-spv1.3")
        .multimodule(true)
        .print_metadata(MetadataPrintout::DependencyOnly)
        .extra_arg("--spirt-passes=reduce,fuse_selects")
        .build()?;

    for (entry_point, path) in compiled.module.unwrap_multi() {
        let id = shader_id(entry_point);

        export(&id, "path", &path.display().to_string());
        export(&id, "entry_point", entry_point);
    }

    Ok(())
}

/// `local_stats::fill_in` -> `local_stats_fill_in`, `reprojection::main` ->
/// `reprojection`.
fn shader_id(entry_point: &str) -> String {
    let id = entry_point.replace("::", "_");

    match id.strip_suffix("_main") {
        Some(id) => id.to_owned(),
        None => id,
    }
}

/// Exposes a value to `umbra` through `env!("umbra_shaders::<id>.<key>")`.
fn export(id: &str, key: &str, value: &str) {
    println!("cargo:rustc-env=umbra_shaders::{id}.{key}={value}");
}
