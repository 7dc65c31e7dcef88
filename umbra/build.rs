use std::error::Error;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::{env, process};

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_SHADERS").is_none() {
        return Ok(());
    }

    println!("cargo:rerun-if-changed=../umbra-shader-builder/Cargo.toml");
    println!("cargo:rerun-if-changed=../umbra-shader-builder/src/main.rs");

    let builder_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?)
        .join("..")
        .join("umbra-shader-builder");

    let target_dir = PathBuf::from(env::var("OUT_DIR")?).join("shader-builder");

    // The builder pins its own toolchain, so make sure ours doesn't leak into
    // it; its stdout carries `cargo:rustc-env` lines meant for this crate
    let status = Command::new("cargo")
        .args(["run", "--release", "--target-dir"])
        .arg(target_dir)
        .current_dir(builder_dir)
        .env_remove("CARGO_ENCODED_RUSTFLAGS")
        .env_remove("RUSTC")
        .env_remove("RUSTUP_TOOLCHAIN")
        .stderr(Stdio::inherit())
        .stdout(Stdio::inherit())
        .status()?;

    if !status.success() {
        process::exit(status.code().unwrap_or(1));
    }

    Ok(())
}
