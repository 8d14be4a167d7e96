//! This build script generates the face configuration constants from
//! `config/face_config.json` and, for the firmware, copies the `memory.x`
//! file from the crate root into a directory where the linker can always
//! find it at build time.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::print_stdout)]

use serde::Deserialize;
use std::{
    env, fs,
    fs::File,
    io,
    io::Write,
    path::{Path, PathBuf},
};

/// The face configuration as read from `config/face_config.json`
#[derive(Deserialize)]
#[serde(default)]
struct FaceConfigFile {
    /// Show times in 24-hour format
    clock_24h: bool,
    /// Emit a feedback request when settings entry is refused
    blocked_feedback: bool,
    /// Playback volume of the sound module
    volume: u8,
}

impl Default for FaceConfigFile {
    fn default() -> Self {
        Self {
            clock_24h: true,
            blocked_feedback: false,
            volume: 13,
        }
    }
}

fn main() {
    face_config().unwrap();
    if env::var_os("CARGO_FEATURE_FIRMWARE").is_some() {
        memory_x();
    }
}

/// Generate `face_config.rs` from `face_config.json`
fn face_config() -> io::Result<()> {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR environment variable not set");
    let dest_path = Path::new(&out_dir).join("face_config.rs");
    let mut f = File::create(dest_path)?;

    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR environment variable not set");
    let config_path = Path::new(&manifest_dir).join("config/face_config.json");
    println!("cargo:rerun-if-changed={}", config_path.display());

    // a missing file is fine, the defaults are used then
    let config = if config_path.exists() {
        let contents = fs::read_to_string(&config_path)?;
        serde_json::from_str::<FaceConfigFile>(&contents).expect("Could not parse face_config.json file")
    } else {
        println!("face_config.json not found, using defaults");
        FaceConfigFile::default()
    };

    writeln!(f, "/// Show times in 24-hour format")?;
    writeln!(f, "pub const CLOCK_24H: bool = {};", config.clock_24h)?;
    writeln!(f, "/// Emit a feedback request when settings entry is refused")?;
    writeln!(f, "pub const BLOCKED_FEEDBACK: bool = {};", config.blocked_feedback)?;
    writeln!(f, "/// Playback volume of the sound module")?;
    writeln!(f, "pub const VOLUME: u8 = {};", config.volume)?;
    Ok(())
}

/// Handle the `memory.x` linker script
fn memory_x() {
    // Put `memory.x` in our output directory and ensure it's
    // on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    // By specifying `memory.x` here, we ensure the build script is only
    // re-run when `memory.x` is changed.
    println!("cargo:rerun-if-changed=memory.x");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
