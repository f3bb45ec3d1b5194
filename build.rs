//! Build script for Resuma.
//!
//! Only the `desktop` feature needs a build step: tauri-build generates the
//! Tauri context from `tauri.conf.json`. The core library has no build step.

fn main() {
    println!("cargo:rerun-if-changed=data/models.json");
    println!("cargo:rerun-if-changed=data/runtimes.json");

    #[cfg(feature = "desktop")]
    tauri_build::build();
}
