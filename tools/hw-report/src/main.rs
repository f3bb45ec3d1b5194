//! Hardware report CLI for Resuma.
//!
//! Probes this machine (or loads a saved profile) and prints the model and
//! runtime verdicts, the recommended pair and the adaptive llama.cpp flags.
//!
//! Usage:
//!   cargo run -- [--json]
//!   cargo run -- --profile <profile.json> [--json]
//!
//! `RESUMA_MODEL_CATALOG` / `RESUMA_RUNTIME_CATALOG` point at alternative
//! catalog files, same as the app.

use std::path::Path;
use std::time::Instant;

use resuma_lib::catalog::load_catalogs;
use resuma_lib::hardware::{probe_hardware, HardwareProfile};
use resuma_lib::report::{assess, CompatibilityReport};

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let as_json = args.iter().any(|a| a == "--json");

    let profile = match args.iter().position(|a| a == "--profile") {
        Some(i) => match args.get(i + 1) {
            Some(path) => load_profile(Path::new(path)),
            None => {
                eprintln!("Usage:");
                eprintln!("  hw-report [--json]");
                eprintln!("  hw-report --profile <profile.json> [--json]");
                std::process::exit(1);
            }
        },
        None => {
            let start = Instant::now();
            let hw = probe_hardware();
            eprintln!("--- Probe took {}ms ---", start.elapsed().as_millis());
            hw
        }
    };

    let (models, runtimes) = load_catalogs();
    let report = assess(models.entries(), runtimes.entries(), &profile);

    if as_json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_report(&report);
    }
}

fn load_profile(path: &Path) -> HardwareProfile {
    let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Cannot read {}: {}", path.display(), e);
        std::process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Invalid profile {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

fn print_report(report: &CompatibilityReport) {
    let hw = &report.hardware;
    println!("--- Hardware ---");
    println!("  OS:    {} {} ({})", hw.os.name, hw.os.version, hw.platform().as_str());
    println!("  CPU:   {} ({} threads)", hw.cpu.model, hw.cpu.threads);
    println!("  RAM:   {} GB", hw.ram_gb());
    println!(
        "  GPU:   {} ({} MB VRAM, cuda={}, vulkan={})",
        hw.gpu.model, hw.gpu.vram_mb, hw.gpu.supports_cuda, hw.gpu.supports_vulkan
    );
    if let Some(tier) = hw.apple_tier() {
        println!("  Apple: {:?}", tier);
    }

    println!("\n--- Models ---");
    for v in &report.models {
        println!("  {:<24} {:>6}  {:?}", v.model.name, v.model.parameters, v.status);
    }

    println!("\n--- Runtimes ---");
    for v in &report.runtimes {
        println!("  {:<24} {:<8} {:?}", v.runtime.name, v.runtime.backend, v.status);
    }

    println!("\n--- Recommendation ---");
    match &report.recommended_model {
        Some(pick) => println!("  Model:   {} on {:?}", pick.model.name, pick.device),
        None => println!("  Model:   none"),
    }
    match &report.recommended_runtime {
        Some(rt) => println!("  Runtime: {}", rt.name),
        None => println!("  Runtime: none"),
    }

    let s = &report.settings;
    println!(
        "  Flags:   ctx={} gpu_layers={} mlock={} no_mmap={}",
        s.ctx_size, s.gpu_layers, s.mlock, s.no_mmap
    );
}
