//! Best-effort host probe.
//!
//! CPU, RAM and OS come from sysinfo. GPU name and VRAM come from
//! `nvidia-smi` when it is on PATH; Apple Silicon reports its integrated GPU
//! with unified memory. CUDA/Vulkan support is detected by trying to load the
//! driver libraries. Nothing here fails: missing facts stay zero/empty and
//! the resolvers degrade to `unsupported`.

use std::process::Command;

use sysinfo::System;

use super::{CpuInfo, GpuInfo, HardwareProfile, OsInfo, RamInfo};

#[cfg(target_os = "windows")]
const CUDA_LIBRARIES: &[&str] = &["nvcuda.dll"];
#[cfg(target_os = "windows")]
const VULKAN_LIBRARIES: &[&str] = &["vulkan-1.dll"];

#[cfg(target_os = "macos")]
const CUDA_LIBRARIES: &[&str] = &[];
#[cfg(target_os = "macos")]
const VULKAN_LIBRARIES: &[&str] = &[];

#[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
const CUDA_LIBRARIES: &[&str] = &["libcuda.so.1", "libcuda.so"];
#[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
const VULKAN_LIBRARIES: &[&str] = &["libvulkan.so.1"];

/// Probe the current machine.
pub fn probe_hardware() -> HardwareProfile {
    let mut sys = System::new_all();
    sys.refresh_memory();
    sys.refresh_cpu();

    let cpu = sys
        .cpus()
        .first()
        .map(|c| CpuInfo {
            manufacturer: c.vendor_id().to_string(),
            model: c.brand().trim().to_string(),
            threads: sys.cpus().len() as u32,
            max_frequency: c.frequency() as f64 / 1000.0,
        })
        .unwrap_or_default();

    let ram = RamInfo {
        size_mb: sys.total_memory() / (1024 * 1024),
    };

    let os = OsInfo {
        name: System::long_os_version()
            .or_else(System::name)
            .unwrap_or_default(),
        version: System::os_version().unwrap_or_default(),
    };

    let mut gpu = probe_gpu(&cpu, &ram);
    gpu.supports_cuda = any_library_loads(CUDA_LIBRARIES);
    gpu.supports_vulkan = any_library_loads(VULKAN_LIBRARIES);

    log::info!(
        "[PROBE] cpu='{}' threads={} ram={}MB gpu='{}' vram={}MB cuda={} vulkan={} os='{}'",
        cpu.model,
        cpu.threads,
        ram.size_mb,
        gpu.model,
        gpu.vram_mb,
        gpu.supports_cuda,
        gpu.supports_vulkan,
        os.name
    );

    HardwareProfile { cpu, gpu, ram, os }
}

fn probe_gpu(cpu: &CpuInfo, ram: &RamInfo) -> GpuInfo {
    if let Some((model, vram_mb)) = query_nvidia_smi() {
        return GpuInfo {
            manufacturer: "NVIDIA".to_string(),
            model,
            vram_mb,
            ..GpuInfo::default()
        };
    }

    // Unified memory: the integrated GPU can address all of system RAM.
    if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
        return GpuInfo {
            manufacturer: "Apple".to_string(),
            model: cpu.model.clone(),
            vram_mb: ram.size_mb,
            ..GpuInfo::default()
        };
    }

    GpuInfo::default()
}

fn query_nvidia_smi() -> Option<(String, u64)> {
    let smi = which::which("nvidia-smi").ok()?;
    let mut cmd = Command::new(smi);
    cmd.args([
        "--query-gpu=name,memory.total",
        "--format=csv,noheader,nounits",
    ]);
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW
    }
    let out = cmd.output().ok()?;
    if !out.status.success() {
        log::debug!("[PROBE] nvidia-smi exited with {}", out.status);
        return None;
    }
    parse_nvidia_smi(&String::from_utf8_lossy(&out.stdout))
}

/// Pick the GPU with the most memory from `name, memory.total` CSV rows.
fn parse_nvidia_smi(output: &str) -> Option<(String, u64)> {
    output
        .lines()
        .filter_map(|line| {
            let (name, mem) = line.rsplit_once(',')?;
            let mb = mem.trim().parse::<u64>().ok()?;
            Some((name.trim().to_string(), mb))
        })
        .filter(|(_, mb)| *mb > 0)
        .max_by_key(|(_, mb)| *mb)
}

fn any_library_loads(candidates: &[&str]) -> bool {
    candidates.iter().any(|name| {
        // Safety: loading a vendor driver runs its initialisers; these are the
        // same libraries the inference runtime loads later, and the handle is
        // dropped immediately.
        unsafe { libloading::Library::new(name) }.is_ok()
    })
}
