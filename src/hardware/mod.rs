//! Hardware profile — the snapshot every compatibility decision starts from.
//!
//! The profile mirrors the shape the frontend's hardware probe reports
//! (camelCase JSON), so it can be supplied either by [`probe_hardware`] or
//! deserialized straight from the UI. Missing fields default to zero/empty.

mod probe;

pub use probe::probe_hardware;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CpuInfo {
    pub manufacturer: String,
    pub model: String,
    pub threads: u32,
    pub max_frequency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GpuInfo {
    pub manufacturer: String,
    pub model: String,
    pub vram_mb: u64,
    pub supports_cuda: bool,
    pub supports_vulkan: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RamInfo {
    pub size_mb: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OsInfo {
    pub name: String,
    pub version: String,
}

/// Read-only snapshot of the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareProfile {
    pub cpu: CpuInfo,
    pub gpu: GpuInfo,
    pub ram: RamInfo,
    pub os: OsInfo,
}

/// Operating system family, as used by runtime catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Macos,
    Unknown,
}

impl Platform {
    /// Classify a free-form OS name ("Windows 11 Pro", "Ubuntu 24.04", "Darwin").
    pub fn from_os_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("windows") {
            Platform::Windows
        } else if ["linux", "fedora", "arch", "debian", "ubuntu"]
            .iter()
            .any(|distro| lower.contains(distro))
        {
            Platform::Linux
        } else if lower.contains("mac") || lower.contains("darwin") {
            Platform::Macos
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Unknown => "unknown",
        }
    }
}

/// Coarse Apple Silicon performance class, from the chip name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppleTier {
    Base,
    Medium,
    High,
}

static APPLE_CHIP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"m[1-3]").unwrap());
static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]").unwrap());

impl HardwareProfile {
    /// System RAM in whole GB, rounded up.
    pub fn ram_gb(&self) -> u64 {
        self.ram.size_mb.div_ceil(1024)
    }

    /// GPU memory in whole GB, rounded up.
    pub fn vram_gb(&self) -> u64 {
        self.gpu.vram_mb.div_ceil(1024)
    }

    pub fn cpu_threads(&self) -> u32 {
        self.cpu.threads
    }

    pub fn platform(&self) -> Platform {
        Platform::from_os_name(&self.os.name)
    }

    pub fn is_apple_silicon(&self) -> bool {
        self.cpu.manufacturer == "Apple" && APPLE_CHIP.is_match(&self.cpu.model.to_lowercase())
    }

    /// `None` on anything that is not Apple Silicon.
    pub fn apple_tier(&self) -> Option<AppleTier> {
        if !self.is_apple_silicon() {
            return None;
        }
        let chip = self.cpu.model.to_lowercase();
        let tier = if chip.contains("ultra") || chip.contains("max") {
            AppleTier::High
        } else if chip.contains("pro") {
            AppleTier::Medium
        } else {
            AppleTier::Base
        };
        Some(tier)
    }

    /// Total RAM in GB for display and adaptive settings; `None` until probed.
    pub fn ram_gb_reading(&self) -> Option<u64> {
        (self.ram.size_mb > 0).then(|| self.ram_gb())
    }

    /// Raw VRAM reading in MB; `None` when no dedicated memory was reported.
    pub fn vram_mb_reading(&self) -> Option<u64> {
        (self.gpu.vram_mb > 0).then_some(self.gpu.vram_mb)
    }
}

/// Canonical form for GPU model and vendor strings: lowercase, AMD aliases
/// collapsed to "amd", everything but `[a-z0-9]` removed.
pub fn normalize_gpu_name(raw: &str) -> String {
    let lower = raw
        .to_lowercase()
        .replace("authenticamd", "amd")
        .replace("advanced micro devices", "amd");
    NON_ALPHANUMERIC.replace_all(&lower, "").into_owned()
}


#[cfg(test)]
mod tests {
    use super::fixtures::{mac, pc};
    use super::*;

    #[test]
    fn memory_rounds_up_to_whole_gb() {
        let hw = pc(16_000, 7_900, 8);
        assert_eq!(hw.ram_gb(), 16);
        assert_eq!(hw.vram_gb(), 8);
        assert_eq!(pc(16_385, 0, 8).ram_gb(), 17);
        assert_eq!(pc(0, 0, 8).ram_gb(), 0);
    }

    #[test]
    fn platform_from_os_name() {
        assert_eq!(Platform::from_os_name("Windows 11 Pro"), Platform::Windows);
        assert_eq!(Platform::from_os_name("Ubuntu 24.04 LTS"), Platform::Linux);
        assert_eq!(Platform::from_os_name("Fedora Linux 40"), Platform::Linux);
        assert_eq!(Platform::from_os_name("Arch Linux"), Platform::Linux);
        assert_eq!(Platform::from_os_name("macOS Sonoma"), Platform::Macos);
        assert_eq!(Platform::from_os_name("Darwin"), Platform::Macos);
        assert_eq!(Platform::from_os_name("Detecting..."), Platform::Unknown);
        assert_eq!(Platform::from_os_name(""), Platform::Unknown);
    }

    #[test]
    fn apple_silicon_requires_vendor_and_chip() {
        assert!(mac("Apple M2 Pro", 32_768).is_apple_silicon());
        assert!(mac("M1", 8_192).is_apple_silicon());
        assert!(!mac("Intel Core i9", 32_768).is_apple_silicon());
        assert!(!pc(32_768, 0, 8).is_apple_silicon());
    }

    #[test]
    fn apple_tier_from_chip_name() {
        assert_eq!(mac("Apple M1", 8_192).apple_tier(), Some(AppleTier::Base));
        assert_eq!(mac("Apple M2 Pro", 16_384).apple_tier(), Some(AppleTier::Medium));
        assert_eq!(mac("Apple M3 Max", 65_536).apple_tier(), Some(AppleTier::High));
        assert_eq!(mac("Apple M1 Ultra", 131_072).apple_tier(), Some(AppleTier::High));
        assert_eq!(pc(32_768, 8_192, 8).apple_tier(), None);
    }

    #[test]
    fn normalizes_gpu_names() {
        assert_eq!(normalize_gpu_name("NVIDIA GeForce RTX 4070"), "nvidiageforcertx4070");
        assert_eq!(normalize_gpu_name("AuthenticAMD"), "amd");
        assert_eq!(
            normalize_gpu_name("Advanced Micro Devices, Inc. [AMD/ATI]"),
            "amdincamdati"
        );
        assert_eq!(normalize_gpu_name("Radeon RX 7900 XTX"), "radeonrx7900xtx");
        assert_eq!(normalize_gpu_name("Any AMD"), "anyamd");
    }

    #[test]
    fn deserializes_probe_shape_with_defaults() {
        let json = r#"{
            "cpu": {"manufacturer": "GenuineIntel", "model": "i7-12700K", "threads": 20, "maxFrequency": 5.0},
            "gpu": {"manufacturer": "NVIDIA", "model": "RTX 3060", "vramMb": 12288, "supportsCuda": true},
            "ram": {"sizeMb": 32768},
            "os": {"name": "Windows 11"}
        }"#;
        let hw: HardwareProfile = serde_json::from_str(json).unwrap();
        assert_eq!(hw.cpu.threads, 20);
        assert_eq!(hw.vram_gb(), 12);
        assert!(hw.gpu.supports_cuda);
        assert!(!hw.gpu.supports_vulkan);
        assert_eq!(hw.os.version, "");
        assert_eq!(hw.platform(), Platform::Windows);
    }

    #[test]
    fn readings_are_none_until_probed() {
        let hw = HardwareProfile::default();
        assert_eq!(hw.ram_gb_reading(), None);
        assert_eq!(hw.vram_mb_reading(), None);
        let hw = pc(16_384, 8_192, 8);
        assert_eq!(hw.ram_gb_reading(), Some(16));
        assert_eq!(hw.vram_mb_reading(), Some(8_192));
    }
}
