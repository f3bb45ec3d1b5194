//! Runtime compatibility — is this backend known to work on this GPU?
//!
//! Rules, first match wins:
//! 1. Platform mismatch is a hard veto.
//! 2. CPU builds always work.
//! 3. CUDA and Vulkan follow the probe's driver detection.
//! 4. Other backends (HIP, Metal, ...) consult the entry's GPU list: direct
//!    model match first, then "Any NVIDIA/AMD/Intel" vendor wildcards.

use serde::{Deserialize, Serialize};

use crate::catalog::{CompatibleGpu, RuntimeDescriptor};
use crate::hardware::{normalize_gpu_name, HardwareProfile, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeStatus {
    Confirmed,
    Unknown,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeCompatibility {
    pub runtime: RuntimeDescriptor,
    pub status: RuntimeStatus,
}

/// Normalized wildcard pattern → vendor substring it stands for.
const VENDOR_WILDCARDS: &[(&str, &str)] = &[
    ("anynvidia", "nvidia"),
    ("anyamd", "amd"),
    ("anyintel", "intel"),
];

struct Host {
    platform: Platform,
    gpu_model: String,
    gpu_vendor: String,
    supports_cuda: bool,
    supports_vulkan: bool,
}

impl Host {
    fn from_profile(hw: &HardwareProfile) -> Self {
        Self {
            platform: hw.platform(),
            gpu_model: normalize_gpu_name(&hw.gpu.model),
            gpu_vendor: normalize_gpu_name(&hw.gpu.manufacturer),
            supports_cuda: hw.gpu.supports_cuda,
            supports_vulkan: hw.gpu.supports_vulkan,
        }
    }
}

fn confirmed_if(supported: bool) -> RuntimeStatus {
    if supported {
        RuntimeStatus::Confirmed
    } else {
        RuntimeStatus::Unsupported
    }
}

/// Direct match: equal, or either name contains the other. An empty name on
/// either side never matches.
fn direct_match<'a>(gpus: &'a [CompatibleGpu], host: &Host) -> Option<&'a CompatibleGpu> {
    if host.gpu_model.is_empty() {
        return None;
    }
    gpus.iter().find(|gpu| {
        let pattern = normalize_gpu_name(&gpu.model);
        !pattern.is_empty()
            && (pattern == host.gpu_model
                || pattern.contains(&host.gpu_model)
                || host.gpu_model.contains(&pattern))
    })
}

fn wildcard_match<'a>(gpus: &'a [CompatibleGpu], host: &Host) -> Option<&'a CompatibleGpu> {
    gpus.iter().find(|gpu| {
        let pattern = normalize_gpu_name(&gpu.model);
        VENDOR_WILDCARDS
            .iter()
            .any(|(wildcard, vendor)| pattern == *wildcard && host.gpu_vendor.contains(vendor))
    })
}

fn status_for(runtime: &RuntimeDescriptor, host: &Host) -> RuntimeStatus {
    if runtime.platform != host.platform.as_str() {
        return RuntimeStatus::Unsupported;
    }
    match runtime.backend.as_str() {
        "cpu" => RuntimeStatus::Confirmed,
        "cuda" => confirmed_if(host.supports_cuda),
        "vulkan" => confirmed_if(host.supports_vulkan),
        _ => direct_match(&runtime.compatible_gpus, host)
            .or_else(|| wildcard_match(&runtime.compatible_gpus, host))
            .map_or(RuntimeStatus::Unsupported, |gpu| gpu.status),
    }
}

/// Classify every runtime in the catalog for this host, preserving order.
pub fn resolve_runtimes(
    catalog: &[RuntimeDescriptor],
    hw: &HardwareProfile,
) -> Vec<RuntimeCompatibility> {
    let host = Host::from_profile(hw);

    let verdicts: Vec<RuntimeCompatibility> = catalog
        .iter()
        .map(|runtime| RuntimeCompatibility {
            status: status_for(runtime, &host),
            runtime: runtime.clone(),
        })
        .collect();

    log::debug!(
        "[COMPAT] Runtimes: platform={} gpu='{}' vendor='{}' -> {} confirmed of {}",
        host.platform.as_str(),
        host.gpu_model,
        host.gpu_vendor,
        verdicts
            .iter()
            .filter(|v| v.status == RuntimeStatus::Confirmed)
            .count(),
        verdicts.len()
    );

    verdicts
}
