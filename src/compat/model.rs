//! Model compatibility — can this model run here, and on which device?
//!
//! Two rule sets, both expressed as ordered tables scanned once:
//!
//! - **Apple Silicon**: unified memory, so only RAM matters. Each chip tier
//!   has a list of `(max parameters, min RAM)` brackets; the first bracket
//!   whose ceiling and floor both hold decides the status.
//! - **Everything else**: one bucket per supported parameter count with its
//!   own VRAM threshold for GPU offload and a RAM rule for CPU inference.
//!   Parameter counts outside the buckets are unsupported.

use serde::{Deserialize, Serialize};

use crate::catalog::ModelDescriptor;
use crate::hardware::{AppleTier, HardwareProfile};

/// Where a model can run. Ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Unsupported,
    Cpu,
    Gpu,
}

/// Verdict for one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCompatibility {
    pub model: ModelDescriptor,
    pub status: ModelStatus,
}

struct AppleBracket {
    max_params: f64,
    min_ram_gb: u64,
    status: ModelStatus,
}

const fn bracket(max_params: f64, min_ram_gb: u64, status: ModelStatus) -> AppleBracket {
    AppleBracket {
        max_params,
        min_ram_gb,
        status,
    }
}

const APPLE_HIGH: &[AppleBracket] = &[
    bracket(32.0, 64, ModelStatus::Gpu),
    bracket(14.0, 32, ModelStatus::Gpu),
    bracket(7.0, 16, ModelStatus::Gpu),
    bracket(4.0, 8, ModelStatus::Gpu),
    bracket(1.7, 8, ModelStatus::Gpu),
    bracket(0.6, 0, ModelStatus::Cpu),
];

const APPLE_MEDIUM: &[AppleBracket] = &[
    bracket(14.0, 32, ModelStatus::Gpu),
    bracket(7.0, 16, ModelStatus::Gpu),
    bracket(4.0, 8, ModelStatus::Gpu),
    bracket(1.7, 8, ModelStatus::Cpu),
    bracket(0.6, 0, ModelStatus::Cpu),
];

const APPLE_BASE: &[AppleBracket] = &[
    bracket(4.0, 8, ModelStatus::Gpu),
    bracket(1.7, 8, ModelStatus::Cpu),
    bracket(0.6, 0, ModelStatus::Cpu),
];

fn apple_brackets(tier: AppleTier) -> &'static [AppleBracket] {
    match tier {
        AppleTier::High => APPLE_HIGH,
        AppleTier::Medium => APPLE_MEDIUM,
        AppleTier::Base => APPLE_BASE,
    }
}

/// When a model that does not fit in VRAM may still run on the CPU.
enum CpuRule {
    Ram(u64),
    /// Partial offload lowers the RAM requirement once VRAM reaches a floor.
    RamByVram {
        vram_gb: u64,
        ram_gb_with: u64,
        ram_gb_without: u64,
    },
    RamAndThreads {
        ram_gb: u64,
        threads: u32,
    },
    Always,
}

struct ParameterBucket {
    params: f64,
    gpu_vram_gb: u64,
    cpu: CpuRule,
}

const BUCKETS: &[ParameterBucket] = &[
    ParameterBucket {
        params: 32.0,
        gpu_vram_gb: 20,
        cpu: CpuRule::RamByVram {
            vram_gb: 16,
            ram_gb_with: 32,
            ram_gb_without: 64,
        },
    },
    ParameterBucket {
        params: 14.0,
        gpu_vram_gb: 12,
        cpu: CpuRule::RamByVram {
            vram_gb: 8,
            ram_gb_with: 16,
            ram_gb_without: 32,
        },
    },
    ParameterBucket {
        params: 8.0,
        gpu_vram_gb: 8,
        cpu: CpuRule::Ram(16),
    },
    ParameterBucket {
        params: 4.0,
        gpu_vram_gb: 6,
        cpu: CpuRule::Ram(16),
    },
    ParameterBucket {
        params: 1.7,
        gpu_vram_gb: 4,
        cpu: CpuRule::RamAndThreads {
            ram_gb: 8,
            threads: 16,
        },
    },
    ParameterBucket {
        params: 0.6,
        gpu_vram_gb: 4,
        cpu: CpuRule::Always,
    },
];

/// Hardware facts the rules read, computed once per resolution.
struct Host {
    ram_gb: u64,
    vram_gb: u64,
    threads: u32,
    apple_tier: Option<AppleTier>,
}

impl Host {
    fn from_profile(hw: &HardwareProfile) -> Self {
        Self {
            ram_gb: hw.ram_gb(),
            vram_gb: hw.vram_gb(),
            threads: hw.cpu_threads(),
            apple_tier: hw.apple_tier(),
        }
    }
}

impl CpuRule {
    fn allows(&self, host: &Host) -> bool {
        match *self {
            CpuRule::Ram(ram_gb) => host.ram_gb >= ram_gb,
            CpuRule::RamByVram {
                vram_gb,
                ram_gb_with,
                ram_gb_without,
            } => {
                let needed = if host.vram_gb >= vram_gb {
                    ram_gb_with
                } else {
                    ram_gb_without
                };
                host.ram_gb >= needed
            }
            CpuRule::RamAndThreads { ram_gb, threads } => {
                host.ram_gb >= ram_gb && host.threads >= threads
            }
            CpuRule::Always => true,
        }
    }
}

fn apple_status(tier: AppleTier, params: Option<f64>, host: &Host) -> ModelStatus {
    let Some(params) = params else {
        return ModelStatus::Unsupported;
    };
    apple_brackets(tier)
        .iter()
        .find(|b| params <= b.max_params && host.ram_gb >= b.min_ram_gb)
        .map_or(ModelStatus::Unsupported, |b| b.status)
}

fn bucket_status(params: Option<f64>, host: &Host) -> ModelStatus {
    let Some(bucket) = params.and_then(|p| BUCKETS.iter().find(|b| b.params == p)) else {
        return ModelStatus::Unsupported;
    };
    if host.vram_gb >= bucket.gpu_vram_gb {
        ModelStatus::Gpu
    } else if bucket.cpu.allows(host) {
        ModelStatus::Cpu
    } else {
        ModelStatus::Unsupported
    }
}

fn status_for(model: &ModelDescriptor, host: &Host) -> ModelStatus {
    let params = model.parameter_count();
    match host.apple_tier {
        Some(tier) => apple_status(tier, params, host),
        None => bucket_status(params, host),
    }
}

/// Classify every model in the catalog for this host, preserving order.
pub fn resolve_models(catalog: &[ModelDescriptor], hw: &HardwareProfile) -> Vec<ModelCompatibility> {
    let host = Host::from_profile(hw);

    let verdicts: Vec<ModelCompatibility> = catalog
        .iter()
        .map(|model| ModelCompatibility {
            status: status_for(model, &host),
            model: model.clone(),
        })
        .collect();

    log::debug!(
        "[COMPAT] Models: ram={}GB vram={}GB threads={} apple={:?} -> {} gpu / {} cpu / {} unsupported",
        host.ram_gb,
        host.vram_gb,
        host.threads,
        host.apple_tier,
        verdicts.iter().filter(|v| v.status == ModelStatus::Gpu).count(),
        verdicts.iter().filter(|v| v.status == ModelStatus::Cpu).count(),
        verdicts.iter().filter(|v| v.status == ModelStatus::Unsupported).count(),
    );

    verdicts
}
