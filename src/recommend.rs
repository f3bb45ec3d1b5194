//! Recommendation selectors — pick one model and one runtime from the verdicts.
//!
//! Model policy: the largest GPU-capable model; otherwise only the two small
//! CPU-friendly sizes (1.7B, then 0.6B) are ever suggested for CPU inference.
//! Runtime policy: fixed backend priority, catalog order within a backend.

use serde::{Deserialize, Serialize};

use crate::catalog::{ModelDescriptor, RuntimeDescriptor};
use crate::compat::{ModelCompatibility, ModelStatus, RuntimeCompatibility, RuntimeStatus};

/// Device class a recommended model will run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Gpu,
    Cpu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedModel {
    pub model: ModelDescriptor,
    #[serde(rename = "status")]
    pub device: Device,
}

impl RecommendedModel {
    pub fn is_gpu(&self) -> bool {
        self.device == Device::Gpu
    }
}

/// CPU-path sizes, in preference order.
const CPU_SIZES: &[&str] = &["1.7B", "0.6B"];

/// Lower runs first. Unlisted backends sort last.
fn backend_priority(backend: &str) -> u32 {
    match backend {
        "cuda" => 1,
        "hip" => 2,
        "vulkan" => 3,
        "cpu" => 4,
        _ => 999,
    }
}

pub fn select_recommended_model(verdicts: &[ModelCompatibility]) -> Option<RecommendedModel> {
    let mut gpu: Vec<&ModelCompatibility> = verdicts
        .iter()
        .filter(|v| v.status == ModelStatus::Gpu)
        .collect();
    // Stable: equal sizes keep catalog order.
    gpu.sort_by(|a, b| {
        let size = |v: &ModelCompatibility| v.model.parameter_count().unwrap_or(0.0);
        size(b).total_cmp(&size(a))
    });

    if let Some(best) = gpu.first() {
        log::info!("[COMPAT] Recommended model: {} (gpu)", best.model.name);
        return Some(RecommendedModel {
            model: best.model.clone(),
            device: Device::Gpu,
        });
    }

    let picked = CPU_SIZES.iter().find_map(|size| {
        verdicts
            .iter()
            .find(|v| v.status == ModelStatus::Cpu && v.model.parameters == *size)
    });

    match picked {
        Some(v) => {
            log::info!("[COMPAT] Recommended model: {} (cpu)", v.model.name);
            Some(RecommendedModel {
                model: v.model.clone(),
                device: Device::Cpu,
            })
        }
        None => {
            log::info!("[COMPAT] No model recommendation for this hardware");
            None
        }
    }
}

pub fn select_recommended_runtime(verdicts: &[RuntimeCompatibility]) -> Option<RuntimeDescriptor> {
    // min_by_key keeps the first of equal keys, so ties stay in catalog order.
    let best = verdicts
        .iter()
        .filter(|v| v.status == RuntimeStatus::Confirmed)
        .min_by_key(|v| backend_priority(&v.runtime.backend))
        .map(|v| v.runtime.clone());

    match &best {
        Some(rt) => log::info!("[COMPAT] Recommended runtime: {} ({})", rt.name, rt.backend),
        None => log::info!("[COMPAT] No confirmed runtime for this hardware"),
    }
    best
}
