//! Adaptive inference settings derived from the host and the recommended model.

use serde::{Deserialize, Serialize};

use crate::recommend::RecommendedModel;

/// Flags handed to the llama.cpp CLI. `-1` means "let the runtime decide".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    pub threads: i32,
    pub ctx_size: u32,
    pub predict: i32,
    pub gpu_layers: u32,
    pub flash_attn: bool,
    pub mlock: bool,
    pub no_mmap: bool,
}

impl Default for LlmSettings {
    fn default() -> Self {
        adaptive_settings(None, None, None)
    }
}

const CTX_LARGE: u32 = 8192;
const CTX_SMALL: u32 = 4096;

/// Derive settings for the device class of `model`.
///
/// The effective memory reading is the raw GPU VRAM (MB) on the GPU path and
/// system RAM (GB) otherwise. A missing reading takes the conservative branch
/// of every rule: no mlock, no forced no-mmap, small context.
pub fn adaptive_settings(
    ram_gb: Option<u64>,
    gpu_vram_mb: Option<u64>,
    model: Option<&RecommendedModel>,
) -> LlmSettings {
    let is_gpu = model.is_some_and(|m| m.is_gpu());
    let effective = if is_gpu { gpu_vram_mb } else { ram_gb };
    let mlock_floor = if is_gpu { 8 } else { 16 };

    let gpu_layers = match model {
        Some(m) if is_gpu => m.model.layers.unwrap_or(0),
        _ => 0,
    };

    let settings = LlmSettings {
        threads: -1,
        ctx_size: if effective.is_some_and(|m| m >= 16) {
            CTX_LARGE
        } else {
            CTX_SMALL
        },
        predict: -1,
        gpu_layers,
        flash_attn: false,
        mlock: effective.is_some_and(|m| m >= mlock_floor),
        no_mmap: effective.is_some_and(|m| m <= 4),
    };

    log::debug!(
        "[COMPAT] Adaptive settings (gpu={}, effective={:?}): {:?}",
        is_gpu,
        effective,
        settings
    );
    settings
}
