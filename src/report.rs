//! One-shot compatibility assessment: verdicts, picks and derived settings
//! for a single hardware profile. This is what the setup screen renders.

use serde::Serialize;

use crate::catalog::{ModelDescriptor, RuntimeDescriptor};
use crate::compat::{resolve_models, resolve_runtimes, ModelCompatibility, RuntimeCompatibility};
use crate::hardware::HardwareProfile;
use crate::recommend::{select_recommended_model, select_recommended_runtime, RecommendedModel};
use crate::settings::{adaptive_settings, LlmConfig, LlmSettings};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    pub hardware: HardwareProfile,
    pub models: Vec<ModelCompatibility>,
    pub runtimes: Vec<RuntimeCompatibility>,
    pub recommended_model: Option<RecommendedModel>,
    pub recommended_runtime: Option<RuntimeDescriptor>,
    pub settings: LlmSettings,
}

impl CompatibilityReport {
    /// The config onboarding would save if the user accepts both picks.
    pub fn suggested_config(&self) -> Option<LlmConfig> {
        let model = self.recommended_model.as_ref()?;
        let runtime = self.recommended_runtime.as_ref()?;
        Some(LlmConfig {
            model: model.model.name.clone(),
            runtime: runtime.name.clone(),
            settings: self.settings,
        })
    }
}

pub fn assess(
    models: &[ModelDescriptor],
    runtimes: &[RuntimeDescriptor],
    hw: &HardwareProfile,
) -> CompatibilityReport {
    let model_verdicts = resolve_models(models, hw);
    let runtime_verdicts = resolve_runtimes(runtimes, hw);
    let recommended_model = select_recommended_model(&model_verdicts);
    let recommended_runtime = select_recommended_runtime(&runtime_verdicts);
    let settings = adaptive_settings(
        hw.ram_gb_reading(),
        hw.vram_mb_reading(),
        recommended_model.as_ref(),
    );

    CompatibilityReport {
        hardware: hw.clone(),
        models: model_verdicts,
        runtimes: runtime_verdicts,
        recommended_model,
        recommended_runtime,
        settings,
    }
}
