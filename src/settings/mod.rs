//! User settings: typed sections over a persisted key/value store, plus the
//! adaptive LLM settings derived from hardware.

mod adaptive;
mod store;

pub use adaptive::{adaptive_settings, LlmSettings};
pub use store::SettingsStore;

use serde::{Deserialize, Serialize};

pub const APP_SECTION: &str = "app";
pub const LLM_SECTION: &str = "llm";
pub const PERSONAL_SECTION: &str = "personal";

/// Appearance and layout preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppPreferences {
    /// "light" | "dark" | "system".
    pub theme: String,
    /// "A4" | "US Letter".
    pub paper_size: String,
    pub language: String,
    /// "md" | "lg".
    pub content_size: String,
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            theme: "system".into(),
            paper_size: "A4".into(),
            language: "en".into(),
            content_size: "md".into(),
        }
    }
}

/// The user-confirmed model and runtime, by catalog name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub runtime: String,
    pub settings: LlmSettings,
}

impl LlmConfig {
    /// Both names chosen; the launcher can be attempted.
    pub fn is_configured(&self) -> bool {
        !self.model.is_empty() && !self.runtime.is_empty()
    }
}

/// Onboarding identity, reused to prefill new resumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalProfile {
    pub full_name: String,
    pub email: String,
    pub location: String,
    pub headline: String,
}
