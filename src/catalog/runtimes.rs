//! Known inference runtimes — prebuilt llama.cpp bundles per platform and backend.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compat::RuntimeStatus;
use crate::error::Result;

const BUNDLED_RUNTIMES: &str = include_str!("../../data/runtimes.json");

/// A GPU the runtime has been tested against. `model` is matched after
/// normalization; "Any NVIDIA" / "Any AMD" / "Any Intel" act as vendor wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibleGpu {
    pub model: String,
    pub status: RuntimeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeDescriptor {
    pub name: String,
    pub label: String,
    #[serde(alias = "download", alias = "download_url")]
    pub download_url: String,
    /// "windows" | "linux" | "macos".
    pub platform: String,
    /// "cpu" | "cuda" | "vulkan" | "hip" | ...
    pub backend: String,
    #[serde(default)]
    pub compatible_gpus: Vec<CompatibleGpu>,
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeCatalog {
    runtimes: Vec<RuntimeDescriptor>,
}

impl RuntimeCatalog {
    pub fn new(runtimes: Vec<RuntimeDescriptor>) -> Self {
        Self { runtimes }
    }

    pub fn bundled() -> Self {
        Self::from_json(BUNDLED_RUNTIMES).unwrap_or_else(|e| {
            log::error!("[CATALOG] Bundled runtime catalog is invalid: {}", e);
            Self::default()
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        super::parse_entries(json, "runtime").map(Self::new)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        log::info!("[CATALOG] Loading runtimes from {}", path.display());
        Self::from_json(&json)
    }

    pub fn entries(&self) -> &[RuntimeDescriptor] {
        &self.runtimes
    }

    pub fn find(&self, name: &str) -> Option<&RuntimeDescriptor> {
        self.runtimes.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_covers_each_platform() {
        let catalog = RuntimeCatalog::bundled();
        for platform in ["windows", "linux", "macos"] {
            assert!(
                catalog.entries().iter().any(|r| r.platform == platform),
                "no runtime for {}",
                platform
            );
        }
    }

    #[test]
    fn bundled_urls_are_zip_releases() {
        for r in RuntimeCatalog::bundled().entries() {
            assert!(r.download_url.starts_with("https://github.com/ggml-org/llama.cpp/"));
            assert!(r.download_url.ends_with(".zip"));
        }
    }

    #[test]
    fn unknown_gpu_status_skips_only_that_entry() {
        let json = r#"[
            {"name": "ok", "label": "OK", "downloadUrl": "u", "platform": "linux", "backend": "cpu"},
            {"name": "bad", "label": "Bad", "downloadUrl": "u", "platform": "linux", "backend": "hip",
             "compatibleGpus": [{"model": "x", "status": "maybe"}]}
        ]"#;
        let catalog = RuntimeCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find("ok").is_some());
        assert!(catalog.find("ok").unwrap().compatible_gpus.is_empty());
    }
}
