//! Known local LLM models — GGUF files the setup flow can recommend.
//!
//! The bundled catalog covers the Qwen3 family from 0.6B to 32B, one entry
//! per parameter bucket the compatibility rules know about.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::Result;

const BUNDLED_MODELS: &str = include_str!("../../data/models.json");

static PARAMETER_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*b").unwrap());

/// Metadata for a downloadable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    pub label: String,
    #[serde(alias = "download", alias = "download_url")]
    pub download_url: String,
    #[serde(default)]
    pub quantization: String,
    /// Human-readable download size, e.g. "5.03 GB".
    #[serde(default)]
    pub size: String,
    /// Parameter count as written by the publisher: "0.6B", "14B".
    pub parameters: String,
    #[serde(default)]
    pub layers: Option<u32>,
    #[serde(default)]
    pub context_length: u32,
    /// Hex SHA-256 of the GGUF file, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ModelDescriptor {
    /// Parameter count in billions, parsed from `<number>B` (case-insensitive).
    pub fn parameter_count(&self) -> Option<f64> {
        parse_parameter_count(&self.parameters)
    }
}

/// Parse "1.7B" / "14b" into billions. `None` when the string has no `<number>B`.
pub fn parse_parameter_count(parameters: &str) -> Option<f64> {
    PARAMETER_COUNT
        .captures(parameters)
        .and_then(|c| c[1].parse::<f64>().ok())
}

/// Read-only list of models.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Self {
        Self::from_json(BUNDLED_MODELS).unwrap_or_else(|e| {
            log::error!("[CATALOG] Bundled model catalog is invalid: {}", e);
            Self::default()
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        super::parse_entries(json, "model").map(Self::new)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        log::info!("[CATALOG] Loading models from {}", path.display());
        Self::from_json(&json)
    }

    pub fn entries(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Look up a model by name. Accepts the safe (`.` → `_`) form as well.
    pub fn find(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models
            .iter()
            .find(|m| m.name == name || m.name.replace('.', "_") == name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
