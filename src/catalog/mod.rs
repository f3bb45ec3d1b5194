//! Static catalogs of downloadable models and inference runtimes.
//!
//! Both catalogs ship inside the binary (`data/*.json`) and can be replaced
//! by a file on disk. Parsing is per entry: a malformed record is logged and
//! skipped, the rest of the catalog still loads.

mod models;
mod runtimes;

pub use models::{ModelCatalog, ModelDescriptor};
pub use runtimes::{CompatibleGpu, RuntimeCatalog, RuntimeDescriptor};

use serde::de::DeserializeOwned;

use crate::config::{catalog_override, MODEL_CATALOG_ENV, RUNTIME_CATALOG_ENV};
use crate::error::{Error, Result};

/// Both catalogs, honouring the `RESUMA_*_CATALOG` file overrides. An
/// override that cannot be read falls back to the bundled catalog.
pub fn load_catalogs() -> (ModelCatalog, RuntimeCatalog) {
    let models = match catalog_override(MODEL_CATALOG_ENV) {
        Some(path) => ModelCatalog::load(&path).unwrap_or_else(|e| {
            log::warn!("[CATALOG] {}: {}, using bundled models", path.display(), e);
            ModelCatalog::bundled()
        }),
        None => ModelCatalog::bundled(),
    };
    let runtimes = match catalog_override(RUNTIME_CATALOG_ENV) {
        Some(path) => RuntimeCatalog::load(&path).unwrap_or_else(|e| {
            log::warn!("[CATALOG] {}: {}, using bundled runtimes", path.display(), e);
            RuntimeCatalog::bundled()
        }),
        None => RuntimeCatalog::bundled(),
    };
    log::info!(
        "[CATALOG] {} models, {} runtimes available",
        models.len(),
        runtimes.len()
    );
    (models, runtimes)
}

/// Parse a JSON array, keeping every element that deserializes as `T`.
fn parse_entries<T: DeserializeOwned>(json: &str, what: &str) -> Result<Vec<T>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| Error::Catalog(format!("{} catalog is not a JSON array: {}", what, e)))?;

    let total = raw.len();
    let entries: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("[CATALOG] Skipping {} entry #{}: {}", what, i, e);
                None
            }
        })
        .collect();

    log::debug!("[CATALOG] Loaded {}/{} {} entries", entries.len(), total, what);
    Ok(entries)
}
