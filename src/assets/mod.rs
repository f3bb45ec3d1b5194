//! Downloadable assets — GGUF models and prebuilt runtimes.
//!
//! Layout under the data directory:
//!   models/<safe name>/<model>.gguf
//!   runtimes/<safe name>/...extracted archive...
//!
//! The safe name replaces `.` with `_` so "Qwen3-1.7B" never looks like an
//! extension to the filesystem.

mod download;

pub use download::{download_asset, verify_sha256, AssetRequest, DownloadObserver, Downloader};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config::AppPaths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Models,
    Runtimes,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Models => "models",
            AssetKind::Runtimes => "runtimes",
        }
    }

    /// Accepts both "model" and "models" (the frontend has used either).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" | "models" => Some(AssetKind::Models),
            "runtime" | "runtimes" => Some(AssetKind::Runtimes),
            _ => None,
        }
    }
}

pub fn safe_asset_name(name: &str) -> String {
    name.replace('.', "_")
}

pub fn asset_dir(paths: &AppPaths, kind: AssetKind, name: &str) -> PathBuf {
    let base = match kind {
        AssetKind::Models => paths.models_dir(),
        AssetKind::Runtimes => paths.runtimes_dir(),
    };
    base.join(safe_asset_name(name))
}

/// In-flight download bytes; never counts as a finished asset.
pub(crate) const PARTIAL_EXTENSION: &str = "partial";
const ARCHIVE_EXTENSION: &str = "zip";
const MODEL_EXTENSION: &str = "gguf";

/// A model is ready once a finished `.gguf` sits in its directory. A runtime
/// is ready once its directory holds files and no download leftovers.
pub fn is_asset_ready(paths: &AppPaths, kind: AssetKind, name: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(asset_dir(paths, kind, name)) else {
        return false;
    };
    let extensions: Vec<Option<String>> = entries
        .filter_map(|e| e.ok())
        .map(|e| {
            e.path()
                .extension()
                .and_then(|x| x.to_str())
                .map(str::to_ascii_lowercase)
        })
        .collect();

    match kind {
        AssetKind::Models => extensions
            .iter()
            .any(|ext| ext.as_deref() == Some(MODEL_EXTENSION)),
        AssetKind::Runtimes => {
            !extensions.is_empty()
                && !extensions.iter().any(|ext| {
                    matches!(ext.as_deref(), Some(PARTIAL_EXTENSION | ARCHIVE_EXTENSION))
                })
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    #[default]
    Idle,
    Downloading,
    Extracting,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadStatus {
    pub state: DownloadState,
    /// 0.0 ..= 100.0
    pub progress: f64,
}

impl DownloadStatus {
    fn is_busy(&self) -> bool {
        matches!(
            self.state,
            DownloadState::Downloading | DownloadState::Extracting
        )
    }
}

/// Per-asset download status, shared between the download task and queries.
#[derive(Debug, Default)]
pub struct DownloadTracker {
    statuses: Mutex<HashMap<String, DownloadStatus>>,
}

impl DownloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut HashMap<String, DownloadStatus>) -> R) -> R {
        let mut guard = self.statuses.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn set(&self, name: &str, state: DownloadState, progress: f64) {
        self.with(|m| {
            m.insert(
                name.to_string(),
                DownloadStatus {
                    state,
                    progress: progress.clamp(0.0, 100.0),
                },
            );
        });
    }

    /// Unknown assets report `Idle` at 0%.
    pub fn get(&self, name: &str) -> DownloadStatus {
        self.with(|m| m.get(name).copied().unwrap_or_default())
    }

    pub fn snapshot(&self) -> HashMap<String, DownloadStatus> {
        self.with(|m| m.clone())
    }

    /// True while a download or extraction for `name` is in flight.
    pub fn is_busy(&self, name: &str) -> bool {
        self.get(name).is_busy()
    }

    /// Claim `name` for a new download. Returns false, changing nothing,
    /// when another download of it is still in flight.
    pub fn try_begin(&self, name: &str) -> bool {
        self.with(|m| {
            if m.get(name).is_some_and(DownloadStatus::is_busy) {
                return false;
            }
            m.insert(
                name.to_string(),
                DownloadStatus {
                    state: DownloadState::Downloading,
                    progress: 0.0,
                },
            );
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_name_replaces_dots() {
        assert_eq!(safe_asset_name("Qwen3-1.7B-Q8_0"), "Qwen3-1_7B-Q8_0");
        assert_eq!(safe_asset_name("llama-win-cuda"), "llama-win-cuda");
    }

    #[test]
    fn asset_dirs_follow_kind() {
        let paths = AppPaths::new("/data");
        assert_eq!(
            asset_dir(&paths, AssetKind::Models, "Qwen3-0.6B-Q8_0"),
            PathBuf::from("/data").join("models").join("Qwen3-0_6B-Q8_0")
        );
        assert_eq!(
            asset_dir(&paths, AssetKind::Runtimes, "llama-linux-cpu"),
            PathBuf::from("/data").join("runtimes").join("llama-linux-cpu")
        );
    }

    #[test]
    fn runtime_ready_needs_extracted_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        let runtime = asset_dir(&paths, AssetKind::Runtimes, "llama-linux-cpu");
        assert!(!is_asset_ready(&paths, AssetKind::Runtimes, "llama-linux-cpu"));

        std::fs::create_dir_all(&runtime).unwrap();
        assert!(!is_asset_ready(&paths, AssetKind::Runtimes, "llama-linux-cpu"));

        std::fs::write(runtime.join("llama.zip.partial"), b"half").unwrap();
        assert!(!is_asset_ready(&paths, AssetKind::Runtimes, "llama-linux-cpu"));

        std::fs::remove_file(runtime.join("llama.zip.partial")).unwrap();
        std::fs::write(runtime.join("llama.zip"), b"archive").unwrap();
        std::fs::create_dir_all(runtime.join("build/bin")).unwrap();
        assert!(!is_asset_ready(&paths, AssetKind::Runtimes, "llama-linux-cpu"));

        std::fs::remove_file(runtime.join("llama.zip")).unwrap();
        assert!(is_asset_ready(&paths, AssetKind::Runtimes, "llama-linux-cpu"));
        assert!(!is_asset_ready(&paths, AssetKind::Models, "llama-linux-cpu"));
    }

    #[test]
    fn model_ready_needs_finished_gguf() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        let model = asset_dir(&paths, AssetKind::Models, "Qwen3-0.6B-Q8_0");
        std::fs::create_dir_all(&model).unwrap();

        std::fs::write(model.join("Qwen3-0.6B-Q8_0.gguf.partial"), b"half").unwrap();
        assert!(!is_asset_ready(&paths, AssetKind::Models, "Qwen3-0.6B-Q8_0"));

        std::fs::rename(
            model.join("Qwen3-0.6B-Q8_0.gguf.partial"),
            model.join("Qwen3-0.6B-Q8_0.gguf"),
        )
        .unwrap();
        assert!(is_asset_ready(&paths, AssetKind::Models, "Qwen3-0.6B-Q8_0"));
    }

    #[test]
    fn kind_parsing() {
        assert_eq!(AssetKind::parse("model"), Some(AssetKind::Models));
        assert_eq!(AssetKind::parse("Runtimes"), Some(AssetKind::Runtimes));
        assert_eq!(AssetKind::parse("fonts"), None);
    }

    #[test]
    fn tracker_defaults_and_clamps() {
        let tracker = DownloadTracker::new();
        assert_eq!(tracker.get("x"), DownloadStatus::default());
        tracker.set("x", DownloadState::Downloading, 140.0);
        assert_eq!(tracker.get("x").progress, 100.0);
        assert!(tracker.is_busy("x"));
        tracker.set("x", DownloadState::Ready, 100.0);
        assert!(!tracker.is_busy("x"));
        assert_eq!(tracker.snapshot().len(), 1);
    }

    #[test]
    fn second_begin_is_rejected_while_busy() {
        let tracker = DownloadTracker::new();
        assert!(tracker.try_begin("m"));
        assert!(!tracker.try_begin("m"));
        assert_eq!(tracker.get("m").state, DownloadState::Downloading);

        tracker.set("m", DownloadState::Extracting, 100.0);
        assert!(!tracker.try_begin("m"));
        // Rejection leaves the in-flight status alone.
        assert_eq!(tracker.get("m").progress, 100.0);

        tracker.set("m", DownloadState::Error, 0.0);
        assert!(tracker.try_begin("m"));
        assert!(tracker.try_begin("other"));
    }

    #[test]
    fn concurrent_begins_admit_exactly_one() {
        let tracker = std::sync::Arc::new(DownloadTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || tracker.try_begin("shared"))
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn status_wire_shape() {
        let json = serde_json::to_value(DownloadStatus {
            state: DownloadState::Extracting,
            progress: 100.0,
        })
        .unwrap();
        assert_eq!(json["state"], "extracting");
        assert_eq!(json["progress"], 100.0);
    }
}
