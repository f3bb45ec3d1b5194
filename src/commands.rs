//! Tauri command handlers — the frontend's view of the backend.
//!
//! Errors are flattened to `String` here and nowhere else. Downloads run as
//! background tasks and report through window events named
//! `download_progress:<asset>`, `download_complete:<asset>`,
//! `extract_complete:<asset>` and `download_error:<asset>`.

use std::sync::Arc;

use serde_json::{Map, Value};
use tauri::{Emitter, Manager};
use tokio::sync::OnceCell;

use crate::assets::{
    is_asset_ready, AssetKind, AssetRequest, DownloadObserver, DownloadState, DownloadStatus,
    DownloadTracker, Downloader,
};
use crate::catalog::{load_catalogs, ModelCatalog, RuntimeCatalog};
use crate::config::AppPaths;
use crate::hardware::{probe_hardware, HardwareProfile};
use crate::llm::{tailor_content, LocalLlm, TextGenerator};
use crate::report::{assess, CompatibilityReport};
use crate::resume::{format_resume_txt, ResumeContent, ResumeData, ResumeStore};
use crate::settings::{LlmConfig, SettingsStore, LLM_SECTION};

/// Everything the commands share, owned by the Tauri app.
pub struct AppState {
    pub paths: AppPaths,
    pub settings: SettingsStore,
    pub resumes: ResumeStore,
    pub models: ModelCatalog,
    pub runtimes: RuntimeCatalog,
    pub downloads: Arc<DownloadTracker>,
    downloader: Downloader,
    profile: OnceCell<HardwareProfile>,
}

impl AppState {
    pub fn new(paths: AppPaths) -> Self {
        let (models, runtimes) = load_catalogs();
        Self {
            settings: SettingsStore::open(paths.settings_file()),
            resumes: ResumeStore::new(paths.resumes_dir()),
            paths,
            models,
            runtimes,
            downloads: Arc::new(DownloadTracker::new()),
            downloader: Downloader::new(),
            profile: OnceCell::new(),
        }
    }

    pub fn from_env() -> crate::Result<Self> {
        let paths = AppPaths::from_env()?;
        std::fs::create_dir_all(paths.data_dir())?;
        log::info!("Data directory: {}", paths.data_dir().display());
        Ok(Self::new(paths))
    }

    /// Probe once per session; sysinfo refreshes are slow.
    async fn profile(&self) -> Result<&HardwareProfile, String> {
        self.profile
            .get_or_try_init(|| async {
                tokio::task::spawn_blocking(probe_hardware)
                    .await
                    .map_err(|e| format!("Hardware probe failed: {}", e))
            })
            .await
    }

    fn llm_config(&self, explicit: Option<LlmConfig>) -> Result<LlmConfig, String> {
        let config = explicit
            .or_else(|| self.settings.get_section::<LlmConfig>(LLM_SECTION))
            .unwrap_or_default();
        if !config.is_configured() {
            return Err("No model and runtime configured. Finish the AI setup first.".to_string());
        }
        Ok(config)
    }
}

fn parse_kind(asset_type: &str) -> Result<AssetKind, String> {
    AssetKind::parse(asset_type).ok_or_else(|| format!("Unknown asset type: {}", asset_type))
}

// ── Hardware & compatibility ────────────────────────────────────────

#[tauri::command]
pub async fn get_system_profile(
    state: tauri::State<'_, AppState>,
) -> Result<HardwareProfile, String> {
    state.profile().await.cloned()
}

/// Verdicts and picks for `profile`, or for this machine when omitted.
#[tauri::command]
pub async fn get_compatibility(
    state: tauri::State<'_, AppState>,
    profile: Option<HardwareProfile>,
) -> Result<CompatibilityReport, String> {
    let hw = match profile {
        Some(hw) => hw,
        None => state.profile().await?.clone(),
    };
    Ok(assess(state.models.entries(), state.runtimes.entries(), &hw))
}

// ── Assets ──────────────────────────────────────────────────────────

/// Forwards download milestones to the window and the status tracker.
struct WindowObserver {
    window: tauri::Window,
    name: String,
    tracker: Arc<DownloadTracker>,
}

impl WindowObserver {
    fn emit<S: serde::Serialize + Clone>(&self, event: &str, payload: S) {
        let _ = self.window.emit(&format!("{}:{}", event, self.name), payload);
    }
}

impl DownloadObserver for WindowObserver {
    fn on_progress(&self, percent: f64) {
        self.tracker.set(&self.name, DownloadState::Downloading, percent);
        self.emit("download_progress", percent);
    }

    fn on_complete(&self, path: &std::path::Path) {
        self.tracker.set(&self.name, DownloadState::Downloading, 100.0);
        self.emit("download_complete", path.to_string_lossy().to_string());
    }

    fn on_extracting(&self) {
        self.tracker.set(&self.name, DownloadState::Extracting, 100.0);
    }

    fn on_extracted(&self, dir: &std::path::Path) {
        self.emit("extract_complete", dir.to_string_lossy().to_string());
    }
}

/// Start a background download. Returns immediately; progress and the
/// outcome arrive as window events.
#[tauri::command]
pub async fn download_and_extract(
    window: tauri::Window,
    state: tauri::State<'_, AppState>,
    asset_name: String,
    asset_url: String,
    no_extract: bool,
    asset_type: String,
) -> Result<(), String> {
    let kind = parse_kind(&asset_type)?;
    if !state.downloads.try_begin(&asset_name) {
        return Err(format!("{} is already downloading", asset_name));
    }

    let sha256 = match kind {
        AssetKind::Models => state.models.find(&asset_name).and_then(|m| m.sha256.clone()),
        AssetKind::Runtimes => None,
    };
    let app = window.app_handle().clone();
    let observer = WindowObserver {
        window,
        name: asset_name.clone(),
        tracker: state.downloads.clone(),
    };

    tauri::async_runtime::spawn(async move {
        let state = app.state::<AppState>();
        let req = AssetRequest {
            kind,
            name: &asset_name,
            url: &asset_url,
            extract: !no_extract,
            sha256: sha256.as_deref(),
        };
        match state.downloader.fetch(&state.paths, &req, &observer).await {
            Ok(_) => state.downloads.set(&asset_name, DownloadState::Ready, 100.0),
            Err(e) => {
                log::error!("[ASSET] {} failed: {}", asset_name, e);
                state.downloads.set(&asset_name, DownloadState::Error, 0.0);
                observer.emit("download_error", e.to_string());
            }
        }
    });

    Ok(())
}

#[tauri::command]
pub fn check_asset_ready(
    state: tauri::State<'_, AppState>,
    asset_type: String,
    asset_name: String,
) -> Result<bool, String> {
    let kind = parse_kind(&asset_type)?;
    Ok(is_asset_ready(&state.paths, kind, &asset_name))
}

#[tauri::command]
pub fn get_download_status(state: tauri::State<'_, AppState>, asset_name: String) -> DownloadStatus {
    state.downloads.get(&asset_name)
}

// ── LLM ─────────────────────────────────────────────────────────────

/// Run one prompt. Uses `llm_settings` when given, otherwise the saved config.
#[tauri::command]
pub async fn call_llm(
    state: tauri::State<'_, AppState>,
    prompt: String,
    llm_settings: Option<LlmConfig>,
) -> Result<String, String> {
    let config = state.llm_config(llm_settings)?;
    let llm = LocalLlm::new(&state.paths, &config);
    llm.generate(&prompt).await.map_err(|e| e.to_string())
}

/// Filter and rewrite resume content for a job description.
#[tauri::command]
pub async fn tailor_resume(
    state: tauri::State<'_, AppState>,
    content: ResumeContent,
    job_desc: String,
) -> Result<ResumeContent, String> {
    let config = state.llm_config(None)?;
    let llm = LocalLlm::new(&state.paths, &config);
    tailor_content(&llm, &content, &job_desc)
        .await
        .map_err(|e| e.to_string())
}

// ── Resumes ─────────────────────────────────────────────────────────

#[tauri::command]
pub fn create_resume(
    state: tauri::State<'_, AppState>,
    title: String,
) -> Result<ResumeData, String> {
    let resume = ResumeData::new(title);
    state.resumes.save(&resume).map_err(|e| e.to_string())?;
    Ok(resume)
}

#[tauri::command]
pub fn save_resume(
    state: tauri::State<'_, AppState>,
    mut resume: ResumeData,
) -> Result<ResumeData, String> {
    resume.touch();
    state.resumes.save(&resume).map_err(|e| e.to_string())?;
    Ok(resume)
}

#[tauri::command]
pub fn load_resume(state: tauri::State<'_, AppState>, id: String) -> Option<ResumeData> {
    state.resumes.load(&id)
}

#[tauri::command]
pub fn delete_resume(state: tauri::State<'_, AppState>, id: String) -> Result<(), String> {
    state.resumes.delete(&id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn list_resumes(state: tauri::State<'_, AppState>) -> Result<Vec<ResumeData>, String> {
    state.resumes.list().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn export_resume_txt(
    state: tauri::State<'_, AppState>,
    id: String,
) -> Result<String, String> {
    let resume = state
        .resumes
        .load(&id)
        .ok_or_else(|| format!("Resume {} not found", id))?;
    Ok(format_resume_txt(&resume.content.unwrap_or_default()))
}

// ── Settings ────────────────────────────────────────────────────────

#[tauri::command]
pub fn get_settings(state: tauri::State<'_, AppState>) -> Map<String, Value> {
    state.settings.entries()
}

#[tauri::command]
pub fn get_settings_section(state: tauri::State<'_, AppState>, key: String) -> Option<Value> {
    state.settings.get_section(&key)
}

#[tauri::command]
pub fn update_settings_section(
    state: tauri::State<'_, AppState>,
    key: String,
    value: Value,
) -> Result<(), String> {
    state
        .settings
        .update_section(&key, &value)
        .map_err(|e| e.to_string())
}
