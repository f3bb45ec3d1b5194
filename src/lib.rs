//! Resuma — local-first resume builder backend.
//!
//! The library core decides which local LLMs and llama.cpp runtimes a
//! machine can run and how to configure them:
//! - Hardware profile (hardware/) and model/runtime catalogs (catalog/)
//! - Compatibility verdicts (compat/), picks (recommend) and the combined
//!   assessment (report)
//! - Adaptive inference settings and the persisted settings store (settings/)
//!
//! Around it sit the services the desktop app needs: asset downloads
//! (assets/), the llama-cli launcher and resume tailoring (llm/), and resume
//! storage and export (resume/). The Tauri shell itself is behind the
//! `desktop` feature.

pub mod assets;
pub mod catalog;
pub mod compat;
pub mod config;
pub mod error;
pub mod hardware;
pub mod llm;
pub mod recommend;
pub mod report;
pub mod resume;
pub mod settings;

#[cfg(feature = "desktop")]
mod commands;

pub use error::{Error, Result};

/// Entry point — called by the desktop binary.
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    config::load_dotenv();
    env_logger::init();

    let state = commands::AppState::from_env().expect("Failed to initialise app data directory");

    tauri::Builder::default()
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            commands::get_system_profile,
            commands::get_compatibility,
            commands::download_and_extract,
            commands::check_asset_ready,
            commands::get_download_status,
            commands::call_llm,
            commands::tailor_resume,
            commands::create_resume,
            commands::save_resume,
            commands::load_resume,
            commands::delete_resume,
            commands::list_resumes,
            commands::export_resume_txt,
            commands::get_settings,
            commands::get_settings_section,
            commands::update_settings_section,
        ])
        .setup(|_app| {
            log::info!("Resuma starting up");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error running Resuma");
}
