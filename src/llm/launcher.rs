//! llama.cpp CLI launcher.
//!
//! Each call spawns `llama-cli` once in single-turn mode and captures its
//! stdout. No model stays resident between calls.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assets::{asset_dir, AssetKind};
use crate::config::AppPaths;
use crate::error::{Error, Result};
use crate::settings::{LlmConfig, LlmSettings};

use super::TextGenerator;

const THINK_END: &str = "</think>";
const END_OF_TEXT: &str = "[end of text]";

/// Generation on a CPU build with a large context can take minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

#[cfg(target_os = "windows")]
const CLI_RELATIVE: &str = "llama-cli.exe";
#[cfg(not(target_os = "windows"))]
const CLI_RELATIVE: &str = "build/bin/llama-cli";

pub fn runtime_binary(paths: &AppPaths, runtime: &str) -> PathBuf {
    asset_dir(paths, AssetKind::Runtimes, runtime).join(CLI_RELATIVE)
}

/// `<models>/<safe name>/<model>.gguf`, or the first `.gguf` in that
/// directory when the file was saved under another name.
pub fn model_file(paths: &AppPaths, model: &str) -> PathBuf {
    let dir = asset_dir(paths, AssetKind::Models, model);
    let expected = dir.join(format!("{}.gguf", model));
    if expected.is_file() {
        return expected;
    }

    let fallback = std::fs::read_dir(&dir).ok().and_then(|entries| {
        let mut ggufs: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("gguf"))
            .collect();
        ggufs.sort();
        ggufs.into_iter().next()
    });
    fallback.unwrap_or(expected)
}

/// Command-line arguments for one single-turn generation.
///
/// GPU flags are omitted for CPU builds, which reject them.
pub fn build_args(model: &Path, prompt: &str, settings: &LlmSettings, cpu_runtime: bool) -> Vec<String> {
    let mut args = vec![
        "--model".to_string(),
        model.to_string_lossy().into_owned(),
        "--prompt".to_string(),
        prompt.to_string(),
        "--jinja".to_string(),
        "-st".to_string(),
        "--simple-io".to_string(),
    ];

    if settings.ctx_size > 0 {
        args.push("--ctx-size".to_string());
        args.push(settings.ctx_size.to_string());
    }

    if !cpu_runtime {
        if settings.flash_attn {
            args.push("--flash-attn".to_string());
        }
        args.push("--gpu-layers".to_string());
        args.push(settings.gpu_layers.to_string());
    }

    if settings.mlock {
        args.push("--mlock".to_string());
    }
    if settings.no_mmap {
        args.push("--no-mmap".to_string());
    }

    args
}

/// The answer between the end of the reasoning block and llama-cli's
/// end-of-text marker, trimmed. `None` unless both markers appear in order.
pub fn extract_think_to_end(text: &str) -> Option<String> {
    let start = text.find(THINK_END)? + THINK_END.len();
    let end = text.find(END_OF_TEXT)?;
    (start <= end).then(|| text[start..end].trim().to_string())
}

/// The user's configured model + runtime, ready to run prompts.
#[derive(Debug, Clone)]
pub struct LocalLlm {
    runtime: PathBuf,
    model: PathBuf,
    settings: LlmSettings,
    cpu_runtime: bool,
    timeout: Duration,
}

impl LocalLlm {
    pub fn new(paths: &AppPaths, config: &LlmConfig) -> Self {
        Self {
            runtime: runtime_binary(paths, &config.runtime),
            model: model_file(paths, &config.model),
            settings: config.settings,
            cpu_runtime: config.runtime.to_lowercase().contains("cpu"),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn runtime_path(&self) -> &Path {
        &self.runtime
    }

    pub fn model_path(&self) -> &Path {
        &self.model
    }

    pub fn is_cpu_runtime(&self) -> bool {
        self.cpu_runtime
    }

    async fn run(&self, prompt: &str) -> Result<String> {
        if !self.runtime.is_file() {
            return Err(Error::NotFound(self.runtime.clone()));
        }
        if !self.model.is_file() {
            return Err(Error::NotFound(self.model.clone()));
        }

        let args = build_args(&self.model, prompt, &self.settings, self.cpu_runtime);
        let start = std::time::Instant::now();
        log::info!(
            "[LLM] Running {} ({} prompt chars, cpu={})",
            self.runtime.display(),
            prompt.len(),
            self.cpu_runtime
        );

        let child = tokio::process::Command::new(&self.runtime)
            .args(&args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| Error::Llm(format!("generation timed out after {:?}", self.timeout)))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("[LLM] Process failed ({}): {}", output.status, stderr.trim());
            return Err(Error::Llm(format!(
                "llama-cli exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let answer = extract_think_to_end(&stdout).unwrap_or_else(|| stdout.trim().to_string());
        log::info!(
            "[LLM] Completed in {}ms ({} chars)",
            start.elapsed().as_millis(),
            answer.len()
        );
        Ok(answer)
    }
}

impl TextGenerator for LocalLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.run(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpu_settings() -> LlmSettings {
        LlmSettings {
            ctx_size: 8192,
            gpu_layers: 36,
            flash_attn: true,
            mlock: true,
            no_mmap: false,
            ..LlmSettings::default()
        }
    }

    #[test]
    fn base_args_always_present() {
        let args = build_args(Path::new("m.gguf"), "hi there", &LlmSettings::default(), true);
        assert_eq!(
            &args[..7],
            ["--model", "m.gguf", "--prompt", "hi there", "--jinja", "-st", "--simple-io"]
        );
    }

    #[test]
    fn gpu_runtime_gets_offload_flags() {
        let args = build_args(Path::new("m.gguf"), "p", &gpu_settings(), false);
        let joined = args.join(" ");
        assert!(joined.contains("--ctx-size 8192"));
        assert!(joined.contains("--flash-attn"));
        assert!(joined.contains("--gpu-layers 36"));
        assert!(joined.contains("--mlock"));
        assert!(!joined.contains("--no-mmap"));
    }

    #[test]
    fn cpu_runtime_drops_gpu_flags() {
        let args = build_args(Path::new("m.gguf"), "p", &gpu_settings(), true);
        assert!(!args.iter().any(|a| a == "--gpu-layers" || a == "--flash-attn"));
        assert!(args.iter().any(|a| a == "--mlock"));
    }

    #[test]
    fn zero_context_is_left_to_the_runtime() {
        let settings = LlmSettings {
            ctx_size: 0,
            no_mmap: true,
            ..LlmSettings::default()
        };
        let args = build_args(Path::new("m.gguf"), "p", &settings, true);
        assert!(!args.iter().any(|a| a == "--ctx-size"));
        assert_eq!(args.last().map(String::as_str), Some("--no-mmap"));
    }

    #[test]
    fn think_block_extraction() {
        let out = "loading...\n<think>\nhmm\n</think>\n\n  yes \n[end of text]\n";
        assert_eq!(extract_think_to_end(out).as_deref(), Some("yes"));
        assert_eq!(extract_think_to_end("no markers"), None);
        assert_eq!(extract_think_to_end("[end of text] then </think>"), None);
        assert_eq!(extract_think_to_end("</think>[end of text]").as_deref(), Some(""));
    }

    #[test]
    fn paths_use_safe_names() {
        let paths = AppPaths::new("/data");
        assert_eq!(
            model_file(&paths, "Qwen3-1.7B-Q8_0"),
            paths
                .models_dir()
                .join("Qwen3-1_7B-Q8_0")
                .join("Qwen3-1.7B-Q8_0.gguf")
        );
        assert!(runtime_binary(&paths, "llama-win-cuda")
            .starts_with(paths.runtimes_dir().join("llama-win-cuda")));
    }

    #[test]
    fn model_file_falls_back_to_any_gguf() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        let model_dir = paths.models_dir().join("Custom-7B");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("custom-7b-q4.gguf"), b"x").unwrap();
        assert_eq!(model_file(&paths, "Custom-7B"), model_dir.join("custom-7b-q4.gguf"));
    }

    #[test]
    fn cpu_detection_from_runtime_name() {
        let paths = AppPaths::new("/data");
        let cfg = |runtime: &str| LlmConfig {
            model: "m".into(),
            runtime: runtime.into(),
            settings: LlmSettings::default(),
        };
        assert!(LocalLlm::new(&paths, &cfg("llama-linux-CPU")).is_cpu_runtime());
        assert!(!LocalLlm::new(&paths, &cfg("llama-win-cuda")).is_cpu_runtime());
    }

    #[tokio::test]
    async fn missing_runtime_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        let llm = LocalLlm::new(
            &paths,
            &LlmConfig {
                model: "m".into(),
                runtime: "absent".into(),
                settings: LlmSettings::default(),
            },
        );
        match llm.generate("hello").await {
            Err(Error::NotFound(p)) => assert_eq!(p, llm.runtime_path()),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_fake_cli_and_extracts_answer() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        let config = LlmConfig {
            model: "Tiny-0.5B".into(),
            runtime: "fake-cpu".into(),
            settings: LlmSettings::default(),
        };

        let bin = runtime_binary(&paths, &config.runtime);
        std::fs::create_dir_all(bin.parent().unwrap()).unwrap();
        let args_file = dir.path().join("args.txt");
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\necho 'load ok'\necho '<think>'\necho '</think>'\necho 'yes'\necho '[end of text]'\n",
            args_file.display()
        );
        std::fs::write(&bin, script).unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        let model = model_file(&paths, &config.model);
        std::fs::create_dir_all(model.parent().unwrap()).unwrap();
        std::fs::write(&model, b"GGUF").unwrap();

        let llm = LocalLlm::new(&paths, &config);
        assert_eq!(llm.generate("Is this relevant?").await.unwrap(), "yes");

        let args = std::fs::read_to_string(&args_file).unwrap();
        let args: Vec<&str> = args.lines().collect();
        let prompt_at = args.iter().position(|a| *a == "--prompt").unwrap();
        assert_eq!(args[prompt_at + 1], "Is this relevant?");
        assert!(args.contains(&"--simple-io"));
        assert!(!args.contains(&"--gpu-layers"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_process_reports_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        let config = LlmConfig {
            model: "m".into(),
            runtime: "broken".into(),
            settings: LlmSettings::default(),
        };
        let bin = runtime_binary(&paths, &config.runtime);
        std::fs::create_dir_all(bin.parent().unwrap()).unwrap();
        std::fs::write(&bin, "#!/bin/sh\necho 'model load failed' >&2\nexit 3\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
        let model = model_file(&paths, &config.model);
        std::fs::create_dir_all(model.parent().unwrap()).unwrap();
        std::fs::write(&model, b"GGUF").unwrap();

        let err = LocalLlm::new(&paths, &config).generate("p").await.unwrap_err();
        match err {
            Error::Llm(msg) => assert!(msg.contains("model load failed")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
