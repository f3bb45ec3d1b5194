//! Local LLM integration — the llama.cpp CLI launcher and the resume
//! tailoring helpers built on top of it.
//!
//! Everything above the launcher talks to a [`TextGenerator`], so the
//! tailoring logic is testable without a model on disk.

pub mod launcher;
pub mod prompts;
pub mod tailor;

pub use launcher::{build_args, extract_think_to_end, LocalLlm};
pub use tailor::{run_cleanup, run_enhancement, tailor_content};

use std::future::Future;

use crate::error::Result;

/// Prompt in, completion out.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}
