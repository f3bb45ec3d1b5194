//! Resume tailoring: drop entries that don't fit a job description and
//! rewrite the ones that do.
//!
//! Small local models wrap JSON in code fences or surround it with prose
//! despite being told not to, so replies go through a lenient extraction
//! step before parsing.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::prompts;
use super::TextGenerator;
use crate::error::{Error, Result};
use crate::resume::ResumeContent;

/// Strip a surrounding markdown code fence (```` ``` ```` or ```` ```json ````).
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let after_open = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        // Single line: "```json {...}```"
        None => trimmed
            .trim_start_matches('`')
            .trim_start_matches("json")
            .trim_start_matches("JSON"),
    };
    let stripped = after_open.trim_end();
    stripped
        .strip_suffix("```")
        .unwrap_or(stripped)
        .trim()
        .to_string()
}

/// Find the outermost brace-balanced `{...}` in `text`, ignoring braces
/// inside strings. Returns the trimmed input when there is none.
pub fn extract_json_str(text: &str) -> &str {
    let text = text.trim();
    if let Some(start) = text.find('{') {
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape_next = false;
        for (i, ch) in text[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }
            match ch {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return &text[start..start + i + 1];
                    }
                }
                _ => {}
            }
        }
    }
    text
}

fn extract_and_parse<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let clean = strip_code_fences(raw);
    if let Ok(v) = serde_json::from_str::<T>(&clean) {
        return Ok(v);
    }
    serde_json::from_str::<T>(extract_json_str(&clean))
        .map_err(|e| Error::Llm(format!("enhancement response is not valid JSON: {}", e)))
}

/// Only an explicit "no" drops an entry.
fn is_rejection(answer: &str) -> bool {
    let word = answer
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '!')
        .to_lowercase();
    word == "no"
}

/// Ask whether `entry` is relevant to `job_desc`. With no job description
/// everything is relevant and the model is not consulted.
pub async fn run_cleanup<G, T>(llm: &G, entry: &T, job_desc: &str) -> Result<bool>
where
    G: TextGenerator,
    T: Serialize + Sync,
{
    if job_desc.trim().is_empty() {
        return Ok(true);
    }
    let entry_json = serde_json::to_string_pretty(entry)?;
    let answer = llm
        .generate(&prompts::build_cleanup_prompt(job_desc, &entry_json))
        .await?;
    let keep = !is_rejection(&answer);
    log::debug!("[LLM] Cleanup answer {:?} -> keep={}", answer.trim(), keep);
    Ok(keep)
}

/// Rewrite `entry` for `job_desc`. The reply must parse back into `T`.
pub async fn run_enhancement<G, T>(llm: &G, entry: &T, job_desc: &str) -> Result<T>
where
    G: TextGenerator,
    T: Serialize + DeserializeOwned + Clone + Sync,
{
    if job_desc.trim().is_empty() {
        return Ok(entry.clone());
    }
    let entry_json = serde_json::to_string_pretty(entry)?;
    let raw = llm
        .generate(&prompts::build_enhance_prompt(job_desc, &entry_json))
        .await?;
    extract_and_parse(&raw).inspect_err(|e| {
        let preview: String = raw.chars().take(200).collect();
        log::warn!("[LLM] {} — raw: {}", e, preview);
    })
}

async fn keep_relevant<G, T>(llm: &G, entries: &[T], job_desc: &str, section: &str) -> Result<Vec<T>>
where
    G: TextGenerator,
    T: Serialize + Clone + Sync,
{
    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        if run_cleanup(llm, entry, job_desc).await? {
            kept.push(entry.clone());
        }
    }
    if kept.len() < entries.len() {
        log::info!(
            "[LLM] {}: dropped {} of {} entries",
            section,
            entries.len() - kept.len(),
            entries.len()
        );
    }
    Ok(kept)
}

/// Enhance each entry; a reply that doesn't parse keeps the original.
async fn enhance_all<G, T>(llm: &G, entries: Vec<T>, job_desc: &str) -> Result<Vec<T>>
where
    G: TextGenerator,
    T: Serialize + DeserializeOwned + Clone + Sync,
{
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        match run_enhancement(llm, &entry, job_desc).await {
            Ok(better) => out.push(better),
            Err(Error::Llm(_)) => out.push(entry),
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Tailor a whole resume: filter every list section for relevance, then
/// rewrite the surviving experience and project entries. Personal details
/// pass through untouched. Generation failures abort; unparseable rewrites
/// fall back to the original entry.
pub async fn tailor_content<G: TextGenerator>(
    llm: &G,
    content: &ResumeContent,
    job_desc: &str,
) -> Result<ResumeContent> {
    let start = std::time::Instant::now();

    let education = keep_relevant(llm, &content.education, job_desc, "education").await?;
    let experience = keep_relevant(llm, &content.experience, job_desc, "experience").await?;
    let projects = keep_relevant(llm, &content.projects, job_desc, "projects").await?;
    let skills = keep_relevant(llm, &content.skills, job_desc, "skills").await?;
    let awards = keep_relevant(llm, &content.awards, job_desc, "awards").await?;

    let experience = enhance_all(llm, experience, job_desc).await?;
    let projects = enhance_all(llm, projects, job_desc).await?;

    log::info!("[LLM] Tailored resume in {}ms", start.elapsed().as_millis());

    Ok(ResumeContent {
        personal: content.personal.clone(),
        education,
        experience,
        projects,
        skills,
        awards,
    })
}
