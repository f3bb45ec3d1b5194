//! Prompts for resume tailoring.
//!
//! llama-cli runs with `--jinja -st`, which wraps the prompt in the model's
//! own chat template, so these are plain text. Small local models need the
//! answer format spelled out and repeated at the end.

/// Relevance check. The model must answer a bare "yes" or "no".
const CLEANUP_INSTRUCTIONS: &str = "\
Decide whether this entry is relevant to the job description, judging only by the skills, tools and tasks it mentions. \
Ignore dates, years of experience and any time-based requirements. \
For education entries, the entry is relevant when the field of study fits the job, even if individual courses do not. \
For skill groups, keep the entry when at least one item is even slightly relevant.

Answer with exactly one word: \"yes\" or \"no\". No explanation, no formatting.

If the job description is empty or you are unsure, answer \"yes\".";

/// Rewrite request. The model must answer with the entry as a JSON object.
const ENHANCE_INSTRUCTIONS: &str = "\
Rewrite the description and notes fields so they are clearer, more concise and directly relevant to the job description. \
You may add notes but must not remove existing ones. \
Keep every other field exactly as it is (dates, locations, names). \
Do not invent information unrelated to the job description.

Return the updated entry as a single JSON object with the same keys, and nothing else. Do not wrap it in a code block.

If the job description is missing or you are not sure, return the entry unchanged.";

fn with_context(job_desc: &str, entry_json: &str, instructions: &str) -> String {
    format!(
        "Job Description:\n{}\n\nEntry:\n{}\n\n{}",
        job_desc.trim(),
        entry_json,
        instructions
    )
}

pub fn build_cleanup_prompt(job_desc: &str, entry_json: &str) -> String {
    with_context(job_desc, entry_json, CLEANUP_INSTRUCTIONS)
}

pub fn build_enhance_prompt(job_desc: &str, entry_json: &str) -> String {
    with_context(job_desc, entry_json, ENHANCE_INSTRUCTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_prompt_layout() {
        let p = build_cleanup_prompt("  Rust developer \n", "{\"name\": \"x\"}");
        assert!(p.starts_with("Job Description:\nRust developer\n\nEntry:\n{\"name\": \"x\"}\n\n"));
        assert!(p.contains("\"yes\" or \"no\""));
    }

    #[test]
    fn enhance_prompt_asks_for_json() {
        let p = build_enhance_prompt("Rust developer", "{}");
        assert!(p.contains("single JSON object"));
        assert!(p.contains("must not remove existing"));
    }
}
