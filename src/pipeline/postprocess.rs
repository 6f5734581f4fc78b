//! Post-processing: deterministic cleanup of model output before parsing.
//!
//! Rules (applied in this order when enabled):
//! 1. Strip `<think>…</think>` reasoning blocks (opt-in, see
//!    [`crate::config::ServerConfig::strip_reasoning`])
//! 2. Collapse newlines to spaces and trim (always, inside
//!    [`crate::pipeline::answer::parse_answer`])
//!
//! Rule 1 is off by default. Reasoning models such as deepseek-r1 wrap
//! their chain of thought in `<think>` tags, and prose there may contain
//! braces that would otherwise be captured by the first-`{`/last-`}` span.

use once_cell::sync::Lazy;
use regex::Regex;

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid think-block regex"));

// ── Rule 1: Strip reasoning blocks ───────────────────────────────────────────

/// Remove every closed `<think>…</think>` block. An unclosed tag is left as is.
pub fn strip_reasoning(input: &str) -> String {
    THINK_BLOCK.replace_all(input, "").into_owned()
}

// ── Rule 2: Collapse newlines ────────────────────────────────────────────────

/// Replace each `\n` with a space and trim the result.
pub fn collapse_newlines(input: &str) -> String {
    input.replace('\n', " ").trim().to_string()
}
