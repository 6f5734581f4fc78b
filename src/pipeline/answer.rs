//! Answer parsing: turn generated text into an [`Answer`].
//!
//! The model is asked for a bare JSON object but often wraps it in prose or
//! code fences. The object is located with a simple heuristic:
//! everything from the **first** `{` to the **last** `}` of the
//! newline-collapsed text. That span is then parsed and checked for the three
//! required keys. Their values are passed through untouched, whatever their
//! JSON type.
//!
//! The heuristic has known blind spots, pinned by the tests below:
//!
//! - braces in prose before or after the object widen the span, which then
//!   fails to parse (or, if it still parses, is returned as is);
//! - two separate objects produce one span covering both, which fails to
//!   parse.
//!
//! Parsing never fails the request. [`parse_answer_or_fallback`] folds every
//! [`AnswerParseError`] into [`Answer::fallback`].

use crate::error::AnswerParseError;
use crate::output::Answer;
use crate::pipeline::postprocess::collapse_newlines;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Keys every answer object must carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["answer", "page_references", "explanation"];

/// The span from the first `{` to the last `}`, inclusive.
///
/// Returns `None` when either brace is missing. When the last `}` comes
/// before the first `{` the span is empty.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return Some("");
    }
    Some(&text[start..=end])
}

/// Parse generated text into an [`Answer`].
pub fn parse_answer(raw: &str) -> Result<Answer, AnswerParseError> {
    let cleaned = collapse_newlines(raw);
    let span = extract_json_span(&cleaned).ok_or(AnswerParseError::NoJsonObject)?;
    debug!("Attempting to parse JSON: {}", span);

    let value: Value =
        serde_json::from_str(span).map_err(|e| AnswerParseError::InvalidJson(e.to_string()))?;
    let mut object = match value {
        Value::Object(map) => map,
        other => {
            return Err(AnswerParseError::InvalidJson(format!(
                "expected a JSON object, got {}",
                other
            )))
        }
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(AnswerParseError::MissingFields(missing));
    }

    let answer = take(&mut object, "answer");
    let page_references = take(&mut object, "page_references");
    let explanation = take(&mut object, "explanation");

    Ok(Answer {
        answer,
        page_references,
        explanation,
        extra: object,
    })
}

/// Parse generated text, substituting the fallback answer on any failure.
pub fn parse_answer_or_fallback(raw: &str) -> Answer {
    match parse_answer(raw) {
        Ok(answer) => answer,
        Err(e) => {
            warn!("Could not parse model output: {}", e);
            Answer::fallback(e.to_string())
        }
    }
}

/// Remove a key whose presence has already been checked.
fn take(object: &mut Map<String, Value>, field: &str) -> Value {
    object.remove(field).unwrap_or_default()
}
