//! Request and response types exchanged over the HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Apology returned in place of a real answer when the model output cannot
/// be parsed.
pub const FALLBACK_ANSWER: &str =
    "I apologize, but I encountered an error processing the response.";

/// The answer returned by `POST /ask-question`.
///
/// The three named keys must be present, but their values are whatever the
/// model emitted: a numeric `answer` or `"Page 1"` page references are kept
/// as is. Any other keys are held in `extra` and serialised back at the top
/// level, so the model's object round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: Value,
    pub page_references: Value,
    pub explanation: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Answer {
    /// The soft-degrade answer: fixed apology, no pages, `explanation` set to
    /// the failure message.
    pub fn fallback(explanation: impl Into<String>) -> Self {
        Self {
            answer: Value::String(FALLBACK_ANSWER.to_string()),
            page_references: Value::Array(Vec::new()),
            explanation: Value::String(explanation.into()),
            extra: Map::new(),
        }
    }

    /// `true` if this is the soft-degrade answer.
    pub fn is_fallback(&self) -> bool {
        self.answer == FALLBACK_ANSWER
            && self
                .page_references
                .as_array()
                .is_some_and(|pages| pages.is_empty())
    }
}

/// Body of `POST /ask-question`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Filename of the document to answer against. When absent the store's
    /// active document is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            document: None,
        }
    }
}

/// `{"message": ...}` body used by the health and upload endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
