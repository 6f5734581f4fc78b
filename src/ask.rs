//! Question answering entry point.
//!
//! [`answer_question`] composes the ask pipeline: pick the document, render
//! the prompt, call the model, parse its output. Only the first three steps
//! can fail; parsing degrades to [`Answer::fallback`] instead.

use crate::config::ServerConfig;
use crate::error::PdfQaError;
use crate::output::{Answer, AskRequest};
use crate::pipeline::{answer, llm::InferenceClient, postprocess};
use crate::prompts::build_prompt;
use crate::store::{DocumentStore, StoredDocument};
use std::time::Instant;
use tracing::{debug, info};

/// Answer `request` against the stored documents.
///
/// # Errors
/// Returns `Err(PdfQaError)` only for hard faults:
/// - the store is empty, or the named document does not exist
/// - the inference endpoint is unreachable, times out, or answers non-2xx
///
/// Unparseable model output is **not** an error; the fallback answer is
/// returned with the failure message as its `explanation`.
pub async fn answer_question(
    store: &dyn DocumentStore,
    client: &dyn InferenceClient,
    config: &ServerConfig,
    request: &AskRequest,
) -> Result<Answer, PdfQaError> {
    let start = Instant::now();

    // ── Step 1: Pick the document ────────────────────────────────────────
    let document = select_document(store, request.document.as_deref())?;
    info!(
        "Answering question against '{}' ({} pages)",
        document.filename, document.page_count
    );

    // ── Step 2: Render the prompt ────────────────────────────────────────
    let prompt = build_prompt(&document.text, &request.question);
    debug!("Sending prompt to inference endpoint: {}", prompt);

    // ── Step 3: Generate ─────────────────────────────────────────────────
    let raw = client
        .generate(&prompt, config.inference_timeout())
        .await?;
    debug!("Raw answer from model: {}", raw);

    // ── Step 4: Parse, degrading on failure ──────────────────────────────
    let raw = if config.strip_reasoning {
        postprocess::strip_reasoning(&raw)
    } else {
        raw
    };
    let result = answer::parse_answer_or_fallback(&raw);

    info!(
        "Question answered in {:?}{}",
        start.elapsed(),
        if result.is_fallback() {
            " (fallback)"
        } else {
            ""
        }
    );

    Ok(result)
}

fn select_document(
    store: &dyn DocumentStore,
    filename: Option<&str>,
) -> Result<StoredDocument, PdfQaError> {
    match filename {
        Some(name) => store
            .get(name)
            .ok_or_else(|| PdfQaError::DocumentNotFound {
                filename: name.to_string(),
            }),
        None => store.get_active(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::FALLBACK_ANSWER;
    use crate::store::InMemoryDocumentStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct Scripted {
        reply: Result<String, u16>,
        prompts: Mutex<Vec<String>>,
        timeouts: Mutex<Vec<Option<Duration>>>,
    }

    impl Scripted {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
                timeouts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceClient for Scripted {
        async fn generate(
            &self,
            prompt: &str,
            timeout: Option<Duration>,
        ) -> Result<String, PdfQaError> {
            self.prompts.lock().push(prompt.to_string());
            self.timeouts.lock().push(timeout);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(PdfQaError::InferenceStatus {
                    status: *status,
                    body: "boom".into(),
                }),
            }
        }
    }

    fn store_with(docs: &[(&str, &str)]) -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::default();
        for (name, text) in docs {
            store.put(name, text.to_string(), 1);
        }
        store
    }

    #[tokio::test]
    async fn empty_store_is_no_document() {
        let client = Scripted::replying("{}");
        let err = answer_question(
            &InMemoryDocumentStore::default(),
            &client,
            &ServerConfig::default(),
            &AskRequest::new("q"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PdfQaError::NoDocument));
        assert!(client.prompts.lock().is_empty(), "model must not be called");
    }

    #[tokio::test]
    async fn named_document_is_used() {
        let store = store_with(&[("a.pdf", "AAA\n"), ("b.pdf", "BBB\n")]);
        let client = Scripted::replying(r#"{"answer":"B","page_references":[1],"explanation":"e"}"#);
        let mut request = AskRequest::new("q");
        request.document = Some("b.pdf".into());

        let answer = answer_question(&store, &client, &ServerConfig::default(), &request)
            .await
            .unwrap();
        assert_eq!(answer.answer, "B");
        assert!(client.prompts.lock()[0].contains("BBB"));
    }

    #[tokio::test]
    async fn unknown_named_document_is_not_found() {
        let store = store_with(&[("a.pdf", "AAA\n")]);
        let client = Scripted::replying("{}");
        let mut request = AskRequest::new("q");
        request.document = Some("missing.pdf".into());

        let err = answer_question(&store, &client, &ServerConfig::default(), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfQaError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn configured_timeout_is_passed_through() {
        let store = store_with(&[("a.pdf", "AAA\n")]);
        let client = Scripted::replying("no json");
        let config = ServerConfig::builder()
            .inference_timeout_secs(7)
            .build()
            .unwrap();

        answer_question(&store, &client, &config, &AskRequest::new("q"))
            .await
            .unwrap();
        assert_eq!(client.timeouts.lock()[0], Some(Duration::from_secs(7)));
    }

    #[tokio::test]
    async fn default_config_waits_indefinitely() {
        let store = store_with(&[("a.pdf", "AAA\n")]);
        let client = Scripted::replying("no json");
        answer_question(&store, &client, &ServerConfig::default(), &AskRequest::new("q"))
            .await
            .unwrap();
        assert_eq!(client.timeouts.lock()[0], None);
    }

    #[tokio::test]
    async fn reasoning_stripped_only_when_enabled() {
        let store = store_with(&[("a.pdf", "AAA\n")]);
        let reply =
            r#"<think>is it {this}?</think>{"answer":"X","page_references":[2],"explanation":"Y"}"#;

        let client = Scripted::replying(reply);
        let plain = answer_question(&store, &client, &ServerConfig::default(), &AskRequest::new("q"))
            .await
            .unwrap();
        assert_eq!(plain.answer, FALLBACK_ANSWER);

        let config = ServerConfig::builder().strip_reasoning(true).build().unwrap();
        let stripped = answer_question(&store, &client, &config, &AskRequest::new("q"))
            .await
            .unwrap();
        assert_eq!(stripped.answer, "X");
        assert_eq!(stripped.page_references, serde_json::json!([2]));
    }

    #[tokio::test]
    async fn inference_errors_are_hard_faults() {
        let store = store_with(&[("a.pdf", "AAA\n")]);
        let client = Scripted {
            reply: Err(503),
            prompts: Mutex::new(Vec::new()),
            timeouts: Mutex::new(Vec::new()),
        };
        let err = answer_question(&store, &client, &ServerConfig::default(), &AskRequest::new("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfQaError::InferenceStatus { status: 503, .. }));
    }
}
