//! Prompt template for document question answering.
//!
//! The whole document is embedded verbatim: nothing is truncated, chunked or
//! budgeted, so a large enough PDF can exceed the model's context window.

/// Instruction appended after the question. Asks for a bare JSON object with
/// exactly the keys the answer parser requires.
pub const ANSWER_FORMAT_INSTRUCTIONS: &str = r#"Please provide a direct answer to the question, including the page numbers where the answer can be found and a brief explanation.

IMPORTANT: Your response must be a valid JSON object with exactly this structure:
{
    "answer": "your answer here",
    "page_references": [1, 2, 3],
    "explanation": "your explanation here"
}

Do not include any text before or after the JSON object. The response must be a single, valid JSON object."#;

/// Render the prompt sent to the inference endpoint.
pub fn build_prompt(document_text: &str, question: &str) -> String {
    format!(
        "Context from PDF:\n{}\n\nQuestion: {}\n\n{}",
        document_text, question, ANSWER_FORMAT_INSTRUCTIONS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_text_and_question_verbatim() {
        let text = "Page one {braces} stay\nPage two\n";
        let question = "What is on page \"two\"?";
        let prompt = build_prompt(text, question);
        assert!(prompt.contains(text));
        assert!(prompt.contains(&format!("Question: {question}")));
    }

    #[test]
    fn requests_exact_json_keys() {
        let prompt = build_prompt("", "q");
        for key in ["\"answer\"", "\"page_references\"", "\"explanation\""] {
            assert!(prompt.contains(key), "missing {key}");
        }
        assert!(prompt.contains("Do not include any text before or after the JSON object"));
    }

    #[test]
    fn large_documents_are_not_truncated() {
        let text = "x".repeat(1_000_000);
        let prompt = build_prompt(&text, "q");
        assert!(prompt.len() > text.len());
    }
}
