pub mod gemini;
pub mod prompt;
pub mod sample;
pub mod worker;

use serde_json::Value;
use thiserror::Error;

use crate::catalog::{Difficulty, Grade, QuestionType};
use crate::session::question::QuizQuestion;

/// Substrings the provider uses in responses that reject the API key.
const CREDENTIAL_ERROR_MARKERS: [&str; 2] = ["API key not valid", "Requested entity was not found"];

/// Parameters for one batch of generated questions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub grade: Grade,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub count: usize,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error reported by the service; the message is kept verbatim.
    #[error("{0}")]
    Api(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("Generated content is not a valid quiz question array: {0}")]
    Malformed(String),
    #[error("no API key is configured")]
    MissingKey,
    #[error("this build has no network support; run with --offline")]
    Unavailable,
}

impl ProviderError {
    /// Errors that mean the API key has to be replaced before retrying.
    pub fn is_credential_error(&self) -> bool {
        if matches!(self, ProviderError::MissingKey) {
            return true;
        }
        let message = self.to_string();
        CREDENTIAL_ERROR_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }
}

/// Produces quiz questions. Implementations run on a worker thread.
pub trait QuestionProvider: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<QuizQuestion>, ProviderError>;
}

/// Decode a JSON array of questions, keeping only well-formed items of the
/// requested type. A reply that is not a non-empty array is an error; a
/// reply whose items are all filtered out is an empty list.
pub fn parse_questions(
    text: &str,
    requested: QuestionType,
) -> Result<Vec<QuizQuestion>, ProviderError> {
    let text = strip_code_fence(text);
    let items: Vec<Value> = match serde_json::from_str(text) {
        Ok(Value::Array(items)) if !items.is_empty() => items,
        Ok(_) => return Err(ProviderError::Malformed("expected a non-empty array".to_string())),
        Err(e) => return Err(ProviderError::Malformed(e.to_string())),
    };

    let total = items.len();
    let mut questions = Vec::with_capacity(total);
    for item in items {
        if item.get("type").and_then(Value::as_str) != Some(requested.as_str()) {
            continue;
        }
        match serde_json::from_value::<QuizQuestion>(item) {
            Ok(q) if q.is_well_formed() => questions.push(q),
            Ok(q) => log::warn!("dropping malformed question: {:?}", q.prompt()),
            Err(e) => log::warn!("dropping undecodable question: {e}"),
        }
    }
    if questions.len() != total {
        log::warn!(
            "kept {} of {total} generated questions of type {requested}",
            questions.len()
        );
    }
    Ok(questions)
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_error_detection() {
        let bad_key = ProviderError::Api(
            "API key not valid. Please pass a valid API key.".to_string(),
        );
        assert!(bad_key.is_credential_error());
        assert!(ProviderError::Api("Requested entity was not found.".to_string())
            .is_credential_error());
        assert!(ProviderError::MissingKey.is_credential_error());
        assert!(!ProviderError::Api("quota exceeded".to_string()).is_credential_error());
        assert!(!ProviderError::Transport("timed out".to_string()).is_credential_error());
    }

    #[test]
    fn test_parse_filters_mismatched_types() {
        let text = r#"[
            {"type": "multiple-choice", "question": "Pick", "options": ["a", "b"], "correctAnswer": "a"},
            {"type": "fill-in-the-blank", "question": "I ___", "correctAnswer": "am"}
        ]"#;
        let qs = parse_questions(text, QuestionType::MultipleChoice).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].kind(), QuestionType::MultipleChoice);

        let qs = parse_questions(text, QuestionType::Matching).unwrap();
        assert!(qs.is_empty());
    }

    #[test]
    fn test_parse_drops_broken_items() {
        let text = r#"[
            {"type": "multiple-choice", "question": "Pick", "options": ["a", "b"], "correctAnswer": "c"},
            {"type": "multiple-choice", "question": "Pick"},
            {"type": "multiple-choice", "question": "Ok", "options": ["x", "y"], "correctAnswer": "y"}
        ]"#;
        let qs = parse_questions(text, QuestionType::MultipleChoice).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].prompt(), "Ok");
    }

    #[test]
    fn test_parse_rejects_non_arrays() {
        assert!(matches!(
            parse_questions("[]", QuestionType::Matching),
            Err(ProviderError::Malformed(_))
        ));
        assert!(matches!(
            parse_questions(r#"{"type": "matching"}"#, QuestionType::Matching),
            Err(ProviderError::Malformed(_))
        ));
        assert!(matches!(
            parse_questions("not json", QuestionType::Matching),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_accepts_fenced_reply() {
        let text = "```json\n[{\"type\": \"fill-in-the-blank\", \"question\": \"I ___\", \"correctAnswer\": \"am\"}]\n```";
        let qs = parse_questions(text, QuestionType::FillInTheBlank).unwrap();
        assert_eq!(qs.len(), 1);
    }
}
