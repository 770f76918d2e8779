use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::generator::prompt::{SYSTEM_INSTRUCTION, build_prompt, response_schema};
use crate::generator::{GenerationRequest, ProviderError, QuestionProvider, parse_questions};
use crate::session::question::QuizQuestion;

#[derive(Clone, Debug)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: f64,
}

/// Provider backed by the Gemini `generateContent` endpoint.
pub struct GeminiProvider {
    settings: GeminiSettings,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiProvider {
    pub fn new(settings: GeminiSettings) -> Self {
        Self { settings }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": build_prompt(request) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(request.question_type),
                "temperature": self.settings.temperature,
            }
        })
    }

    #[cfg(feature = "network")]
    fn post(&self, body: &Value) -> Result<(u16, String), ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.settings.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let response = client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.settings.api_key)
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok((status, text))
    }

    #[cfg(not(feature = "network"))]
    fn post(&self, _body: &Value) -> Result<(u16, String), ProviderError> {
        Err(ProviderError::Unavailable)
    }
}

impl QuestionProvider for GeminiProvider {
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<QuizQuestion>, ProviderError> {
        if self.settings.api_key.trim().is_empty() {
            return Err(ProviderError::MissingKey);
        }
        log::debug!("POST {}", self.endpoint());
        let (status, body) = self.post(&self.request_body(request))?;
        if !(200..300).contains(&status) {
            return Err(ProviderError::Api(error_message(status, &body)));
        }
        let text = reply_text(&body)?;
        parse_questions(&text, request.question_type)
    }
}

/// The service's own error message when the body carries one.
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => format!("HTTP {status}: {}", body.trim()),
    }
}

/// Concatenated text parts of the first candidate.
fn reply_text(body: &str) -> Result<String, ProviderError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ProviderError::Malformed("reply has no text".to_string()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Difficulty, Grade, QuestionType};

    fn provider(api_key: &str) -> GeminiProvider {
        GeminiProvider::new(GeminiSettings {
            api_key: api_key.to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://example.invalid/v1beta/".to_string(),
            timeout: Duration::from_secs(5),
            temperature: 0.8,
        })
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            grade: Grade::Five,
            topic: "Health".to_string(),
            difficulty: Difficulty::Easy,
            question_type: QuestionType::Matching,
            count: 2,
        }
    }

    #[test]
    fn test_endpoint_and_body() {
        let p = provider("k");
        assert_eq!(
            p.endpoint(),
            "https://example.invalid/v1beta/models/gemini-2.5-flash:generateContent"
        );
        let body = p.request_body(&request());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["temperature"], 0.8);
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(
            body["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("\"matching\"")
        );
    }

    #[test]
    fn test_missing_key_is_a_credential_error() {
        let err = provider("  ").generate(&request()).unwrap_err();
        assert!(matches!(err, ProviderError::MissingKey));
        assert!(err.is_credential_error());
    }

    #[test]
    fn test_error_message_is_preserved() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        let err = ProviderError::Api(error_message(400, body));
        assert!(err.is_credential_error());
        assert_eq!(error_message(502, "Bad Gateway"), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_reply_text_joins_parts() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "[{\"a\":"}, {"text": "1}]"}]}}]}"#;
        assert_eq!(reply_text(body).unwrap(), r#"[{"a":1}]"#);
        assert!(reply_text(r#"{"candidates": []}"#).is_err());
    }
}
