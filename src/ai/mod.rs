//! Interpretation client for an OpenAI-compatible chat completions API
//!
//! One non-streaming request per note. Every failure maps to an `AiError`
//! variant so callers can decide to save the note without an interpretation.

mod prompt;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::AiError;
use crate::model::{AiInterpretation, GitSnapshot};

pub use prompt::{build_prompt, PROMPT_COMMITS};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const TEMPERATURE: f64 = 0.3;
pub const MAX_TOKENS: u32 = 1000;

/// Everything the client needs, resolved by the caller
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

pub struct InterpretationClient {
    options: ClientOptions,
    http: reqwest::Client,
}

impl InterpretationClient {
    pub fn new(options: ClientOptions) -> Self {
        let base_url = options.base_url.trim_end_matches('/').to_string();
        Self {
            options: ClientOptions { base_url, ..options },
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.options.base_url)
    }

    pub async fn interpret(
        &self,
        message: &str,
        snapshot: &GitSnapshot,
    ) -> Result<AiInterpretation, AiError> {
        let prompt = build_prompt(message, snapshot);
        let body = self.complete(&prompt).await?;
        parse_completion(&body)
    }

    /// Round-trip a minimal prompt to verify credential, model and endpoint
    pub async fn check_connection(&self) -> Result<(), AiError> {
        let body = self.complete("Reply with the single word OK.").await?;
        completion_content(&body).map(|_| ())
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self
            .options
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AiError::MissingApiKey)?;

        debug!(model = %self.options.model, url = %self.url(), "requesting completion");
        let response = self
            .http
            .post(self.url())
            .bearer_auth(api_key)
            .json(&request_payload(&self.options.model, prompt))
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = text.len(), "completion response");

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &text));
        }
        Ok(text)
    }
}

pub fn request_payload(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": TEMPERATURE,
        "max_tokens": MAX_TOKENS,
    })
}

/// Map a non-2xx response to an error, keeping the upstream message when the
/// body carries one.
pub fn status_error(status: u16, body: &str) -> AiError {
    if status == 429 {
        return AiError::RateLimited;
    }
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                trimmed.to_string()
            }
        });
    AiError::Upstream { status, message }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn completion_content(body: &str) -> Result<String, AiError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| AiError::MalformedJson(e.to_string()))?;
    let choice = response.choices.into_iter().next().ok_or(AiError::NoChoices)?;
    choice
        .message
        .content
        .ok_or_else(|| AiError::MalformedJson("response choice has no content".to_string()))
}

/// Parse a full chat completion body into an interpretation
pub fn parse_completion(body: &str) -> Result<AiInterpretation, AiError> {
    let content = completion_content(body)?;
    parse_interpretation(&content)
}

/// Parse the model's JSON document. Confidence is clamped into [0, 1].
pub fn parse_interpretation(content: &str) -> Result<AiInterpretation, AiError> {
    let value: Value = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| AiError::MalformedJson(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(AiError::MalformedJson(
            "expected a JSON object".to_string(),
        ));
    };

    let confidence = required(&fields, "confidenceScore")?
        .as_f64()
        .ok_or(AiError::InvalidField {
            field: "confidenceScore",
            expected: "a number",
        })?;

    Ok(AiInterpretation {
        summary: string_field(&fields, "summary")?,
        technical_context: string_field(&fields, "technicalContext")?,
        suggested_next_steps: string_list_field(&fields, "suggestedNextSteps")?,
        related_files: string_list_field(&fields, "relatedFiles")?,
        confidence_score: confidence.clamp(0.0, 1.0),
    })
}

fn required<'a>(fields: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, AiError> {
    fields.get(name).ok_or(AiError::MissingField(name))
}

fn string_field(fields: &Map<String, Value>, name: &'static str) -> Result<String, AiError> {
    required(fields, name)?
        .as_str()
        .map(str::to_string)
        .ok_or(AiError::InvalidField {
            field: name,
            expected: "a string",
        })
}

fn string_list_field(fields: &Map<String, Value>, name: &'static str) -> Result<Vec<String>, AiError> {
    let invalid = AiError::InvalidField {
        field: name,
        expected: "an array of strings",
    };
    let Some(items) = required(fields, name)?.as_array() else {
        return Err(invalid);
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or(invalid)
}

/// Models sometimes wrap JSON in a ```json fence
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkingTreeStatus;

    fn completion(content: &str) -> String {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    fn full_document(confidence: f64) -> String {
        json!({
            "summary": "Adding OAuth login",
            "technicalContext": "Token exchange implemented, callback pending",
            "suggestedNextSteps": ["Handle callback", "Add tests"],
            "relatedFiles": ["src/auth.rs"],
            "confidenceScore": confidence,
        })
        .to_string()
    }

    fn snapshot() -> GitSnapshot {
        GitSnapshot {
            branch: "main".to_string(),
            commits: vec![],
            status: WorkingTreeStatus::default(),
            repo_path: "/repo".to_string(),
        }
    }

    #[test]
    fn test_parse_valid_completion() {
        let interpretation = parse_completion(&completion(&full_document(0.8))).unwrap();
        assert_eq!(interpretation.summary, "Adding OAuth login");
        assert_eq!(interpretation.suggested_next_steps.len(), 2);
        assert_eq!(interpretation.related_files, vec!["src/auth.rs"]);
        assert_eq!(interpretation.confidence_score, 0.8);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let high = parse_completion(&completion(&full_document(1.5))).unwrap();
        assert_eq!(high.confidence_score, 1.0);
        let low = parse_completion(&completion(&full_document(-0.2))).unwrap();
        assert_eq!(low.confidence_score, 0.0);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        for field in [
            "summary",
            "technicalContext",
            "suggestedNextSteps",
            "relatedFiles",
            "confidenceScore",
        ] {
            let mut doc: Value = serde_json::from_str(&full_document(0.5)).unwrap();
            doc.as_object_mut().unwrap().remove(field);
            let err = parse_completion(&completion(&doc.to_string())).unwrap_err();
            assert!(
                matches!(err, AiError::MissingField(name) if name == field),
                "expected missing {}, got {:?}",
                field,
                err
            );
        }
    }

    #[test]
    fn test_non_array_list_is_rejected() {
        let mut doc: Value = serde_json::from_str(&full_document(0.5)).unwrap();
        doc["relatedFiles"] = json!("src/auth.rs");
        let err = parse_completion(&completion(&doc.to_string())).unwrap_err();
        assert!(matches!(
            err,
            AiError::InvalidField {
                field: "relatedFiles",
                ..
            }
        ));
    }

    #[test]
    fn test_no_choices_differs_from_malformed() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, AiError::NoChoices));

        let err = parse_completion(&completion("this is not json")).unwrap_err();
        assert!(matches!(err, AiError::MalformedJson(_)));

        let err = parse_completion("<html>").unwrap_err();
        assert!(matches!(err, AiError::MalformedJson(_)));
    }

    #[test]
    fn test_fenced_content() {
        let fenced = format!("```json\n{}\n```", full_document(0.4));
        let interpretation = parse_completion(&completion(&fenced)).unwrap();
        assert_eq!(interpretation.confidence_score, 0.4);
    }

    #[test]
    fn test_status_errors() {
        assert!(matches!(status_error(429, ""), AiError::RateLimited));

        let err = status_error(500, r#"{"error": {"message": "server exploded"}}"#);
        match err {
            AiError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "server exploded");
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            status_error(401, "unauthorized"),
            AiError::Upstream { status: 401, .. }
        ));
    }

    #[test]
    fn test_request_payload() {
        let payload = request_payload("gpt-4o-mini", "hello");
        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "hello");
        assert_eq!(payload["temperature"], TEMPERATURE);
        assert_eq!(payload["max_tokens"], MAX_TOKENS);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let client = InterpretationClient::new(ClientOptions {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "http://203.0.113.1/v1".to_string(),
        });
        let err = client.interpret("note", &snapshot()).await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey));
        let err = client.check_connection().await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = InterpretationClient::new(ClientOptions {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o-mini".to_string(),
            base_url: "http://127.0.0.1:9/v1/".to_string(),
        });
        let err = client.interpret("note", &snapshot()).await.unwrap_err();
        assert!(matches!(err, AiError::Network(_)));
    }
}
