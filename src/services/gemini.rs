// src/services/gemini.rs
//! Google Generative Language (`generateContent`) implementation of [`ChatProvider`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{ChatProvider, ProviderError, Turn, TurnRole};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = concat!(
    "You are VakilSahab, a senior and experienced Indian advocate. ",
    "You speak politely and respectfully, mostly in Hindi, or in a Hindi and English mix ",
    "if the user writes in English. You give clear, practical legal information based ",
    "mainly on Indian law, and you remind the user to consult a practising lawyer before ",
    "acting on anything important.",
);

// Finish reasons for which the candidate carries no usable text.
const BAD_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "LANGUAGE",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub system_instruction: Option<String>,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("system_instruction", &self.system_instruction.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            top_p: 0.95,
            max_output_tokens: 8192,
            system_instruction: Some(DEFAULT_SYSTEM_INSTRUCTION.to_string()),
            timeout: None,
        }
    }
}

impl GeminiConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        self.system_instruction = instruction;
        self
    }
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn role_name(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
    }
}

/// Gemini-backed provider. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct GeminiProvider {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(10));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ProviderError::Client)?;
        Ok(Self { config, http })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request<'a>(
        &'a self,
        history: &'a [Turn],
        message: &'a str,
    ) -> GenerateContentRequest<'a> {
        let mut contents: Vec<Content<'a>> = history
            .iter()
            .map(|turn| Content {
                role: role_name(turn.role),
                parts: [Part { text: &turn.text }],
            })
            .collect();
        contents.push(Content {
            role: role_name(TurnRole::User),
            parts: [Part { text: message }],
        });

        GenerateContentRequest {
            contents,
            system_instruction: self
                .config
                .system_instruction
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|text| SystemInstruction { parts: [Part { text }] }),
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

/// Pull the reply text out of a decoded response, or explain why there is none.
fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BAD_FINISH_REASONS.contains(&reason) {
            return Err(ProviderError::Blocked(reason.to_string()));
        }
    }

    Ok(candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn generate(&self, history: &[Turn], message: &str) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey)?;

        debug!(model = %self.config.model, turns = history.len(), "Gemini API request");

        let response = self
            .http
            .post(self.api_url())
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(history, message))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status: status.as_u16(), body });
        }

        let body = response.text().await?;
        let decoded: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        extract_text(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(config: GeminiConfig) -> GeminiProvider {
        GeminiProvider::new(config).unwrap()
    }

    #[test]
    fn request_body_carries_history_and_generation_config() {
        let gemini = provider(GeminiConfig::default());
        let history = vec![Turn::user("Hi"), Turn::model("Namaste")];

        let body = serde_json::to_value(gemini.build_request(&history, "And then?")).unwrap();

        assert_eq!(
            body["contents"],
            json!([
                { "role": "user", "parts": [{ "text": "Hi" }] },
                { "role": "model", "parts": [{ "text": "Namaste" }] },
                { "role": "user", "parts": [{ "text": "And then?" }] },
            ])
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        let top_p = body["generationConfig"]["topP"].as_f64().unwrap();
        assert_eq!((top_p * 100.0).round(), 95.0);
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("VakilSahab"));
    }

    #[test]
    fn empty_system_instruction_is_omitted() {
        let gemini = provider(GeminiConfig::default().with_system_instruction(Some(String::new())));
        let body = serde_json::to_value(gemini.build_request(&[], "x")).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn url_joins_base_and_model() {
        let gemini = provider(
            GeminiConfig::default()
                .with_base_url("http://localhost:9999/v1beta/")
                .with_model("gemini-pro"),
        );
        assert_eq!(
            gemini.api_url(),
            "http://localhost:9999/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", GeminiConfig::default().with_api_key("sk-very-secret"));
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("REDACTED"));
    }

    fn decode(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extract_concatenates_parts() {
        let response = decode(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "there" }] },
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(extract_text(response).unwrap(), "Hello there");
    }

    #[test]
    fn extract_reports_blocked_prompt() {
        let response = decode(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        assert!(matches!(extract_text(response), Err(ProviderError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn extract_reports_bad_finish_reason() {
        let response = decode(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "RECITATION" }]
        }));
        assert!(matches!(
            extract_text(response),
            Err(ProviderError::Blocked(r)) if r == "RECITATION"
        ));
    }

    #[test]
    fn extract_reports_missing_candidates() {
        assert!(matches!(
            extract_text(decode(json!({}))),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let gemini = provider(GeminiConfig::default().with_base_url("http://127.0.0.1:1"));
        let err = gemini.generate(&[], "Hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }
}
