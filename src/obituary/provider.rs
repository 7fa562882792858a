//! LLM provider integrations for obituary generation.
//!
//! Anthropic is spoken to through its Messages API. OpenAI and OpenRouter
//! share the Chat Completions wire format and are served by one client
//! configured with a different endpoint.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use super::ObituaryError;

/// Timeout for establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the entire request including response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Obituaries are a handful of sentences.
const MAX_TOKENS: u32 = 300;

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

// ==================== Types ====================

/// Supported LLM provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
    OpenRouter,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::OpenRouter => write!(f, "openrouter"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAI),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            other => Err(format!(
                "Unknown obituary provider: '{other}'. Expected one of: anthropic, openai, openrouter"
            )),
        }
    }
}

/// Text returned by a provider.
#[derive(Debug, Clone)]
pub struct ObituaryResponse {
    pub content: String,
}

// ==================== Trait ====================

/// Something that can turn a prompt into obituary prose.
///
/// Implemented by the HTTP providers below and by test doubles.
pub trait ObituaryProvider {
    fn write(&self, system_prompt: &str, user_content: &str)
        -> Result<ObituaryResponse, ObituaryError>;
}

// ==================== Anthropic ====================

/// Anthropic Messages API provider.
pub(crate) struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    pub(crate) fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    fn build_request_body(&self, system_prompt: &str, user_content: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt,
            "messages": [
                {
                    "role": "user",
                    "content": user_content,
                }
            ]
        })
    }
}

impl ObituaryProvider for AnthropicProvider {
    fn write(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<ObituaryResponse, ObituaryError> {
        let body = self.build_request_body(system_prompt, user_content);

        let request = self
            .client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body);

        let json = send_json(request)?;
        parse_anthropic_response(&json)
    }
}

// ==================== Chat Completions ====================

/// Provider for APIs speaking the OpenAI Chat Completions format.
pub(crate) struct ChatCompletionsProvider {
    client: Client,
    endpoint: &'static str,
    api_key: String,
    model: String,
    /// Extra headers sent with every request (OpenRouter attribution).
    extra_headers: &'static [(&'static str, &'static str)],
}

impl ChatCompletionsProvider {
    pub(crate) fn openai(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint: OPENAI_URL,
            api_key,
            model,
            extra_headers: &[],
        }
    }

    pub(crate) fn openrouter(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint: OPENROUTER_URL,
            api_key,
            model,
            extra_headers: &[("X-Title", "code-obituary")],
        }
    }

    fn build_request_body(&self, system_prompt: &str, user_content: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {
                    "role": "system",
                    "content": system_prompt,
                },
                {
                    "role": "user",
                    "content": user_content,
                }
            ]
        })
    }
}

impl ObituaryProvider for ChatCompletionsProvider {
    fn write(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<ObituaryResponse, ObituaryError> {
        let body = self.build_request_body(system_prompt, user_content);

        let mut request = self
            .client
            .post(self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");
        for (name, value) in self.extra_headers {
            request = request.header(*name, *value);
        }

        let json = send_json(request.json(&body))?;
        parse_chat_completions_response(&json)
    }
}

// ==================== Shared Helpers ====================

/// Sends a request and decodes a successful JSON response.
fn send_json(request: reqwest::blocking::RequestBuilder) -> Result<Value, ObituaryError> {
    let response = request
        .send()
        .map_err(|e| ObituaryError::RequestFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ObituaryError::HttpError {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .map_err(|e| ObituaryError::ParseError(e.to_string()))
}

/// Extracts `content[0].text` from an Anthropic Messages response.
fn parse_anthropic_response(json: &Value) -> Result<ObituaryResponse, ObituaryError> {
    let content = json
        .get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|item| item.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| {
            ObituaryError::ParseError("Missing content[0].text in Anthropic response".to_string())
        })?;

    Ok(ObituaryResponse {
        content: content.to_string(),
    })
}

/// Extracts `choices[0].message.content` from a Chat Completions response.
fn parse_chat_completions_response(json: &Value) -> Result<ObituaryResponse, ObituaryError> {
    let content = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            ObituaryError::ParseError("Missing choices[0].message.content in response".to_string())
        })?;

    Ok(ObituaryResponse {
        content: content.to_string(),
    })
}

// ==================== Factory ====================

/// Returns the default model for the given provider kind.
pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Anthropic => "claude-haiku-4-5",
        ProviderKind::OpenAI => "gpt-4o-mini",
        ProviderKind::OpenRouter => "meta-llama/llama-3.1-8b-instruct:free",
    }
}

/// Builds the blocking HTTP client shared by all providers.
fn build_client() -> Result<Client, ObituaryError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ObituaryError::RequestFailed(format!("Failed to build HTTP client: {e}")))
}

/// Creates a provider for the given kind.
///
/// If `model` is `None`, uses the default model for the provider kind.
pub fn create_provider(
    kind: ProviderKind,
    api_key: String,
    model: Option<String>,
) -> Result<Box<dyn ObituaryProvider>, ObituaryError> {
    let client = build_client()?;
    let model = model.unwrap_or_else(|| default_model(kind).to_string());

    let provider: Box<dyn ObituaryProvider> = match kind {
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(client, api_key, model)),
        ProviderKind::OpenAI => Box::new(ChatCompletionsProvider::openai(client, api_key, model)),
        ProviderKind::OpenRouter => {
            Box::new(ChatCompletionsProvider::openrouter(client, api_key, model))
        }
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models() {
        assert_eq!(default_model(ProviderKind::Anthropic), "claude-haiku-4-5");
        assert_eq!(default_model(ProviderKind::OpenAI), "gpt-4o-mini");
        assert_eq!(
            default_model(ProviderKind::OpenRouter),
            "meta-llama/llama-3.1-8b-instruct:free"
        );
    }

    #[test]
    fn test_provider_kind_display_round_trips() {
        for kind in [
            ProviderKind::Anthropic,
            ProviderKind::OpenAI,
            ProviderKind::OpenRouter,
        ] {
            assert_eq!(ProviderKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_provider_kind_from_str_case_insensitive() {
        assert_eq!(
            ProviderKind::from_str("ANTHROPIC").unwrap(),
            ProviderKind::Anthropic
        );
        assert_eq!(
            ProviderKind::from_str("OpenRouter").unwrap(),
            ProviderKind::OpenRouter
        );
    }

    #[test]
    fn test_provider_kind_from_str_unknown() {
        let err = ProviderKind::from_str("gemini").unwrap_err();
        assert!(err.contains("Unknown obituary provider"));
        assert!(err.contains("gemini"));
    }

    #[test]
    fn test_create_provider_builds_every_kind() {
        for kind in [
            ProviderKind::Anthropic,
            ProviderKind::OpenAI,
            ProviderKind::OpenRouter,
        ] {
            assert!(create_provider(kind, "test-key".to_string(), None).is_ok());
        }
    }

    #[test]
    fn test_anthropic_request_body() {
        let provider = AnthropicProvider::new(
            build_client().unwrap(),
            "test-key".to_string(),
            "claude-haiku-4-5".to_string(),
        );

        let body = provider.build_request_body("Be kind.", "Mourn this file.");

        assert_eq!(body["model"], "claude-haiku-4-5");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["system"], "Be kind.");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Mourn this file.");
    }

    #[test]
    fn test_chat_completions_request_body() {
        let provider = ChatCompletionsProvider::openrouter(
            build_client().unwrap(),
            "test-key".to_string(),
            "some/model".to_string(),
        );
        assert_eq!(provider.endpoint, OPENROUTER_URL);

        let body = provider.build_request_body("Be kind.", "Mourn this file.");

        assert_eq!(body["model"], "some/model");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "Mourn this file.");
    }

    #[test]
    fn test_parse_anthropic_response() {
        let json = serde_json::json!({
            "content": [{ "type": "text", "text": "It served well." }]
        });
        assert_eq!(parse_anthropic_response(&json).unwrap().content, "It served well.");

        let err = parse_anthropic_response(&serde_json::json!({ "content": [] })).unwrap_err();
        assert!(matches!(err, ObituaryError::ParseError(_)));
    }

    #[test]
    fn test_parse_chat_completions_response() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Rest now." } }]
        });
        assert_eq!(parse_chat_completions_response(&json).unwrap().content, "Rest now.");

        let err = parse_chat_completions_response(&serde_json::json!({})).unwrap_err();
        match err {
            ObituaryError::ParseError(msg) => assert!(msg.contains("choices[0].message.content")),
            other => panic!("Expected ParseError, got: {other:?}"),
        }
    }
}
