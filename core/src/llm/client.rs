//! HTTP transport for the LLM client (`spec.md` §4.G).
//!
//! Performs one provider-adaptive request per `poll()` call, using a
//! blocking `reqwest` client: `spec.md` §4.G/§5 deliberately keep this
//! synchronous (the host is documented to call it from a context where
//! a multi-second stall is acceptable) rather than pull in an async
//! runtime for the sake of one request type.

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::prompt::{build_system_prompt, PaneContext};
use super::{LlmConfig, LlmResponse};
use crate::action::parser::{extract_json, parse_actions};
use crate::action::Action;
use crate::error::CoreError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<OpenAiMessage<'a>>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

pub struct LlmClient {
    http: HttpClient,
}

impl Default for LlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmClient {
    pub fn new() -> Self {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("building the blocking HTTP client with static config cannot fail");
        Self { http }
    }

    /// Build the system prompt from live pane context, perform the
    /// HTTP call, and parse the reply back into an [`LlmResponse`]
    /// (`spec.md` §4.G). On parse failure, the raw text is wrapped in
    /// a single `Message` action so the user always sees something.
    pub fn request(
        &self,
        config: &LlmConfig,
        panes: &[PaneContext],
        user_prompt: &str,
    ) -> Result<LlmResponse, CoreError> {
        let system = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| build_system_prompt(panes));
        let model = config.resolved_model();
        let url = config.resolved_base_url();

        info!(provider = %config.provider, model = %model, "submitting llm request");

        let raw_text = if config.is_anthropic() {
            self.call_anthropic(config, &url, &model, &system, user_prompt)?
        } else {
            self.call_openai(config, &url, &model, &system, user_prompt)?
        };

        Ok(actions_from_text(&raw_text))
    }

    fn call_anthropic(
        &self,
        config: &LlmConfig,
        url: &str,
        model: &str,
        system: &str,
        user_prompt: &str,
    ) -> Result<String, CoreError> {
        let body = AnthropicRequest {
            model,
            max_tokens: config.max_tokens,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: user_prompt,
            }],
        };

        let mut req = self
            .http
            .post(url)
            .header("content-type", "application/json")
            .header("anthropic-version", ANTHROPIC_VERSION);
        if let Some(key) = &config.api_key {
            req = req.header("x-api-key", key);
        }

        let response = req
            .json(&body)
            .send()
            .map_err(|e| CoreError::LlmTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "llm request returned non-200");
            return Err(CoreError::LlmHttp {
                status: status.as_u16(),
            });
        }

        let root: Value = response
            .json()
            .map_err(|e| CoreError::LlmTransport(e.to_string()))?;
        root.get("content")
            .and_then(|c| c.get(0))
            .and_then(|first| first.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(CoreError::LlmInvalidResponse)
    }

    fn call_openai(
        &self,
        config: &LlmConfig,
        url: &str,
        model: &str,
        system: &str,
        user_prompt: &str,
    ) -> Result<String, CoreError> {
        let body = OpenAiRequest {
            model,
            max_tokens: config.max_tokens,
            messages: vec![
                OpenAiMessage {
                    role: "system",
                    content: system,
                },
                OpenAiMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        let mut req = self.http.post(url).header("content-type", "application/json");
        if let Some(key) = &config.api_key {
            if !key.is_empty() {
                req = req.header("authorization", format!("Bearer {key}"));
            }
        }

        let response = req
            .json(&body)
            .send()
            .map_err(|e| CoreError::LlmTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "llm request returned non-200");
            return Err(CoreError::LlmHttp {
                status: status.as_u16(),
            });
        }

        let root: Value = response
            .json()
            .map_err(|e| CoreError::LlmTransport(e.to_string()))?;
        root.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|first| first.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(CoreError::LlmInvalidResponse)
    }
}

/// Run the extract-JSON/parse-actions pipeline over raw model text; on
/// any failure, synthesize a single `Message` action carrying the raw
/// text (`spec.md` §4.G "action extraction").
fn actions_from_text(raw_text: &str) -> LlmResponse {
    let extracted = extract_json(raw_text);
    let parsed = extracted.and_then(|json| parse_actions(json).ok());

    match parsed {
        Some(parsed) => LlmResponse {
            explanation: parsed.explanation,
            actions: parsed.actions,
        },
        None => {
            debug!("llm response was not valid action json, falling back to a message action");
            LlmResponse {
                explanation: String::new(),
                actions: vec![Action::Message {
                    text: raw_text.to_string(),
                }],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_message_action_on_unparseable_text() {
        let response = actions_from_text("I couldn't find any matching actions, sorry.");
        assert_eq!(response.actions.len(), 1);
        match &response.actions[0] {
            Action::Message { text } => assert!(text.contains("couldn't find")),
            other => panic!("expected Message action, got {other:?}"),
        }
    }

    #[test]
    fn extracts_actions_from_fenced_response() {
        let text = "Sure, here:\n```json\n{\"explanation\":\"ok\",\"actions\":[{\"type\":\"message\",\"text\":\"hi\"}]}\n```\n";
        let response = actions_from_text(text);
        assert_eq!(response.explanation, "ok");
        assert_eq!(
            response.actions,
            vec![Action::Message {
                text: "hi".to_string()
            }]
        );
    }
}
