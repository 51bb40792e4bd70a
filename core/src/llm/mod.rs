//! The LLM client.
//!
//! A dual-format HTTP client: Anthropic Messages or OpenAI-compatible
//! Chat Completions, selected by [`LlmConfig::provider`]. The request
//! is driven by an explicit `submit -> poll` two-step on the
//! controller rather than performed inline, so the host chooses when
//! the multi-second HTTP stall is acceptable (see `DESIGN.md`).

pub mod client;
pub mod prompt;

pub use client::LlmClient;
pub use prompt::{build_system_prompt, PaneContext};

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Default max-tokens used when a config omits it.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `"anthropic"`/`"claude"` selects the Messages API; anything
    /// else (`"openai"`, `"ollama"`, `"lmstudio"`, `"custom"`, ...)
    /// selects OpenAI-compatible Chat Completions.
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl LlmConfig {
    pub fn is_anthropic(&self) -> bool {
        matches!(self.provider.to_lowercase().as_str(), "anthropic" | "claude")
    }

    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.clone();
        }
        if self.is_anthropic() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            "https://api.openai.com/v1/chat/completions".to_string()
        }
    }

    pub fn resolved_model(&self) -> String {
        if let Some(model) = &self.model {
            return model.clone();
        }
        if self.is_anthropic() {
            "claude-sonnet-4-20250514".to_string()
        } else {
            "gpt-4o".to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmStatus {
    Idle,
    Waiting,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    pub explanation: String,
    pub actions: Vec<Action>,
}

/// Holds the submit/poll state machine: `submit` only records the
/// prompt; the host's later `poll` call performs the (synchronous,
/// potentially multi-second) HTTP request.
pub struct LlmClientState {
    pub config: LlmConfig,
    pub status: LlmStatus,
    pub last_response: Option<LlmResponse>,
    pub last_error: Option<String>,
    pending_prompt: Option<String>,
}

impl LlmClientState {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            status: LlmStatus::Idle,
            last_response: None,
            last_error: None,
            pending_prompt: None,
        }
    }

    pub fn submit(&mut self, prompt: impl Into<String>) {
        self.pending_prompt = Some(prompt.into());
        self.status = LlmStatus::Waiting;
    }

    pub fn take_pending_prompt(&mut self) -> Option<String> {
        self.pending_prompt.take()
    }

    /// Clear the held response and reset to `Idle`.
    pub fn clear_response(&mut self) {
        self.last_response = None;
        self.status = LlmStatus::Idle;
    }
}
