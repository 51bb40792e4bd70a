//! Structured error types for the Termania control core.

use thiserror::Error;

/// Primary error type for core operations.
///
/// None of these ever cross the C ABI: every `extern "C"` entry point
/// consumes its `Result<_, CoreError>` internally and returns a safe
/// default.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("text tap: failed to bind socket at {path}: {source}")]
    TapBind {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("text tap: i/o error: {0}")]
    TapIo(#[from] std::io::Error),

    #[error("action parse error: {0}")]
    ActionParse(#[from] ParseError),

    #[error("llm request failed with status {status}")]
    LlmHttp { status: u16 },

    #[error("llm response had an unexpected shape")]
    LlmInvalidResponse,

    #[error("llm transport error: {0}")]
    LlmTransport(String),

    #[error("config parse error: {detail}")]
    ConfigParse { detail: String },

    #[error("failed to spawn pty: {0}")]
    PtySpawn(String),

    #[error("pty i/o error: {0}")]
    PtyIo(String),
}

/// Errors from `extract_json` / `parse_actions`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object found in input")]
    NoJsonFound,

    #[error("root value is not a JSON object")]
    RootNotObject,

    #[error("missing required \"actions\" field")]
    NoActionsField,

    #[error("\"actions\" field is not an array")]
    InvalidActions,

    #[error("malformed JSON: {0}")]
    Malformed(String),
}
