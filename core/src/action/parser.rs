//! JSON action parser.
//!
//! Two responsibilities: pulling a JSON object out of possibly-fenced
//! Markdown text, and turning that object into a list of [`Action`]s.
//! A single malformed action in a batch is never fatal — it is skipped
//! and logged, matching both the Text Tap and the LLM response paths.

use serde_json::Value;
use tracing::debug;

use super::{Action, SendTarget};
use crate::error::ParseError;

/// Result of [`parse_actions`]: the assistant's free-text explanation
/// plus the actions it requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedActions {
    pub explanation: String,
    pub actions: Vec<Action>,
}

/// Extract a JSON object from `text`, trying in order:
/// 1. the whole trimmed input, if it starts with `{`;
/// 2. a ```` ```json ... ``` ```` fenced block;
/// 3. a generic ```` ``` ... ``` ```` fenced block whose body starts with `{`;
/// 4. the substring from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return Some(trimmed);
    }

    if let Some(inner) = extract_fenced(text, Some("json")) {
        return Some(inner);
    }
    if let Some(inner) = extract_fenced(text, None) {
        if inner.trim_start().starts_with('{') {
            return Some(inner);
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Find a fenced code block. When `lang` is `Some("json")` only a
/// fence whose info string is exactly `json` matches; when `lang` is
/// `None` any fence matches (the language-tag line, if present, is
/// skipped).
fn extract_fenced(text: &str, lang: Option<&str>) -> Option<&str> {
    let fence = "```";
    let mut search_from = 0;
    while let Some(rel_start) = text[search_from..].find(fence) {
        let open_at = search_from + rel_start;
        let after_open = open_at + fence.len();
        let line_end = text[after_open..].find('\n').map(|i| after_open + i);
        let (info, body_start) = match line_end {
            Some(le) => (text[after_open..le].trim(), le + 1),
            None => ("", after_open),
        };

        match lang {
            Some(expected) => {
                if info != expected {
                    search_from = after_open;
                    continue;
                }
            }
            None => {
                // Any fence is acceptable; an info string (or none) is fine.
            }
        }

        if let Some(rel_close) = text[body_start..].find(fence) {
            let close_at = body_start + rel_close;
            return Some(text[body_start..close_at].trim());
        }
        search_from = after_open;
    }
    None
}

/// Parse a JSON object (already extracted, or a raw `{...}` string)
/// into a [`ParsedActions`], dispatching on each action object's
/// `"type"` field.
pub fn parse_actions(json_text: &str) -> Result<ParsedActions, ParseError> {
    let root: Value =
        serde_json::from_str(json_text).map_err(|e| ParseError::Malformed(e.to_string()))?;
    let obj = root.as_object().ok_or(ParseError::RootNotObject)?;

    let explanation = obj
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let actions_value = obj.get("actions").ok_or(ParseError::NoActionsField)?;
    let actions_array = actions_value
        .as_array()
        .ok_or(ParseError::InvalidActions)?;

    let mut actions = Vec::with_capacity(actions_array.len());
    for item in actions_array {
        match build_action(item) {
            Some(action) => actions.push(action),
            None => {
                debug!(item = %item, "skipping unrecognized or incomplete action");
            }
        }
    }

    Ok(ParsedActions {
        explanation,
        actions,
    })
}

/// Non-negative-integer field lookup. Numeric fields with negative
/// integer values are treated as missing: we read via `as_u64`, which
/// already rejects negative JSON numbers.
fn field_u64(obj: &serde_json::Map<String, Value>, key: &str) -> Option<u64> {
    obj.get(key).and_then(Value::as_u64)
}

fn field_u32(obj: &serde_json::Map<String, Value>, key: &str) -> Option<u32> {
    field_u64(obj, key).and_then(|v| u32::try_from(v).ok())
}

fn field_str(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn field_str_opt(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    field_str(obj, key)
}

fn field_bool(obj: &serde_json::Map<String, Value>, key: &str, default: bool) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Table-driven dispatch on `"type"`. Returns `None` for any item that
/// isn't an object, lacks a string `"type"`, doesn't match a known
/// type, or is missing a required field for its type.
fn build_action(item: &Value) -> Option<Action> {
    let obj = item.as_object()?;
    let ty = obj.get("type")?.as_str()?;

    match ty {
        "send_command" => Some(Action::SendCommand {
            pane: field_u32(obj, "pane")?,
            command: field_str(obj, "command")?,
        }),
        "send_to_all" => Some(Action::SendToAll {
            command: field_str(obj, "command")?,
        }),
        "set_title" => Some(Action::SetTitle {
            pane: field_u32(obj, "pane")?,
            title: field_str(obj, "title")?,
        }),
        "set_watermark" => Some(Action::SetWatermark {
            pane: field_u32(obj, "pane")?,
            watermark: field_str(obj, "watermark")?,
        }),
        "clear_watermark" => Some(Action::ClearWatermark {
            pane: field_u32(obj, "pane")?,
        }),
        "navigate" => Some(Action::Navigate {
            pane: field_u32(obj, "pane")?,
            url: field_str(obj, "url")?,
        }),
        "set_content" => Some(Action::SetContent {
            pane: field_u32(obj, "pane")?,
            content: field_str(obj, "content")?,
        }),
        "spawn_pane" => Some(Action::SpawnPane {
            pane_type: field_str(obj, "pane_type").unwrap_or_else(|| "terminal".to_string()),
            title: field_str_opt(obj, "title"),
            command: field_str_opt(obj, "command"),
            cwd: field_str_opt(obj, "cwd"),
            url: field_str_opt(obj, "url"),
            content: field_str_opt(obj, "content"),
            watermark: field_str_opt(obj, "watermark"),
            row: field_u32(obj, "row"),
        }),
        "close_pane" => Some(Action::ClosePane {
            pane: field_u32(obj, "pane")?,
        }),
        "replace_pane" => Some(Action::ReplacePane {
            pane: field_u32(obj, "pane")?,
            pane_type: field_str(obj, "pane_type").unwrap_or_else(|| "terminal".to_string()),
            title: field_str_opt(obj, "title"),
            command: field_str_opt(obj, "command"),
            cwd: field_str_opt(obj, "cwd"),
            url: field_str_opt(obj, "url"),
            content: field_str_opt(obj, "content"),
            watermark: field_str_opt(obj, "watermark"),
            row: field_u32(obj, "row"),
        }),
        "swap_panes" => Some(Action::SwapPanes {
            a: field_u32(obj, "a")?,
            b: field_u32(obj, "b")?,
        }),
        "focus_pane" => Some(Action::FocusPane {
            pane: field_u32(obj, "pane")?,
        }),
        "message" => Some(Action::Message {
            text: field_str(obj, "text")?,
        }),
        "notify" => Some(Action::Notify {
            title: field_str(obj, "title")?,
            body: field_str(obj, "body")?,
        }),
        "context_usage" => Some(Action::ContextUsage {
            used_tokens: field_u64(obj, "used_tokens")?,
            total_tokens: field_u64(obj, "total_tokens")?,
            percentage: super::clamp_percentage(field_u64(obj, "percentage")?),
            session_id: field_str_opt(obj, "session_id").unwrap_or_default(),
            is_pre_compact: field_bool(obj, "is_pre_compact", false),
        }),
        _ => None,
    }
}

/// Build a [`Action::RawSend`] for the legacy tap `send`/`send_all`
/// wire messages. Kept separate from [`build_action`] because these
/// never arrive as `{"type": "..."}` action objects.
pub fn raw_send(target: SendTarget, bytes: impl Into<String>) -> Action {
    Action::RawSend {
        target,
        bytes: bytes.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_raw_object() {
        assert_eq!(extract_json(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn extracts_json_fenced_block() {
        let text = "Here:\n```json\n{\"a\":1}\n```\n";
        assert_eq!(extract_json(text), Some("{\"a\":1}"));
    }

    #[test]
    fn extracts_generic_fenced_block() {
        let text = "Here:\n```\n{\"a\":1}\n```\n";
        assert_eq!(extract_json(text), Some("{\"a\":1}"));
    }

    #[test]
    fn extracts_embedded_in_prose() {
        let text = "blah blah {\"a\":1} blah blah";
        assert_eq!(extract_json(text), Some("{\"a\":1}"));
    }

    #[test]
    fn fails_on_prose_without_braces() {
        assert_eq!(extract_json("no json here at all"), None);
    }

    #[test]
    fn parses_send_command() {
        let json = r#"{"explanation":"list","actions":[{"type":"send_command","pane":0,"command":"ls -la"}]}"#;
        let parsed = parse_actions(json).unwrap();
        assert_eq!(parsed.explanation, "list");
        assert_eq!(
            parsed.actions,
            vec![Action::SendCommand {
                pane: 0,
                command: "ls -la".into()
            }]
        );
    }

    #[test]
    fn missing_actions_field_is_an_error() {
        let json = r#"{"explanation":"x"}"#;
        assert_eq!(parse_actions(json), Err(ParseError::NoActionsField));
    }

    #[test]
    fn actions_not_an_array_is_an_error() {
        let json = r#"{"actions":"nope"}"#;
        assert_eq!(parse_actions(json), Err(ParseError::InvalidActions));
    }

    #[test]
    fn unknown_action_is_skipped_known_survives() {
        let json = r#"{"actions":[{"type":"unknown_thing","x":1},{"type":"focus_pane","pane":3}]}"#;
        let parsed = parse_actions(json).unwrap();
        assert_eq!(parsed.actions, vec![Action::FocusPane { pane: 3 }]);
    }

    #[test]
    fn negative_numbers_are_treated_as_missing() {
        let json = r#"{"actions":[{"type":"send_command","pane":-1,"command":"ls"}]}"#;
        let parsed = parse_actions(json).unwrap();
        assert!(parsed.actions.is_empty());
    }

    #[test]
    fn context_usage_clamps_and_defaults() {
        let json = r#"{"actions":[{"type":"context_usage","used_tokens":100000,"total_tokens":200000,"percentage":250}]}"#;
        let parsed = parse_actions(json).unwrap();
        assert_eq!(
            parsed.actions,
            vec![Action::ContextUsage {
                used_tokens: 100000,
                total_tokens: 200000,
                percentage: 100,
                session_id: String::new(),
                is_pre_compact: false,
            }]
        );
    }
}
