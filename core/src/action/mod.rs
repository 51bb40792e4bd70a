//! The `Action` tagged union.
//!
//! An `Action` is produced by three independent sources — the Text Tap
//! parser, the LLM response parser, and the GUI — and consumed exactly
//! once by the application controller. This module owns only the type
//! and its display formatting; dispatch lives in [`crate::controller`].

pub mod parser;

use serde::{Deserialize, Serialize};

/// Target of a [`Action::RawSend`] — either a single pane or every
/// terminal pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendTarget {
    Pane(u32),
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    SendCommand {
        pane: u32,
        command: String,
    },
    SendToAll {
        command: String,
    },
    SetTitle {
        pane: u32,
        title: String,
    },
    SetWatermark {
        pane: u32,
        watermark: String,
    },
    ClearWatermark {
        pane: u32,
    },
    Navigate {
        pane: u32,
        url: String,
    },
    SetContent {
        pane: u32,
        content: String,
    },
    SpawnPane {
        pane_type: String,
        title: Option<String>,
        command: Option<String>,
        cwd: Option<String>,
        url: Option<String>,
        content: Option<String>,
        watermark: Option<String>,
        row: Option<u32>,
    },
    ClosePane {
        pane: u32,
    },
    ReplacePane {
        pane: u32,
        pane_type: String,
        title: Option<String>,
        command: Option<String>,
        cwd: Option<String>,
        url: Option<String>,
        content: Option<String>,
        watermark: Option<String>,
        row: Option<u32>,
    },
    SwapPanes {
        a: u32,
        b: u32,
    },
    FocusPane {
        pane: u32,
    },
    Message {
        text: String,
    },
    Notify {
        title: String,
        body: String,
    },
    ContextUsage {
        used_tokens: u64,
        total_tokens: u64,
        percentage: u8,
        session_id: String,
        is_pre_compact: bool,
    },
    RawSend {
        target: SendTarget,
        bytes: String,
    },
}

/// Clamp a raw percentage-like integer into `0..=100`.
pub fn clamp_percentage(value: u64) -> u8 {
    value.min(100) as u8
}

/// Produce the one-line human-readable description used by UI overlays.
/// Every variant gets a fixed, stable shape so this function is safe
/// to use in tests and in the ABI's `llm_action_desc` entry point.
pub fn format_for_display(action: &Action) -> String {
    match action {
        Action::SendCommand { pane, command } => format!("  [pane {pane}] $ {command}"),
        Action::SendToAll { command } => format!("  [all panes] $ {command}"),
        Action::SetTitle { pane, title } => format!("  [pane {pane}] title: {title}"),
        Action::SetWatermark { pane, watermark } => {
            format!("  [pane {pane}] watermark: {watermark}")
        }
        Action::ClearWatermark { pane } => format!("  [pane {pane}] watermark: (cleared)"),
        Action::Navigate { pane, url } => format!("  [pane {pane}] navigate: {url}"),
        Action::SetContent { pane, content } => {
            format!("  [pane {pane}] set content ({} bytes)", content.len())
        }
        Action::SpawnPane { pane_type, title, .. } => {
            let title = title.as_deref().unwrap_or("(untitled)");
            format!("  spawn {pane_type} pane: {title}")
        }
        Action::ClosePane { pane } => format!("  [pane {pane}] close"),
        Action::ReplacePane { pane, pane_type, .. } => {
            format!("  [pane {pane}] replace with {pane_type}")
        }
        Action::SwapPanes { a, b } => format!("  swap panes {a} <-> {b}"),
        Action::FocusPane { pane } => format!("  focus pane {pane}"),
        Action::Message { text } => format!("  message: {text}"),
        Action::Notify { title, body } => format!("  notify: {title} — {body}"),
        Action::ContextUsage {
            used_tokens,
            total_tokens,
            percentage,
            ..
        } => format!("  context usage: {used_tokens}/{total_tokens} ({percentage}%)"),
        Action::RawSend { target, bytes } => match target {
            SendTarget::Pane(pane) => format!("  [pane {pane}] $ {bytes}"),
            SendTarget::All => format!("  [all panes] $ {bytes}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_percentage_caps_at_100() {
        assert_eq!(clamp_percentage(50), 50);
        assert_eq!(clamp_percentage(100), 100);
        assert_eq!(clamp_percentage(250), 100);
    }

    #[test]
    fn display_shapes_are_stable() {
        assert_eq!(
            format_for_display(&Action::SendCommand {
                pane: 0,
                command: "ls -la".into()
            }),
            "  [pane 0] $ ls -la"
        );
        assert_eq!(
            format_for_display(&Action::Notify {
                title: "A".into(),
                body: "B".into()
            }),
            "  notify: A — B"
        );
    }
}
