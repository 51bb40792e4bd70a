//! System prompt construction (`spec.md` §4.G `build_system_prompt`).

/// How many trailing lines of a pane's visible text go into the
/// prompt (`spec.md` §4.G: "30-50 lines").
const CONTEXT_LINES: usize = 40;

/// One pane's worth of context for the LLM prompt (`spec.md` §3
/// `PaneContext`).
#[derive(Debug, Clone)]
pub struct PaneContext {
    pub index: u32,
    pub pane_type: String,
    pub title: String,
    pub visible_text: String,
    pub subprocess_info: Option<String>,
}

const PREAMBLE: &str = "You are an assistant integrated into Termania, a multi-pane \
terminal orchestrator. You can see the current state of every pane below and can \
act on them by returning a JSON object with explanation and actions.";

const POSTAMBLE: &str = r#"Respond with a single JSON object of the shape:
{"explanation": "<one or two sentences>", "actions": [ ... ]}

Each entry in "actions" is an object with a "type" field selecting one of:
send_command, send_to_all, set_title, set_watermark, clear_watermark, navigate,
set_content, spawn_pane, close_pane, replace_pane, swap_panes, focus_pane,
message, notify, context_usage.

Only include actions you want performed. Unknown or malformed actions are
silently ignored, so omit anything you are not confident about."#;

/// Build the fixed-preamble + per-pane-context + fixed-postamble system
/// prompt (`spec.md` §4.G).
pub fn build_system_prompt(panes: &[PaneContext]) -> String {
    let mut out = String::new();
    out.push_str(PREAMBLE);
    out.push_str("\n\n");

    for pane in panes {
        out.push_str(&format!(
            "--- Pane {} ({}) \"{}\" ---\n",
            pane.index, pane.pane_type, pane.title
        ));
        if let Some(info) = &pane.subprocess_info {
            out.push_str(&format!("subprocess: {info}\n"));
        }
        let tail = last_n_lines(&pane.visible_text, CONTEXT_LINES);
        out.push_str(&tail);
        out.push_str("\n\n");
    }

    out.push_str(POSTAMBLE);
    out
}

fn last_n_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_every_pane_header_and_postamble() {
        let panes = vec![
            PaneContext {
                index: 0,
                pane_type: "terminal".to_string(),
                title: "shell".to_string(),
                visible_text: "ls\nCargo.toml\nsrc\n".to_string(),
                subprocess_info: None,
            },
            PaneContext {
                index: 1,
                pane_type: "webview".to_string(),
                title: "docs".to_string(),
                visible_text: String::new(),
                subprocess_info: Some("pid 123".to_string()),
            },
        ];
        let prompt = build_system_prompt(&panes);
        assert!(prompt.contains("Pane 0 (terminal) \"shell\""));
        assert!(prompt.contains("Pane 1 (webview) \"docs\""));
        assert!(prompt.contains("pid 123"));
        assert!(prompt.contains("\"actions\""));
    }

    #[test]
    fn visible_text_is_tail_truncated() {
        let many_lines: String = (0..100).map(|i| format!("line{i}\n")).collect();
        let tail = last_n_lines(&many_lines, CONTEXT_LINES);
        assert_eq!(tail.lines().count(), CONTEXT_LINES);
        assert!(tail.starts_with("line60"));
    }
}
