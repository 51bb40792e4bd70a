//! Pane plugin interface (`spec.md` §3, §4.C).
//!
//! The controller talks to every pane through [`Pane`], a sealed sum
//! of concrete plugin structs with a shared, match-dispatched method
//! set — not a heap-allocated `Box<dyn Trait>` hierarchy (`spec.md`
//! §9 "dynamic dispatch over pane kinds": "an abstract capability
//! set, not heap-allocated hierarchy... avoids the runtime-vtable
//! ambiguity of the source while preserving polymorphism"). Two
//! variants: [`terminal::TerminalPlugin`], the only fully functional
//! kind in scope, and [`stub::StubPlugin`], which satisfies the
//! capability set trivially for the other nine plugin types
//! enumerated in `spec.md` §3.

pub mod pty_backend;
pub mod stub;
pub mod terminal;

use serde::{Deserialize, Serialize};

pub use stub::StubPlugin;
pub use terminal::TerminalPlugin;

/// A single rendered terminal cell, used by [`RenderData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderCell {
    pub ch: char,
    pub fg: (u8, u8, u8),
    pub bg: (u8, u8, u8),
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for RenderCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: (255, 255, 255),
            bg: (0, 0, 0),
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

/// Sentinel cursor position meaning "scrolled away from the live
/// view" (`spec.md` §4.C `render_data`).
pub const CURSOR_DETACHED: u32 = u32::MAX;

/// Structured snapshot returned by [`Pane::render_data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderData {
    pub rows: u16,
    pub cols: u16,
    pub cells: Vec<RenderCell>,
    pub cursor_row: u32,
    pub cursor_col: u32,
    pub watermark: Option<String>,
}

impl RenderData {
    pub fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
            cursor_row: CURSOR_DETACHED,
            cursor_col: CURSOR_DETACHED,
            watermark: None,
        }
    }
}

/// The full set of pane kinds a [`PaneConfig`] can request
/// (`spec.md` §3 `Pane` variants, §4.C factory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneType {
    Terminal,
    Webview,
    Notes,
    ImageViewer,
    FileTree,
    Logs,
    Diff,
    Markdown,
    Chart,
    Placeholder,
}

impl PaneType {
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "terminal" => PaneType::Terminal,
            "webview" => PaneType::Webview,
            "notes" => PaneType::Notes,
            "image_viewer" => PaneType::ImageViewer,
            "file_tree" => PaneType::FileTree,
            "logs" => PaneType::Logs,
            "diff" => PaneType::Diff,
            "markdown" => PaneType::Markdown,
            "chart" => PaneType::Chart,
            _ => PaneType::Placeholder,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaneType::Terminal => "terminal",
            PaneType::Webview => "webview",
            PaneType::Notes => "notes",
            PaneType::ImageViewer => "image_viewer",
            PaneType::FileTree => "file_tree",
            PaneType::Logs => "logs",
            PaneType::Diff => "diff",
            PaneType::Markdown => "markdown",
            PaneType::Chart => "chart",
            PaneType::Placeholder => "placeholder",
        }
    }
}

/// Construction parameters for a pane, mirroring the optional fields
/// on `SpawnPane`/`ReplacePane` (`spec.md` §3) plus the `[[panes]]`
/// config table (`spec.md` §6.1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaneConfig {
    #[serde(default)]
    pub pane_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub watermark: Option<String>,
}

/// The capability set every pane exposes (`spec.md` §3, §4.C), as a
/// sealed sum of concrete plugin structs rather than a trait object.
/// No method may suspend. Each arm forwards to the corresponding
/// inherent method on the concrete struct it wraps.
pub enum Pane {
    Terminal(TerminalPlugin),
    Stub(StubPlugin),
}

impl Pane {
    pub fn pane_type(&self) -> PaneType {
        match self {
            Pane::Terminal(p) => p.pane_type(),
            Pane::Stub(p) => p.pane_type(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Pane::Terminal(p) => p.title(),
            Pane::Stub(p) => p.title(),
        }
    }

    pub fn set_title(&mut self, title: String) {
        match self {
            Pane::Terminal(p) => p.set_title(title),
            Pane::Stub(p) => p.set_title(title),
        }
    }

    /// Drain any pending output/state change. Returns `true` iff the
    /// pane became dirty this call.
    pub fn poll(&mut self) -> bool {
        match self {
            Pane::Terminal(p) => p.poll(),
            Pane::Stub(p) => p.poll(),
        }
    }

    pub fn write_input(&mut self, bytes: &[u8]) {
        match self {
            Pane::Terminal(p) => p.write_input(bytes),
            Pane::Stub(p) => p.write_input(bytes),
        }
    }

    pub fn render_data(&self) -> RenderData {
        match self {
            Pane::Terminal(p) => p.render_data(),
            Pane::Stub(p) => p.render_data(),
        }
    }

    /// Resize the pane's backing cell grid (and PTY, for terminal
    /// panes). A no-op for kinds with no cell grid of their own.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        match self {
            Pane::Terminal(p) => p.resize(rows, cols),
            Pane::Stub(p) => p.resize(rows, cols),
        }
    }

    /// Copy up to `buf.len()` bytes of the currently visible text into
    /// `buf`, returning the number of bytes written.
    pub fn visible_text(&self, buf: &mut [u8]) -> usize {
        match self {
            Pane::Terminal(p) => p.visible_text(buf),
            Pane::Stub(p) => p.visible_text(buf),
        }
    }

    pub fn has_error(&self) -> bool {
        match self {
            Pane::Terminal(p) => p.has_error(),
            Pane::Stub(p) => p.has_error(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        match self {
            Pane::Terminal(p) => p.is_dirty(),
            Pane::Stub(p) => p.is_dirty(),
        }
    }

    pub fn clear_dirty(&mut self) {
        match self {
            Pane::Terminal(p) => p.clear_dirty(),
            Pane::Stub(p) => p.clear_dirty(),
        }
    }

    pub fn scroll_up(&mut self, lines: u32) {
        match self {
            Pane::Terminal(p) => p.scroll_up(lines),
            Pane::Stub(p) => p.scroll_up(lines),
        }
    }

    pub fn scroll_down(&mut self, lines: u32) {
        match self {
            Pane::Terminal(p) => p.scroll_down(lines),
            Pane::Stub(p) => p.scroll_down(lines),
        }
    }

    pub fn is_exited(&self) -> bool {
        match self {
            Pane::Terminal(p) => p.is_exited(),
            Pane::Stub(p) => p.is_exited(),
        }
    }

    pub fn child_pid(&self) -> Option<u32> {
        match self {
            Pane::Terminal(p) => p.child_pid(),
            Pane::Stub(p) => p.child_pid(),
        }
    }

    pub fn dispose(&mut self) {
        match self {
            Pane::Terminal(p) => p.dispose(),
            Pane::Stub(p) => p.dispose(),
        }
    }
}

/// Factory choosing between [`TerminalPlugin`] and [`StubPlugin`]
/// based on `pane_config.pane_type` (default `"terminal"`).
pub fn create_plugin(index: u32, pane_config: &PaneConfig) -> Pane {
    let type_str = pane_config.pane_type.as_deref().unwrap_or("terminal");
    let pane_type = PaneType::from_str_or_default(type_str);
    match pane_type {
        PaneType::Terminal => Pane::Terminal(TerminalPlugin::spawn(index, pane_config)),
        other => Pane::Stub(StubPlugin::new(other, pane_config.title.clone())),
    }
}
