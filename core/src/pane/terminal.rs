//! The terminal pane plugin (`spec.md` §4.C `TerminalPlugin`).
//!
//! The only fully functional pane kind in scope. Wraps a
//! [`PtyBackend`] and a `vt100::Parser` emulator, the same pairing
//! this crate's sibling terminal multiplexers use (see
//! `rendering.rs`/`pane.rs` in the example pack).

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::pty_backend::{PortablePtyBackend, PtyBackend, PtySpawnConfig};
use super::{PaneConfig, PaneType, RenderCell, RenderData, CURSOR_DETACHED};

/// Scrollback kept by the `vt100` parser, in lines.
const SCROLLBACK_LINES: usize = 5000;
/// Default terminal size before the host's first `resize` call.
const DEFAULT_ROWS: u16 = 24;
const DEFAULT_COLS: u16 = 80;
/// How long a pane must be idle after first output before its
/// initial-command list is sent (`spec.md` §4.C `poll()`).
const INITIAL_COMMAND_IDLE: Duration = Duration::from_secs(1);

pub struct TerminalPlugin {
    title: String,
    pty: Option<Box<dyn PtyBackend>>,
    emulator: vt100::Parser,
    dirty: bool,
    has_error: bool,
    last_output_time: Option<Instant>,
    initial_commands: Vec<String>,
    initial_commands_sent: bool,
}

impl TerminalPlugin {
    pub fn spawn(index: u32, config: &PaneConfig) -> Self {
        let title = config
            .title
            .clone()
            .unwrap_or_else(|| format!("pane {index}"));

        let spawn_config = PtySpawnConfig {
            command: config.command.clone(),
            cwd: config.cwd.clone(),
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        };

        let (pty, has_error) = match PortablePtyBackend::spawn(&spawn_config) {
            Ok(backend) => (Some(Box::new(backend) as Box<dyn PtyBackend>), false),
            Err(e) => {
                warn!(pane = index, error = %e, "failed to spawn pty for terminal pane");
                (None, true)
            }
        };

        Self {
            title,
            pty,
            emulator: vt100::Parser::new(DEFAULT_ROWS, DEFAULT_COLS, SCROLLBACK_LINES),
            dirty: false,
            has_error,
            last_output_time: None,
            initial_commands: Vec::new(),
            initial_commands_sent: false,
        }
    }

    /// Commands to send once, after the first second of idle output
    /// (`spec.md` §4.C). Used by session config `[[panes]]` entries
    /// that want a follow-up command after the shell prompt appears.
    pub fn with_initial_commands(mut self, commands: Vec<String>) -> Self {
        self.initial_commands_sent = commands.is_empty();
        self.initial_commands = commands;
        self
    }

    // Capability set (`spec.md` §4.C), dispatched by [`super::Pane`]'s
    // match arms rather than a trait object — see `spec.md` §9
    // "dynamic dispatch over pane kinds".

    pub fn pane_type(&self) -> PaneType {
        PaneType::Terminal
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.dirty = true;
    }

    pub fn poll(&mut self) -> bool {
        let Some(pty) = &mut self.pty else {
            return false;
        };

        let bytes = pty.try_read();
        let got_bytes = !bytes.is_empty();
        if got_bytes {
            self.emulator.process(&bytes);
            self.last_output_time = Some(Instant::now());
            self.dirty = true;
        }

        if !self.initial_commands_sent {
            if let Some(first_output) = self.last_output_time {
                if first_output.elapsed() >= INITIAL_COMMAND_IDLE {
                    for cmd in std::mem::take(&mut self.initial_commands) {
                        let mut line = cmd.into_bytes();
                        line.push(b'\r');
                        if let Err(e) = pty.write_all(&line) {
                            warn!(error = %e, "failed to write initial command");
                        }
                    }
                    self.initial_commands_sent = true;
                }
            }
        }

        if pty.is_exited() {
            debug!("terminal pane pty exited");
        }

        got_bytes
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.emulator.set_size(rows, cols);
        if let Some(pty) = &mut self.pty {
            if let Err(e) = pty.resize(rows, cols) {
                warn!(error = %e, "pty resize failed");
            }
        }
    }

    pub fn write_input(&mut self, bytes: &[u8]) {
        let screen = self.emulator.screen();
        if screen.scrollback() != 0 {
            self.emulator.screen_mut().set_scrollback(0);
        }
        if let Some(pty) = &mut self.pty {
            if let Err(e) = pty.write_all(bytes) {
                warn!(error = %e, "pty write failed");
            }
        }
    }

    pub fn render_data(&self) -> RenderData {
        let screen = self.emulator.screen();
        let (rows, cols) = screen.size();
        let mut cells = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                let cell = match screen.cell(row, col) {
                    Some(cell) => RenderCell {
                        ch: cell.contents().chars().next().unwrap_or(' '),
                        fg: color_to_rgb(cell.fgcolor()),
                        bg: color_to_rgb(cell.bgcolor()),
                        bold: cell.bold(),
                        italic: cell.italic(),
                        underline: cell.underline(),
                    },
                    None => RenderCell::default(),
                };
                cells.push(cell);
            }
        }

        let (cursor_row, cursor_col) = if screen.scrollback() == 0 {
            let (r, c) = screen.cursor_position();
            (r as u32, c as u32)
        } else {
            (CURSOR_DETACHED, CURSOR_DETACHED)
        };

        RenderData {
            rows,
            cols,
            cells,
            cursor_row,
            cursor_col,
            watermark: None,
        }
    }

    pub fn visible_text(&self, buf: &mut [u8]) -> usize {
        let screen = self.emulator.screen();
        let (rows, cols) = screen.size();
        let mut text = String::new();
        for row in 0..rows {
            for col in 0..cols {
                if let Some(cell) = screen.cell(row, col) {
                    text.push_str(cell.contents());
                } else {
                    text.push(' ');
                }
            }
            text.push('\n');
        }
        let bytes = text.as_bytes();
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        n
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn scroll_up(&mut self, lines: u32) {
        let screen = self.emulator.screen();
        let current = screen.scrollback();
        self.emulator
            .screen_mut()
            .set_scrollback(current + lines as usize);
    }

    pub fn scroll_down(&mut self, lines: u32) {
        let screen = self.emulator.screen();
        let current = screen.scrollback();
        let new_offset = current.saturating_sub(lines as usize);
        self.emulator.screen_mut().set_scrollback(new_offset);
    }

    pub fn is_exited(&self) -> bool {
        self.pty.is_none()
    }

    pub fn child_pid(&self) -> Option<u32> {
        self.pty.as_ref().and_then(|p| p.child_pid())
    }

    pub fn dispose(&mut self) {
        debug!(title = %self.title, "disposing terminal pane");
        self.pty = None;
    }
}

fn color_to_rgb(color: vt100::Color) -> (u8, u8, u8) {
    match color {
        vt100::Color::Default => (255, 255, 255),
        vt100::Color::Idx(idx) => indexed_to_rgb(idx),
        vt100::Color::Rgb(r, g, b) => (r, g, b),
    }
}

/// Standard 16-color ANSI palette for indices 0..16; the 216-color
/// cube and grayscale ramp beyond that use the xterm formula.
fn indexed_to_rgb(idx: u8) -> (u8, u8, u8) {
    const BASE16: [(u8, u8, u8); 16] = [
        (0, 0, 0),
        (205, 0, 0),
        (0, 205, 0),
        (205, 205, 0),
        (0, 0, 238),
        (205, 0, 205),
        (0, 205, 205),
        (229, 229, 229),
        (127, 127, 127),
        (255, 0, 0),
        (0, 255, 0),
        (255, 255, 0),
        (92, 92, 255),
        (255, 0, 255),
        (0, 255, 255),
        (255, 255, 255),
    ];
    if let Some(rgb) = BASE16.get(idx as usize) {
        return *rgb;
    }
    if (16..232).contains(&idx) {
        let i = idx - 16;
        let r = i / 36;
        let g = (i % 36) / 6;
        let b = i % 6;
        let scale = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
        return (scale(r), scale(g), scale(b));
    }
    let level = 8 + (idx - 232) * 10;
    (level, level, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::PaneConfig;

    #[test]
    fn spawn_failure_marks_has_error_but_never_panics() {
        let config = PaneConfig {
            command: Some("/nonexistent/definitely-not-a-binary-xyz".to_string()),
            ..Default::default()
        };
        let mut plugin = TerminalPlugin::spawn(0, &config);
        let _ = plugin.poll();
        assert_eq!(plugin.pane_type(), PaneType::Terminal);
        assert!(plugin.has_error());
    }

    #[test]
    fn indexed_color_table_is_total() {
        for idx in 0..=255u8 {
            let _ = indexed_to_rgb(idx);
        }
    }
}
