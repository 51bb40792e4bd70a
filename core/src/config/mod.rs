//! Configuration loading.
//!
//! `Config::from_toml_str` is a pure function: no filesystem access
//! happens inside this crate. The host (CLI or ABI caller) reads the
//! config file and hands over its bytes; [`discover_paths`] is offered
//! as a convenience for that caller but is not part of the parsing
//! contract itself.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::llm::LlmConfig;
use crate::pane::PaneConfig;

/// Default socket path for the Text Tap server.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/termania.sock";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub font: FontConfig,
    pub grid: GridConfig,
    pub window: WindowConfig,
    pub colors: ColorConfig,
    pub text_tap: TextTapConfig,
    pub llm: LlmConfig,
    #[serde(rename = "sessions")]
    pub sessions: Vec<SessionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font: FontConfig::default(),
            grid: GridConfig::default(),
            window: WindowConfig::default(),
            colors: ColorConfig::default(),
            text_tap: TextTapConfig::default(),
            llm: LlmConfig::default(),
            sessions: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a complete config from TOML source. Unknown sections and
    /// keys are ignored (`#[serde(default)]` throughout); a partial or
    /// even empty file is legal and yields [`Config::default`].
    pub fn from_toml_str(bytes: &str) -> Result<Config, CoreError> {
        toml::from_str(bytes).map_err(|e| CoreError::ConfigParse {
            detail: e.to_string(),
        })
    }

    /// The session that overrides `[window]`/`[grid]`, if any
    /// (`spec.md` §6.1: "a session file's top-level `title`, `rows`,
    /// `cols` override `[window].title`, `[grid].rows`, `[grid].cols`").
    /// Only the first `[[sessions]]` entry participates, matching
    /// `Controller::new`'s choice of pane source.
    fn active_session(&self) -> Option<&SessionConfig> {
        self.sessions.first()
    }

    /// `([grid].rows, [grid].cols)` after applying the active
    /// session's overrides, each clamped to at least 1.
    pub fn effective_grid(&self) -> (u32, u32) {
        let rows = self
            .active_session()
            .and_then(|s| s.rows)
            .unwrap_or(self.grid.rows)
            .max(1);
        let cols = self
            .active_session()
            .and_then(|s| s.cols)
            .unwrap_or(self.grid.cols)
            .max(1);
        (rows, cols)
    }

    /// `[window].title` after applying the active session's override.
    pub fn effective_title(&self) -> &str {
        self.active_session()
            .and_then(|s| s.title.as_deref())
            .unwrap_or(&self.window.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "monospace".to_string(),
            size: 14.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 1, cols: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Termania".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Parse `#RRGGBB` or `#RRGGBBAA`, `a` defaulting to `255`.
    pub fn from_hex(s: &str) -> Option<Color> {
        let hex = s.strip_prefix('#')?;
        let parse_byte = |slice: &str| u8::from_str_radix(slice, 16).ok();
        match hex.len() {
            6 => Some(Color {
                r: parse_byte(&hex[0..2])?,
                g: parse_byte(&hex[2..4])?,
                b: parse_byte(&hex[4..6])?,
                a: 255,
            }),
            8 => Some(Color {
                r: parse_byte(&hex[0..2])?,
                g: parse_byte(&hex[2..4])?,
                b: parse_byte(&hex[4..6])?,
                a: parse_byte(&hex[6..8])?,
            }),
            _ => None,
        }
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(deserialize_with = "deserialize_color")]
    pub background: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub foreground: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub accent: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: Color { r: 0, g: 0, b: 0, a: 255 },
            foreground: Color {
                r: 255,
                g: 255,
                b: 255,
                a: 255,
            },
            accent: Color {
                r: 80,
                g: 160,
                b: 255,
                a: 255,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextTapConfig {
    pub enabled: bool,
    pub socket_path: String,
}

impl Default for TextTapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
        }
    }
}

/// A saved session; its top-level `title`/`rows`/`cols` override the
/// corresponding `[window]`/`[grid]` values when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub title: Option<String>,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub panes: Vec<PaneConfig>,
}

/// Candidate config file locations, in precedence order: `$HOME/.config`
/// (via the `home` crate) before the platform config dir (via `dirs`),
/// matching this codebase's existing config-directory resolution.
pub fn discover_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = home::home_dir() {
        paths.push(home.join(".config/termania/config.toml"));
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("termania/config.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.grid.rows, 1);
        assert_eq!(config.grid.cols, 1);
        assert_eq!(config.text_tap.socket_path, DEFAULT_SOCKET_PATH);
    }

    #[test]
    fn unknown_sections_and_keys_are_ignored() {
        let toml = r#"
            [nonsense]
            whatever = true

            [grid]
            rows = 2
            cols = 3
            extra_unknown_key = 42
        "#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.grid.rows, 2);
        assert_eq!(config.grid.cols, 3);
    }

    #[test]
    fn parses_hex_colors_with_and_without_alpha() {
        let toml = r#"
            [colors]
            background = "#112233"
            foreground = "#aabbccdd"
        "#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.colors.background.r, 0x11);
        assert_eq!(config.colors.background.a, 255);
        assert_eq!(config.colors.foreground.a, 0xdd);
    }

    #[test]
    fn rejects_malformed_color() {
        let toml = r#"
            [colors]
            background = "not-a-color"
        "#;
        assert!(Config::from_toml_str(toml).is_err());
    }

    #[test]
    fn session_overrides_grid_and_title() {
        let toml = r#"
            [grid]
            rows = 1
            cols = 1

            [window]
            title = "Termania"

            [[sessions]]
            title = "dev"
            rows = 2
            cols = 4
        "#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.effective_grid(), (2, 4));
        assert_eq!(config.effective_title(), "dev");
    }

    #[test]
    fn no_session_falls_back_to_grid_and_window() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.effective_grid(), (1, 1));
        assert_eq!(config.effective_title(), "Termania");
    }

    #[test]
    fn session_panes_parse() {
        let toml = r#"
            [[sessions]]
            title = "dev"
            rows = 2
            cols = 2

            [[sessions.panes]]
            pane_type = "terminal"
            command = "htop"
        "#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.sessions.len(), 1);
        assert_eq!(config.sessions[0].title.as_deref(), Some("dev"));
        assert_eq!(config.sessions[0].panes.len(), 1);
        assert_eq!(
            config.sessions[0].panes[0].command.as_deref(),
            Some("htop")
        );
    }
}
