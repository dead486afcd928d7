//! Configuration file support for codereel
//!
//! Config file location: `~/.config/codereel/config.toml` (XDG_CONFIG_HOME)
//!
//! Example config:
//! ```toml
//! [playback]
//! highlight_ms = 8
//! typing_ms = 35
//! chunk_pause_ms = 400
//! file_pause_ms = 1200
//! autoplay = true
//!
//! [ui]
//! chrome = true
//! tab_width = 4
//! gutter_digits = 4
//!
//! [ui.theme]
//! text = "#D8DEE9"
//! highlight = "#BF616A"
//! ```

use crate::color::parse_hex;
use codereel_core::{Rgba, Theme, Timings};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Theme colors as hex strings; unset entries keep the built-in palette
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub text: Option<String>,
    pub muted: Option<String>,
    pub line_number: Option<String>,
    pub background: Option<String>,
    pub tab_active: Option<String>,
    pub rule: Option<String>,
    pub cursor: Option<String>,
    pub highlight: Option<String>,
}

impl ThemeConfig {
    /// Overlay configured colors on the default theme
    pub fn resolve(&self) -> Theme {
        let mut theme = Theme::default();
        let slots: [(&str, &Option<String>, &mut Rgba); 8] = [
            ("text", &self.text, &mut theme.text),
            ("muted", &self.muted, &mut theme.muted),
            ("line_number", &self.line_number, &mut theme.line_number),
            ("background", &self.background, &mut theme.background),
            ("tab_active", &self.tab_active, &mut theme.tab_active),
            ("rule", &self.rule, &mut theme.rule),
            ("cursor", &self.cursor, &mut theme.cursor),
            ("highlight", &self.highlight, &mut theme.highlight),
        ];
        for (name, value, slot) in slots {
            let Some(value) = value else { continue };
            match parse_hex(value) {
                Ok(color) => *slot = color,
                Err(err) => warn!(color = name, %err, "ignoring theme color"),
            }
        }
        theme
    }
}

/// UI configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Draw file tabs, rules and line numbers
    pub chrome: bool,
    /// Width of a tab character in spaces
    pub tab_width: usize,
    /// Digits reserved for line numbers
    pub gutter_digits: usize,
    pub theme: ThemeConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            chrome: true,
            tab_width: 4,
            gutter_digits: 4,
            theme: ThemeConfig::default(),
        }
    }
}

/// Playback configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay per position of the removal selection
    pub highlight_ms: u64,
    /// Delay per typed character
    pub typing_ms: u64,
    /// Pause before locating the next chunk
    pub chunk_pause_ms: u64,
    /// Pause before a file starts and before the next one
    pub file_pause_ms: u64,
    /// Start playing as soon as a branch is loaded
    pub autoplay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        let timings = Timings::default();
        Self {
            highlight_ms: timings.highlight.as_millis() as u64,
            typing_ms: timings.typing.as_millis() as u64,
            chunk_pause_ms: timings.chunk_pause.as_millis() as u64,
            file_pause_ms: timings.file_pause.as_millis() as u64,
            autoplay: true,
        }
    }
}

impl PlaybackConfig {
    pub fn timings(&self) -> Timings {
        Timings {
            highlight: Duration::from_millis(self.highlight_ms),
            typing: Duration::from_millis(self.typing_ms),
            chunk_pause: Duration::from_millis(self.chunk_pause_ms),
            file_pause: Duration::from_millis(self.file_pause_ms),
        }
    }
}

/// Root configuration
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ui: UiConfig,
    pub playback: PlaybackConfig,
}

impl Config {
    /// Get all possible config file paths in priority order
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("codereel").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("codereel").join("config.toml"));
        }

        // ~/Library/Application Support on macOS
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("codereel").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        paths
    }

    /// Get the first existing config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|p| p.exists())
    }

    /// Directory for the log file: the config directory, else the state or temp directory
    pub fn log_dir() -> PathBuf {
        Self::config_paths()
            .into_iter()
            .filter_map(|p| p.parent().map(PathBuf::from))
            .find(|dir| dir.is_dir())
            .or_else(dirs::state_dir)
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Load config from XDG config path
    /// Returns default config if file doesn't exist or can't be parsed
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .map(|content| Self::parse(&content))
            .unwrap_or_default()
    }

    fn parse(content: &str) -> Self {
        toml::from_str(content)
            .map_err(|e| {
                eprintln!("Warning: Failed to parse config: {}", e);
                warn!(%e, "config parse failed, using defaults");
                e
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_playback_timings() {
        let config = Config::default();
        assert_eq!(config.playback.timings(), Timings::default());
        assert!(config.playback.autoplay);
        assert!(config.ui.chrome);
        assert_eq!(config.ui.theme.resolve(), Theme::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::parse(
            r##"
[playback]
typing_ms = 10

[ui]
gutter_digits = 3

[ui.theme]
highlight = "#112233"
cursor = "nope"
"##,
        );
        assert_eq!(config.playback.typing_ms, 10);
        assert_eq!(config.playback.file_pause_ms, 1200);
        assert_eq!(config.ui.gutter_digits, 3);
        assert_eq!(config.ui.tab_width, 4);

        let theme = config.ui.theme.resolve();
        assert_eq!(theme.highlight, Rgba::rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.cursor, Theme::default().cursor);
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let config = Config::parse("[playback]\ntyping_ms = \"fast\"\n");
        assert_eq!(config.playback.typing_ms, 35);
    }

    #[test]
    fn test_log_dir_is_never_the_working_directory() {
        let dir = Config::log_dir();
        assert_ne!(dir, PathBuf::from("."));
    }
}
