use crate::model::DisplayMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub hold: HoldConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldConfig {
    /// Delay before a held trigger starts auto-repeating.
    #[serde(default = "HoldConfig::default_arm_delay")]
    pub arm_delay_ms: u64,
    /// Interval between repeat decrements once armed.
    #[serde(default = "HoldConfig::default_repeat_interval")]
    pub repeat_interval_ms: u64,
}

impl HoldConfig {
    fn default_arm_delay() -> u64 {
        500
    }
    fn default_repeat_interval() -> u64 {
        100
    }
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            arm_delay_ms: 500,
            repeat_interval_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Pointer within this many cells of a screen edge reveals the panel.
    #[serde(default = "PanelConfig::default_edge_threshold")]
    pub edge_threshold: u16,
    /// Width of the panel strip, in cells.
    #[serde(default = "PanelConfig::default_width")]
    pub width: u16,
}

impl PanelConfig {
    fn default_edge_threshold() -> u16 {
        3
    }
    fn default_width() -> u16 {
        38
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 3,
            width: 38,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Display mode at startup.
    #[serde(default)]
    pub mode: DisplayMode,
    /// Text shown in the message display mode.
    #[serde(default = "DisplayConfig::default_standby_message")]
    pub standby_message: String,
}

impl DisplayConfig {
    fn default_standby_message() -> String {
        "Stand by".into()
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Numbers,
            standby_message: "Stand by".into(),
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("stagecount")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "parsing config TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- defaults ---

    #[test]
    fn default_arm_delay_is_500ms() {
        let config = Config::default();
        assert_eq!(config.hold.arm_delay_ms, 500);
    }

    #[test]
    fn default_repeat_interval_is_100ms() {
        let config = Config::default();
        assert_eq!(config.hold.repeat_interval_ms, 100);
    }

    #[test]
    fn default_edge_threshold_is_3() {
        let config = Config::default();
        assert_eq!(config.panel.edge_threshold, 3);
    }

    #[test]
    fn default_display_mode_is_numbers() {
        let config = Config::default();
        assert_eq!(config.display.mode, DisplayMode::Numbers);
    }

    // --- TOML parsing ---

    #[test]
    fn parse_minimal_toml() {
        let toml = "";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.hold.arm_delay_ms, 500);
        assert_eq!(config.hold.repeat_interval_ms, 100);
        assert_eq!(config.panel.width, 38);
        assert_eq!(config.display.standby_message, "Stand by");
    }

    #[test]
    fn parse_custom_hold_timings() {
        let toml = r#"
[hold]
arm_delay_ms = 750
repeat_interval_ms = 50
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.hold.arm_delay_ms, 750);
        assert_eq!(config.hold.repeat_interval_ms, 50);
        // Untouched sections keep their defaults
        assert_eq!(config.panel.edge_threshold, 3);
    }

    #[test]
    fn parse_display_mode_names() {
        let toml = r#"
[display]
mode = "message"
standby_message = "Back soon"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.display.mode, DisplayMode::Message);
        assert_eq!(config.display.standby_message, "Back soon");
    }

    #[test]
    fn config_path_ends_with_config_toml() {
        assert_eq!(Config::config_path().file_name().unwrap(), "config.toml");
    }
}
