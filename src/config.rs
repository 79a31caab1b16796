// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub player: PlayerConfig,
    pub tuning: TuningConfig,
    pub osd: OsdConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub command: String,
    /// Extra arguments appended to the mpv command line
    pub args: Vec<String>,
    pub fullscreen: bool,
    pub width: u32,
    pub height: u32,
    pub deinterlace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Used when a channel line carries no usable bandwidth tag
    pub default_bandwidth_mhz: u32,
    pub dvb_card: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsdConfig {
    pub timeout_secs: u64,
    pub font_size: u32,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
    pub max_candidates: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            args: Vec::new(),
            fullscreen: true,
            width: 1024,
            height: 576,
            deinterlace: true,
        }
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            default_bandwidth_mhz: 8,
            dvb_card: 1,
        }
    }
}

impl Default for OsdConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 2,
            font_size: 96,
            color: "#FFFFFF".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            max_candidates: 10,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Load the config at `path`, or the defaults if no file exists there
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("divibly").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [player]
            fullscreen = false

            [osd]
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert!(!config.player.fullscreen);
        assert_eq!(config.player.command, "mpv");
        assert_eq!(config.player.width, 1024);
        assert_eq!(config.osd.timeout_secs, 5);
        assert_eq!(config.osd.font_size, 96);
        assert_eq!(config.tuning.default_bandwidth_mhz, 8);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.ui.tick_rate_ms, 250);
    }

    #[test]
    fn bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[player\nfullscreen = ").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
