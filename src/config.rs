use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_PATH: &str = "propwatch_settings.json";
const DEFAULT_SOURCE_FPS: u32 = 10;
const DEFAULT_SOURCE_WIDTH: u32 = 640;
const DEFAULT_SOURCE_HEIGHT: u32 = 480;

#[derive(Debug, Deserialize, Default)]
struct PropwatchConfigFile {
    settings_path: Option<PathBuf>,
    overlay: Option<bool>,
    source: Option<SourceConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PropwatchConfig {
    pub settings_path: PathBuf,
    pub overlay: bool,
    pub source: SourceSettings,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

impl PropwatchConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PROPWATCH_CONFIG").ok().map(PathBuf::from);
        Self::load_from(config_path.as_deref())
    }

    /// Load with an explicit config file path, bypassing `PROPWATCH_CONFIG`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let file_cfg = match config_path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: PropwatchConfigFile) -> Self {
        let settings_path = file
            .settings_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
        let overlay = file.overlay.unwrap_or(false);
        let source = SourceSettings {
            target_fps: file
                .source
                .as_ref()
                .and_then(|source| source.target_fps)
                .unwrap_or(DEFAULT_SOURCE_FPS),
            width: file
                .source
                .as_ref()
                .and_then(|source| source.width)
                .unwrap_or(DEFAULT_SOURCE_WIDTH),
            height: file
                .source
                .and_then(|source| source.height)
                .unwrap_or(DEFAULT_SOURCE_HEIGHT),
        };
        Self {
            settings_path,
            overlay,
            source,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("PROPWATCH_SETTINGS_PATH") {
            if !path.trim().is_empty() {
                self.settings_path = PathBuf::from(path);
            }
        }
        if let Ok(overlay) = std::env::var("PROPWATCH_OVERLAY") {
            let overlay = overlay.trim();
            if !overlay.is_empty() {
                self.overlay = match overlay {
                    "1" | "true" | "on" => true,
                    "0" | "false" | "off" => false,
                    other => {
                        return Err(anyhow!(
                            "PROPWATCH_OVERLAY must be one of 1/0/true/false/on/off, got '{}'",
                            other
                        ))
                    }
                };
            }
        }
        if let Ok(fps) = std::env::var("PROPWATCH_TARGET_FPS") {
            let fps: u32 = fps
                .parse()
                .map_err(|_| anyhow!("PROPWATCH_TARGET_FPS must be an integer"))?;
            self.source.target_fps = fps;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.source.target_fps == 0 {
            return Err(anyhow!("source target_fps must be at least 1"));
        }
        if self.source.width == 0 || self.source.height == 0 {
            return Err(anyhow!("source geometry must be non-zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<PropwatchConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
