use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use serde::Deserialize;

use crate::system::settings::Settings;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub thresholds: ThresholdsConfig,
    pub colors: ColorsConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub refresh_rate_ms: u64,
    pub history_capacity: usize,
    pub export_dir: Option<PathBuf>,
    pub open_exports: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            refresh_rate_ms: 1000,
            history_capacity: 120,
            export_dir: None,
            open_exports: true,
        }
    }
}

impl GeneralConfig {
    /// Configured export directory, or the per-user data directory.
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|p| p.join("perfpanel").join("exports")))
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub memory_warning_percent: f32,
    pub memory_critical_percent: f32,
    pub cpu_warning_percent: f32,
    pub cpu_critical_percent: f32,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        let s = Settings::default();
        ThresholdsConfig {
            memory_warning_percent: s.memory_warning_threshold_percent,
            memory_critical_percent: s.memory_critical_threshold_percent,
            cpu_warning_percent: s.cpu_warning_threshold_percent,
            cpu_critical_percent: s.cpu_critical_threshold_percent,
        }
    }
}

impl ThresholdsConfig {
    pub fn to_settings(&self) -> Settings {
        Settings {
            memory_warning_threshold_percent: self.memory_warning_percent,
            memory_critical_threshold_percent: self.memory_critical_percent,
            cpu_warning_threshold_percent: self.cpu_warning_percent,
            cpu_critical_threshold_percent: self.cpu_critical_percent,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub theme: String,
    pub color_support: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            theme: "dark".to_string(),
            color_support: "auto".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub next_tab: String,
    pub prev_tab: String,
    pub request_gc: String,
    pub export: String,
    pub dismiss_success: String,
    pub dismiss_failure: String,
    pub raise_thresholds: String,
    pub lower_thresholds: String,
    pub help: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            next_tab: "Tab".to_string(),
            prev_tab: "BackTab".to_string(),
            request_gc: "g".to_string(),
            export: "e".to_string(),
            dismiss_success: "d".to_string(),
            dismiss_failure: "D".to_string(),
            raise_thresholds: "+".to_string(),
            lower_thresholds: "-".to_string(),
            help: "?".to_string(),
        }
    }
}

/// Parse a key name from the config file. Single characters map to
/// themselves; a few named keys are recognized case-insensitively.
pub fn parse_key(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    match s.to_ascii_lowercase().as_str() {
        "tab" => Some(KeyCode::Tab),
        "backtab" | "shift+tab" => Some(KeyCode::BackTab),
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        _ => None,
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("perfpanel").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config; using defaults");
                Config::default()
            }
        },
        Err(_) => Config::default(),
    }
}
