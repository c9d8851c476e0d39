use crate::error::BlinkyError;
use crate::infrastructure::bluetooth::protocol;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Diagnostics only; the console lines a user reads are not affected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default)]
    pub file_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
    #[serde(default)]
    pub show_file_line: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_logging_enabled: true,
            file_logging_enabled: false,
            log_dir: default_log_dir(),
            rotation: default_rotation(),
            show_file_line: false,
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}
fn default_true() -> bool {
    true
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_target_name")]
    pub target_name: String,
    #[serde(default = "default_button_uuid")]
    pub button_char_uuid: String,
    #[serde(default = "default_led_uuid")]
    pub led_char_uuid: String,
    #[serde(default = "default_scan_duration_secs")]
    pub scan_duration_secs: f64,
    #[serde(default)]
    pub adapter_index: usize,
    /// Stop mirroring after this many read/write pairs. `None` mirrors until
    /// the process is interrupted.
    #[serde(default)]
    pub max_mirror_iterations: Option<u64>,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_name: default_target_name(),
            button_char_uuid: default_button_uuid(),
            led_char_uuid: default_led_uuid(),
            scan_duration_secs: default_scan_duration_secs(),
            adapter_index: 0,
            max_mirror_iterations: None,
            log_settings: LogSettings::default(),
        }
    }
}

fn default_target_name() -> String {
    protocol::TARGET_NAME.to_string()
}
fn default_button_uuid() -> String {
    protocol::BUTTON_CHAR_UUID.to_string()
}
fn default_led_uuid() -> String {
    protocol::LED_CHAR_UUID.to_string()
}
fn default_scan_duration_secs() -> f64 {
    protocol::SCAN_DURATION_SECS
}

impl Settings {
    /// Check the values that would otherwise only fail once the radio is busy.
    pub fn validate(&self) -> Result<(), BlinkyError> {
        self.button_uuid()?;
        self.led_uuid()?;
        self.scan_duration()?;
        Ok(())
    }

    pub fn button_uuid(&self) -> Result<Uuid, BlinkyError> {
        parse_uuid("button_char_uuid", &self.button_char_uuid)
    }

    pub fn led_uuid(&self) -> Result<Uuid, BlinkyError> {
        parse_uuid("led_char_uuid", &self.led_char_uuid)
    }

    pub fn scan_duration(&self) -> Result<Duration, BlinkyError> {
        Duration::try_from_secs_f64(self.scan_duration_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                BlinkyError::InvalidSettings(format!(
                    "scan_duration_secs must be a positive number, got {}",
                    self.scan_duration_secs
                ))
            })
    }
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, BlinkyError> {
    Uuid::parse_str(value)
        .map_err(|e| BlinkyError::InvalidSettings(format!("{field} '{value}': {e}")))
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
    load_error: Option<String>,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::from_path(settings_path)
    }

    /// Load settings from `path`, writing the defaults there when the file
    /// does not exist yet. An unreadable file is left alone and the defaults
    /// are used; the reason is kept for [`Self::load_error`].
    pub fn from_path(settings_path: PathBuf) -> anyhow::Result<Self> {
        if !settings_path.exists() {
            let service = Self {
                settings: Settings::default(),
                settings_path,
                load_error: None,
            };
            service.save()?;
            info!("Wrote default settings to {:?}", service.settings_path);
            return Ok(service);
        }

        let (settings, load_error) = match Self::load_from_file(&settings_path) {
            Ok(settings) => (settings, None),
            Err(e) => (Settings::default(), Some(format!("{:#}", e))),
        };
        Ok(Self {
            settings,
            settings_path,
            load_error,
        })
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("NordicBlinky");
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    /// Why the settings file was ignored, if it was. Settings load before
    /// logging exists, so the caller reports this once logging is up.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }
}
