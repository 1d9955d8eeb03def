use crate::assets::{
    COOLDOWN_SECS, FRAME_HEIGHT, FRAME_RATE, FRAME_WIDTH, SERIAL_BAUD, SERIAL_OPEN_TIMEOUT_SECS,
    SERIAL_PORT, SERIAL_SETTLE_MILLIS,
};
use crate::error::{Result, ScanError};
use crate::link::LinkSettings;
use crate::utils::secs_to_duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration, read from an optional JSON file and then
/// overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub port: String,
    pub baud: u32,
    pub open_timeout_secs: f64,
    pub settle_millis: u64,
    pub cooldown_secs: f64,
    pub camera_width: u32,
    pub camera_height: u32,
    pub frame_rate: u32,
    pub records: Option<PathBuf>,
    pub replay: Option<PathBuf>,
    pub tone: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: SERIAL_PORT.to_string(),
            baud: SERIAL_BAUD,
            open_timeout_secs: SERIAL_OPEN_TIMEOUT_SECS,
            settle_millis: SERIAL_SETTLE_MILLIS,
            cooldown_secs: COOLDOWN_SECS,
            camera_width: FRAME_WIDTH,
            camera_height: FRAME_HEIGHT,
            frame_rate: FRAME_RATE,
            records: None,
            replay: None,
            tone: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&json)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Reject values the loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(ScanError::Config("port must not be empty".into()));
        }
        if self.baud == 0 {
            return Err(ScanError::Config("baud must be positive".into()));
        }
        if secs_to_duration(self.open_timeout_secs).is_none() {
            return Err(ScanError::Config(format!(
                "open_timeout_secs must be a non-negative number, got {}",
                self.open_timeout_secs
            )));
        }
        if secs_to_duration(self.cooldown_secs).is_none() {
            return Err(ScanError::Config(format!(
                "cooldown_secs must be a non-negative number, got {}",
                self.cooldown_secs
            )));
        }
        if self.camera_width == 0 || self.camera_height == 0 {
            return Err(ScanError::Config(format!(
                "camera size must be non-zero, got {}x{}",
                self.camera_width, self.camera_height
            )));
        }
        if self.frame_rate == 0 {
            return Err(ScanError::Config("frame_rate must be positive".into()));
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        secs_to_duration(self.cooldown_secs).unwrap_or_default()
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            port: self.port.clone(),
            baud: self.baud,
            timeout: secs_to_duration(self.open_timeout_secs).unwrap_or_default(),
            settle: Duration::from_millis(self.settle_millis),
        }
    }
}

/// Returns a version as specified in Cargo.toml
pub fn app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn app_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}
