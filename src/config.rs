//! Tunables for the runtime and the resize coordinator.
//!
//! The JS host may pass these as a JSON object; any omitted field keeps its
//! default.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed backdrop options: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Wait before the new visualizer becomes current.
    pub settle_delay_ms: u32,
    /// Wait after the commit before further switches are accepted.
    pub transition_window_ms: u32,
    /// Reset playback speed to 1x whenever a switch is accepted.
    pub reset_speed_on_switch: bool,
}

impl RuntimeOptions {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.settle_delay_ms))
    }

    pub fn transition_window(&self) -> Duration {
        Duration::from_millis(u64::from(self.transition_window_ms))
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            settle_delay_ms: 50,
            transition_window_ms: 300,
            reset_speed_on_switch: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResizeOptions {
    /// Minimum width change in layout px that counts as a resize.
    pub width_threshold: f64,
    /// Minimum height change. Large enough to absorb mobile toolbar show/hide.
    pub height_threshold: f64,
    pub debounce_ms: u32,
}

impl ResizeOptions {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.debounce_ms))
    }
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            width_threshold: 10.0,
            height_threshold: 100.0,
            debounce_ms: 150,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackdropOptions {
    pub runtime: RuntimeOptions,
    pub resize: ResizeOptions,
}

impl BackdropOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
