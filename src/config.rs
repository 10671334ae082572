// SPDX-License-Identifier: GPL-3.0-only

use crate::app::frame_processor::{
    DetectionSettings, FrameSampler, LightClassifier, Sensitivity, TargetColor,
};
use crate::app::sequencer::SequencerTiming;
use crate::constants::app_info::{APP_NAME, CONFIG_FILE};
use crate::constants::{capture, detection, timing};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Sequencer delays, in milliseconds
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Minimum interval between two analysed frames
    pub detection_interval_ms: u64,
    /// Wait after turning the flashlight on, before the snapshot
    pub settle_delay_ms: u64,
    /// Wait after a capture before detection re-arms
    pub cooldown_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            detection_interval_ms: timing::DETECTION_INTERVAL.as_millis() as u64,
            settle_delay_ms: timing::SETTLE_DELAY.as_millis() as u64,
            cooldown_delay_ms: timing::COOLDOWN_DELAY.as_millis() as u64,
        }
    }
}

impl From<TimingConfig> for SequencerTiming {
    fn from(config: TimingConfig) -> Self {
        SequencerTiming {
            detection_interval: Duration::from_millis(config.detection_interval_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            cooldown_delay: Duration::from_millis(config.cooldown_delay_ms),
        }
    }
}

/// Frame scanning parameters
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Sample every n-th pixel on both axes
    pub sample_stride: u32,
    /// Per-channel tolerance for target color matching
    pub color_tolerance: u8,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_stride: detection::SAMPLE_STRIDE,
            color_tolerance: detection::COLOR_TOLERANCE,
        }
    }
}

impl DetectionConfig {
    /// Classifier configured with these parameters
    pub fn classifier(&self) -> LightClassifier {
        LightClassifier::with_params(
            FrameSampler::with_stride(self.sample_stride),
            self.color_tolerance,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detection sensitivity (0-100)
    pub sensitivity: Sensitivity,
    /// Turn the flashlight on around each capture
    pub flashlight_assist: bool,
    /// Only lights close to this color trigger a capture
    pub target_color: Option<TargetColor>,
    /// Where captures are saved (pictures folder when unset)
    pub output_dir: Option<PathBuf>,
    /// JPEG quality of saved captures
    pub jpeg_quality: u8,
    pub timing: TimingConfig,
    pub detection: DetectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::default(),
            flashlight_assist: true,
            target_color: None,
            output_dir: None,
            jpeg_quality: capture::JPEG_QUALITY,
            timing: TimingConfig::default(),
            detection: DetectionConfig::default(),
        }
    }
}

impl Config {
    /// `<config dir>/light-capture/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Write to `path` as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Runtime tunables for the detection loop
    pub fn detection_settings(&self) -> DetectionSettings {
        DetectionSettings {
            sensitivity: self.sensitivity,
            flashlight_assist: self.flashlight_assist,
            target_color: self.target_color,
        }
    }

    /// Capture folder, resolved against the platform default
    pub fn capture_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(crate::storage::default_capture_dir)
    }
}
