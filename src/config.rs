// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON at `<config dir>/depth-capture/config.json`. A missing
//! file means defaults; a malformed one is an error rather than silently
//! replaced.

use crate::backends::kinect::ProjectionSettings;
use crate::constants::{files, timing};
use crate::errors::ConfigError;
use crate::pipelines::capture::CaptureScheduler;
use crate::pipelines::scene::CalibrationMatrix;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Which calibration the session exports with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "values")]
pub enum CalibrationSetting {
    /// No transform
    #[default]
    Identity,
    /// The rig's measured sensor pose
    Preset,
    /// 16 row-major values
    Custom(Vec<f32>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Refresh once every this many ticks
    pub refresh_period: u32,
    /// Host loop rate (ticks per second) used by the CLI
    pub tick_rate_hz: u32,
    /// Calibration applied at export
    pub calibration: CalibrationSetting,
    /// Nominal projection constants
    pub projection: ProjectionSettings,
    /// Directory for exports without an explicit path
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_period: timing::DEFAULT_REFRESH_PERIOD,
            tick_rate_hz: timing::DEFAULT_TICK_RATE_HZ,
            calibration: CalibrationSetting::default(),
            projection: ProjectionSettings::default(),
            output_dir: None,
        }
    }
}

impl Config {
    /// Location of the user's config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(files::CONFIG_DIR).join(files::CONFIG_FILE))
    }

    /// Load and validate `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(write_err)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Check every field the pipeline depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler()?;
        self.calibration_matrix()?;
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_rate_hz",
                reason: "must be at least 1".to_string(),
            });
        }
        let p = &self.projection;
        if !(p.depth_inverse_focal_length > 0.0 && p.color_focal_length > 0.0)
            || !p.baseline_m.is_finite()
        {
            return Err(ConfigError::Invalid {
                field: "projection",
                reason: "focal lengths must be positive and the baseline finite".to_string(),
            });
        }
        Ok(())
    }

    pub fn scheduler(&self) -> Result<CaptureScheduler, ConfigError> {
        NonZeroU32::new(self.refresh_period)
            .map(CaptureScheduler::new)
            .ok_or_else(|| ConfigError::Invalid {
                field: "refresh_period",
                reason: "must be at least 1".to_string(),
            })
    }

    pub fn calibration_matrix(&self) -> Result<CalibrationMatrix, ConfigError> {
        match &self.calibration {
            CalibrationSetting::Identity => Ok(CalibrationMatrix::IDENTITY),
            CalibrationSetting::Preset => Ok(CalibrationMatrix::sensor_preset()),
            CalibrationSetting::Custom(values) => {
                CalibrationMatrix::from_row_major(values).map_err(|e| ConfigError::Invalid {
                    field: "calibration",
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Time between host loop ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }

    /// Directory for exports without an explicit path
    pub fn export_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            dirs::document_dir()
                .map(|dir| dir.join(files::CONFIG_DIR))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }
}
