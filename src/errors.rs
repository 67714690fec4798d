// SPDX-License-Identifier: GPL-3.0-only

//! Error types for depth capture and export

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Sensor stream errors
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
    /// Calibration matrix errors
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),
    /// Point cloud export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Filesystem errors outside an export
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Sensor stream errors
///
/// None of these are fatal for a capture session: a refresh that hits one
/// is reported as a miss and the buffers keep their previous contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The stream did not deliver a frame within its poll interval
    #[error("Timed out waiting for frame")]
    Timeout,
    /// The stream was closed by the device
    #[error("Stream closed")]
    StreamClosed,
    /// Frame has zero pitch or no data
    #[error("Frame is empty")]
    EmptyFrame,
    /// Frame byte layout cannot hold the declared raster
    #[error("Invalid frame layout: {0}")]
    InvalidLayout(String),
    /// Frame resolution differs from the session resolution
    #[error("Unexpected frame size {got_width}x{got_height}, expected {width}x{height}")]
    ResolutionMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },
    /// Failure loading frames from a replay source
    #[error("Frame source error: {0}")]
    Source(String),
}

/// Calibration matrix errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// Wrong number of matrix values
    #[error("Expected 16 matrix values, got {0}")]
    WrongLength(usize),
    /// Matrix contains NaN or infinite values
    #[error("Matrix contains non-finite values")]
    NonFinite,
    /// Matrix is not a rotation plus translation
    #[error("Matrix is not a rigid transform: {0}")]
    NotRigid(String),
}

/// Point cloud export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Destination could not be opened; nothing was written
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing header or point data failed
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Moving the finished file into place failed
    #[error("Failed to move finished export to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Config file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid JSON for [`crate::Config`]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the pipeline cannot use
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}
