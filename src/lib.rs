// SPDX-License-Identifier: MPL-2.0

//! Depth Capture - point cloud capture from a combined depth and color sensor
//!
//! This library turns each depth frame into camera-space 3D points, colors
//! them from the color stream, and exports the calibrated result as PLY.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Sensor stream abstraction, projection model and frame sources
//! - [`pipelines`]: Capture (unprojection, color sampling, scheduling) and scene export
//! - [`config`]: User configuration handling
//! - [`errors`]: Error types shared across the crate
//!
//! # Example
//!
//! ```no_run
//! use depth_capture::backends::kinect::NominalProjection;
//! use depth_capture::backends::replay::SyntheticSensor;
//! use depth_capture::backends::sensor::DepthSensor;
//! use depth_capture::{CaptureScheduler, CaptureSession};
//!
//! let sensor = SyntheticSensor::default();
//! let streams = sensor.open_streams()?;
//! let projection = NominalProjection::new(
//!     streams.depth_resolution,
//!     streams.color_resolution,
//!     Default::default(),
//! );
//! let mut session = CaptureSession::new(streams, projection, CaptureScheduler::default());
//! session.refresh();
//! session.export_ply(std::path::Path::new("scan.ply"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;

// Re-export commonly used types
pub use config::{CalibrationSetting, Config};
pub use errors::{AppError, AppResult};
pub use pipelines::capture::{CaptureScheduler, CaptureSession, RefreshStatus};
pub use pipelines::scene::CalibrationMatrix;
