// SPDX-License-Identifier: GPL-3.0-only

//! Scene export pipeline
//!
//! Places the captured point cloud in the scene and writes it out:
//! - Calibration transform from sensor space to scene space
//! - Point cloud as ASCII PLY

pub mod calibration;
mod ply_export;

pub use calibration::CalibrationMatrix;
pub use ply_export::{ExportSummary, export_point_cloud_ply, write_ply};

use crate::constants::files::EXPORT_EXTENSION;
use std::path::{Path, PathBuf};

/// Export path in `dir` named after the current local time
///
/// e.g. `pointcloud_20261016_142501.ply`
pub fn timestamped_export_path(dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("pointcloud_{}.{}", timestamp, EXPORT_EXTENSION))
}
