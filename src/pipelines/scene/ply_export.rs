// SPDX-License-Identifier: GPL-3.0-only

//! ASCII PLY point cloud export
//!
//! Writes every point of the cloud, transformed by the calibration matrix,
//! as a vertex of an ASCII PLY file with an empty face element:
//!
//! ```text
//! ply
//! format ascii 1.0
//! element vertex <N>
//! property float x
//! property float y
//! property float z
//! element face 0
//! property list uchar int vertex_index
//! end_header
//! <x> <y> <z>
//! ```
//!
//! The file is written next to the destination under a temporary name and
//! renamed into place once complete, so a failed export never leaves a
//! truncated file at the destination.

use super::calibration::CalibrationMatrix;
use crate::constants::files::EXPORT_TEMP_SUFFIX;
use crate::errors::ExportError;
use crate::pipelines::capture::Point3D;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub vertex_count: usize,
}

/// Write the PLY header and one line per point
pub fn write_ply<W: Write>(writer: &mut W, points: &[Point3D]) -> std::io::Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", points.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "element face 0")?;
    writeln!(writer, "property list uchar int vertex_index")?;
    writeln!(writer, "end_header")?;

    for p in points {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    Ok(())
}

/// Export `points`, transformed by `calibration`, to `path`
///
/// Every point is written, including points without a range reading.
///
/// # Errors
/// * [`ExportError::Open`] - the file could not be created; nothing was written
/// * [`ExportError::Write`] - writing failed; the destination is untouched
/// * [`ExportError::Persist`] - the finished file could not be moved into place
pub fn export_point_cloud_ply(
    points: &[Point3D],
    calibration: &CalibrationMatrix,
    path: &Path,
) -> Result<ExportSummary, ExportError> {
    let transformed = calibration.apply_to_points(points);
    let temp_path = temp_path_for(path).ok_or_else(|| ExportError::Open {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "export path has no file name",
        ),
    })?;

    let file = File::create(&temp_path).map_err(|source| ExportError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        point_count = transformed.len(),
        path = %path.display(),
        "Exporting point cloud"
    );

    if let Err(source) = write_and_sync(file, &transformed) {
        discard(&temp_path);
        return Err(ExportError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    if let Err(source) = std::fs::rename(&temp_path, path) {
        discard(&temp_path);
        return Err(ExportError::Persist {
            path: path.to_path_buf(),
            source,
        });
    }

    debug!(path = %path.display(), "PLY export complete");

    Ok(ExportSummary {
        path: path.to_path_buf(),
        vertex_count: transformed.len(),
    })
}

fn write_and_sync(file: File, points: &[Point3D]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(file);
    write_ply(&mut writer, points)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Sibling path the export is written to before the final rename
/// Sibling written while the export is in progress; `None` without a file name
fn temp_path_for(path: &Path) -> Option<PathBuf> {
    let mut name = path.file_name()?.to_os_string();
    name.push(EXPORT_TEMP_SUFFIX);
    Some(path.with_file_name(name))
}

fn discard(temp_path: &Path) {
    if let Err(e) = std::fs::remove_file(temp_path) {
        warn!(path = %temp_path.display(), error = %e, "Failed to remove partial export");
    }
}
