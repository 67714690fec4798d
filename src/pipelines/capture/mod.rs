// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipeline
//!
//! A [`CaptureSession`] owns the two sensor streams and the fixed-size
//! buffers they feed. Each refresh runs as one unit of work:
//!
//! ```text
//! depth stream ──▶ unproject_depth_frame ──▶ points, index map
//!                                                  │
//! color stream ──────────────▶ sample_color_frame ◀┘──▶ colors
//! ```
//!
//! Both frames are acquired and validated before any buffer is written, so
//! a miss on either stream leaves the previous frame intact. Index-map
//! entries are bounded by the depth resolution; the color frame may be a
//! different size.

pub mod buffers;
pub mod color;
pub mod scheduler;
pub mod unproject;

pub use buffers::{FrameBuffers, IndexMap, Point3D, Rgb};
pub use color::{in_color_bounds, sample_color_frame};
pub use scheduler::CaptureScheduler;
pub use unproject::unproject_depth_frame;

use crate::backends::kinect::ProjectionModel;
use crate::backends::sensor::{ColorFrame, DepthFrame, FrameSource, Resolution, SensorStreams};
use crate::errors::{ExportError, SensorError};
use crate::pipelines::scene::{CalibrationMatrix, ExportSummary, export_point_cloud_ply};
use std::path::Path;
use tracing::{debug, info, warn};

/// Sensor stream of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Depth,
    Color,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::Depth => write!(f, "depth"),
            Stream::Color => write!(f, "color"),
        }
    }
}

/// Why a refresh found nothing usable on a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// No new frame was ready
    NoFrame,
    /// The stream failed or delivered an unusable frame
    Sensor(SensorError),
}

/// Outcome of one tick or refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    /// The scheduler held this tick back
    Throttled,
    /// Points, colors and index map now hold the new frame pair
    Refreshed,
    /// Nothing was written; the previous frame is still in the buffers
    Missed { stream: Stream, reason: MissReason },
}

impl RefreshStatus {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, RefreshStatus::Refreshed)
    }
}

/// Result of [`CaptureSession::snapshot`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Outcome of the refresh attempted before exporting
    pub refresh: RefreshStatus,
    pub export: ExportSummary,
}

/// Capture state for one sensor: streams, projection, buffers, calibration
///
/// Created once when streams are opened and dropped when capture ends. The
/// buffers never change size over the session's lifetime.
pub struct CaptureSession<D, C, P> {
    depth: D,
    color: C,
    projection: P,
    buffers: FrameBuffers,
    scheduler: CaptureScheduler,
    calibration: CalibrationMatrix,
    refresh_count: u64,
}

impl<D, C, P> CaptureSession<D, C, P>
where
    D: FrameSource<Frame = DepthFrame>,
    C: FrameSource<Frame = ColorFrame>,
    P: ProjectionModel,
{
    /// Start a session with buffers sized for the depth stream
    pub fn new(streams: SensorStreams<D, C>, projection: P, scheduler: CaptureScheduler) -> Self {
        info!(
            depth = %streams.depth_resolution,
            color = %streams.color_resolution,
            refresh_period = scheduler.period().get(),
            "Starting capture session"
        );

        Self {
            depth: streams.depth,
            color: streams.color,
            projection,
            buffers: FrameBuffers::new(streams.depth_resolution),
            scheduler,
            calibration: CalibrationMatrix::IDENTITY,
            refresh_count: 0,
        }
    }

    /// Replace the calibration applied at export
    pub fn with_calibration(mut self, calibration: CalibrationMatrix) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn set_calibration(&mut self, calibration: CalibrationMatrix) {
        debug!(matrix = ?calibration.to_row_major(), "Calibration replaced");
        self.calibration = calibration;
    }

    /// Switch to the rig's measured sensor pose
    pub fn apply_calibration_preset(&mut self) {
        self.set_calibration(CalibrationMatrix::sensor_preset());
    }

    pub fn calibration(&self) -> &CalibrationMatrix {
        &self.calibration
    }

    /// Depth resolution the buffers are sized for
    pub fn resolution(&self) -> Resolution {
        self.buffers.resolution()
    }

    /// Camera-space points of the last good frame, row-major
    pub fn points(&self) -> &[Point3D] {
        self.buffers.points()
    }

    /// Colors of the last good frame, index-aligned with [`Self::points`]
    pub fn colors(&self) -> &[Rgb] {
        self.buffers.colors()
    }

    pub fn index_map(&self) -> &IndexMap {
        self.buffers.index_map()
    }

    /// Points paired with their colors, for a renderer
    pub fn colored_points(&self) -> impl Iterator<Item = (Point3D, Rgb)> + '_ {
        self.buffers
            .points()
            .iter()
            .copied()
            .zip(self.buffers.colors().iter().copied())
    }

    /// Number of successful refreshes so far
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// Advance the scheduler and refresh when it allows
    pub fn tick(&mut self) -> RefreshStatus {
        if !self.scheduler.tick() {
            return RefreshStatus::Throttled;
        }
        self.refresh()
    }

    /// Acquire one frame from each stream and rebuild all buffers
    pub fn refresh(&mut self) -> RefreshStatus {
        let depth = match acquire(&mut self.depth, Stream::Depth) {
            Ok(frame) => frame,
            Err(status) => return status,
        };

        let color = match acquire(&mut self.color, Stream::Color) {
            Ok(frame) => frame,
            Err(status) => {
                self.depth.release_frame(depth);
                return status;
            }
        };

        let status = self.process(&depth, &color);

        self.depth.release_frame(depth);
        self.color.release_frame(color);

        match &status {
            RefreshStatus::Refreshed => {
                self.refresh_count += 1;
                debug!(refresh_count = self.refresh_count, "Capture buffers refreshed");
            }
            RefreshStatus::Missed { stream, reason } => {
                warn!(%stream, ?reason, "Discarding unusable frame");
            }
            RefreshStatus::Throttled => {}
        }

        status
    }

    /// Validate both frames, then unproject and sample
    fn process(&mut self, depth: &DepthFrame, color: &ColorFrame) -> RefreshStatus {
        let expected = self.buffers.resolution();
        if depth.resolution() != expected {
            return missed(
                Stream::Depth,
                SensorError::ResolutionMismatch {
                    width: expected.width,
                    height: expected.height,
                    got_width: depth.width,
                    got_height: depth.height,
                },
            );
        }
        if let Err(e) = depth.check_layout() {
            return missed(Stream::Depth, e);
        }
        if let Err(e) = color.check_layout() {
            return missed(Stream::Color, e);
        }

        let (points, index_map, colors) = self.buffers.split_mut();
        if let Err(e) = unproject_depth_frame(depth, &self.projection, points, index_map) {
            return missed(Stream::Depth, e);
        }
        if let Err(e) = sample_color_frame(color, expected, index_map, colors) {
            return missed(Stream::Color, e);
        }

        RefreshStatus::Refreshed
    }

    /// Export the current points, transformed by the calibration
    pub fn export_ply(&self, path: &Path) -> Result<ExportSummary, ExportError> {
        export_point_cloud_ply(self.buffers.points(), &self.calibration, path)
    }

    /// Refresh once, then export whatever the buffers hold
    ///
    /// A missed refresh does not stop the export; the last good frame is
    /// written instead.
    pub fn snapshot(&mut self, path: &Path) -> Result<Snapshot, ExportError> {
        info!(path = %path.display(), "Saving view");

        let refresh = self.refresh();
        if !refresh.is_refreshed() {
            info!(?refresh, "Exporting last good frame");
        }

        let export = self.export_ply(path)?;
        info!(vertex_count = export.vertex_count, "Saving complete");

        Ok(Snapshot { refresh, export })
    }

    /// End the session, handing back the stream handles
    pub fn into_streams(self) -> (D, C) {
        (self.depth, self.color)
    }
}

fn acquire<S: FrameSource>(source: &mut S, stream: Stream) -> Result<S::Frame, RefreshStatus> {
    match source.try_next_frame() {
        Ok(Some(frame)) => Ok(frame),
        Ok(None) => {
            debug!(%stream, "No frame ready");
            Err(RefreshStatus::Missed {
                stream,
                reason: MissReason::NoFrame,
            })
        }
        Err(e) => {
            warn!(%stream, error = %e, "Frame acquisition failed");
            Err(RefreshStatus::Missed {
                stream,
                reason: MissReason::Sensor(e),
            })
        }
    }
}

fn missed(stream: Stream, error: SensorError) -> RefreshStatus {
    RefreshStatus::Missed {
        stream,
        reason: MissReason::Sensor(error),
    }
}
