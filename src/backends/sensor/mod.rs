// SPDX-License-Identifier: GPL-3.0-only

//! Sensor stream abstraction
//!
//! A capture session depends only on two per-frame acquisition handles,
//! one for depth and one for color:
//!
//! ```text
//! ┌──────────────┐  open_streams()  ┌──────────────────────────┐
//! │ DepthSensor  │ ───────────────▶ │ SensorStreams            │
//! └──────────────┘                  │  depth: FrameSource      │
//!                                   │  color: FrameSource      │
//!                                   └──────────────────────────┘
//! ```
//!
//! Each handle is polled with a zero timeout. `Ok(None)` means no frame is
//! ready yet and is a normal outcome, not an error.

pub mod queue;
pub mod types;

pub use queue::FrameQueue;
pub use types::*;

use crate::errors::SensorError;

/// Per-frame acquisition handle for one sensor stream
pub trait FrameSource {
    /// Frame type delivered by this stream
    type Frame;

    /// Poll for the next frame without blocking
    ///
    /// # Returns
    /// * `Ok(Some(frame))` - A new frame is ready
    /// * `Ok(None)` - No new frame since the last poll
    /// * `Err(SensorError)` - The stream timed out or was closed
    fn try_next_frame(&mut self) -> Result<Option<Self::Frame>, SensorError>;

    /// Hand a frame back to the stream once it has been consumed
    fn release_frame(&mut self, frame: Self::Frame);
}

/// The two stream handles obtained from a sensor handshake
pub struct SensorStreams<D, C> {
    pub depth: D,
    pub color: C,
    /// Resolution the depth stream delivers
    pub depth_resolution: Resolution,
    /// Resolution the color stream delivers
    pub color_resolution: Resolution,
}

/// A device able to open its depth and color streams
///
/// This is the single handshake a capture session needs; enumeration and
/// device control live outside the capture core.
pub trait DepthSensor {
    type Depth: FrameSource<Frame = DepthFrame>;
    type Color: FrameSource<Frame = ColorFrame>;

    /// Human-readable device name for logging
    fn name(&self) -> &str;

    /// Open both streams at the device's fixed resolution
    fn open_streams(self) -> Result<SensorStreams<Self::Depth, Self::Color>, SensorError>;
}
