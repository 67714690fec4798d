// SPDX-License-Identifier: GPL-3.0-only

//! Replay and synthetic sensors
//!
//! Stand-ins for a physical depth camera so the capture pipeline can run
//! without hardware:
//! - [`ReplaySensor`] loads a depth/color image pair saved from a capture
//! - [`SyntheticSensor`] generates a tilted plane with a color gradient
//!
//! Both deliver the same frame pair on every poll.

use crate::backends::sensor::{
    ColorFrame, DepthFrame, DepthSensor, FrameQueue, Resolution, SensorStreams,
};
use crate::constants::files;
use crate::errors::SensorError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sensor that replays a saved depth/color image pair
///
/// The directory must contain `depth.png` (16-bit grayscale, millimetres)
/// and `color.png` (8-bit RGB or RGBA).
pub struct ReplaySensor {
    name: String,
    depth: DepthFrame,
    color: ColorFrame,
}

impl ReplaySensor {
    /// Load the image pair from `dir`
    pub fn open(dir: &Path) -> Result<Self, SensorError> {
        let depth_path = dir.join(files::REPLAY_DEPTH);
        let color_path = dir.join(files::REPLAY_COLOR);

        let depth = load_depth_image(&depth_path)?;
        let color = load_color_image(&color_path)?;

        info!(
            dir = %dir.display(),
            depth = %depth.resolution(),
            color = %color.resolution(),
            "Opened replay sensor"
        );

        Ok(Self {
            name: format!("replay:{}", dir.display()),
            depth,
            color,
        })
    }
}

impl DepthSensor for ReplaySensor {
    type Depth = FrameQueue<DepthFrame>;
    type Color = FrameQueue<ColorFrame>;

    fn name(&self) -> &str {
        &self.name
    }

    fn open_streams(self) -> Result<SensorStreams<Self::Depth, Self::Color>, SensorError> {
        Ok(SensorStreams {
            depth_resolution: self.depth.resolution(),
            color_resolution: self.color.resolution(),
            depth: FrameQueue::repeating(self.depth),
            color: FrameQueue::repeating(self.color),
        })
    }
}

fn load_depth_image(path: &PathBuf) -> Result<DepthFrame, SensorError> {
    let img = image::open(path)
        .map_err(|e| SensorError::Source(format!("Failed to load {}: {}", path.display(), e)))?;
    let luma = img.into_luma16();
    let (width, height) = luma.dimensions();
    debug!(path = %path.display(), width, height, "Loaded depth image");
    Ok(DepthFrame::from_millimetres(width, height, luma.as_raw()))
}

fn load_color_image(path: &PathBuf) -> Result<ColorFrame, SensorError> {
    let img = image::open(path)
        .map_err(|e| SensorError::Source(format!("Failed to load {}: {}", path.display(), e)))?;
    let rgb = img.into_rgb8();
    let (width, height) = rgb.dimensions();
    let pixels: Vec<[u8; 3]> = rgb.pixels().map(|p| p.0).collect();
    debug!(path = %path.display(), width, height, "Loaded color image");
    Ok(ColorFrame::from_rgb(width, height, &pixels))
}

/// Sensor generating a tilted plane with a color gradient
pub struct SyntheticSensor {
    depth_resolution: Resolution,
    color_resolution: Resolution,
}

impl SyntheticSensor {
    pub fn new(depth_resolution: Resolution, color_resolution: Resolution) -> Self {
        Self {
            depth_resolution,
            color_resolution,
        }
    }

    /// Depth frame of a plane receding from 1 m at the left edge
    pub fn depth_frame(&self) -> DepthFrame {
        let Resolution { width, height } = self.depth_resolution;
        let millimetres: Vec<u16> = (0..height)
            .flat_map(|j| (0..width).map(move |i| synthetic_depth_mm(i, j)))
            .collect();
        DepthFrame::from_millimetres(width, height, &millimetres)
    }

    /// Color frame with red increasing left to right and green top to bottom
    pub fn color_frame(&self) -> ColorFrame {
        let Resolution { width, height } = self.color_resolution;
        let pixels: Vec<[u8; 3]> = (0..height)
            .flat_map(|y| (0..width).map(move |x| gradient(x, y, width, height)))
            .collect();
        ColorFrame::from_rgb(width, height, &pixels)
    }
}

impl Default for SyntheticSensor {
    fn default() -> Self {
        Self::new(Resolution::default(), Resolution::default())
    }
}

impl DepthSensor for SyntheticSensor {
    type Depth = FrameQueue<DepthFrame>;
    type Color = FrameQueue<ColorFrame>;

    fn name(&self) -> &str {
        "synthetic"
    }

    fn open_streams(self) -> Result<SensorStreams<Self::Depth, Self::Color>, SensorError> {
        Ok(SensorStreams {
            depth: FrameQueue::repeating(self.depth_frame()),
            color: FrameQueue::repeating(self.color_frame()),
            depth_resolution: self.depth_resolution,
            color_resolution: self.color_resolution,
        })
    }
}

fn synthetic_depth_mm(i: u32, j: u32) -> u16 {
    // Leave a border without readings, like the sensor's shadowed edge
    if i < 8 {
        return 0;
    }
    (1000 + i * 4 + j) as u16
}

fn gradient(x: u32, y: u32, width: u32, height: u32) -> [u8; 3] {
    let r = (x * 255 / width.max(1)) as u8;
    let g = (y * 255 / height.max(1)) as u8;
    [r, g, 128]
}
