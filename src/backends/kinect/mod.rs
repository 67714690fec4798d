// SPDX-License-Identifier: GPL-3.0-only

//! Depth sensor projection model
//!
//! Maps a depth pixel and its packed range to:
//! - a homogeneous camera-space point (unprojection)
//! - the pixel of the color raster that sees the same physical point
//!
//! Camera space is right-handed in metres: +X right, +Y up, +Z away from
//! the sensor. The nominal model uses the sensor's published focal lengths
//! and a fixed horizontal baseline between the two imagers.

use crate::backends::sensor::Resolution;
use crate::constants::{depth, projection};
use serde::{Deserialize, Serialize};

/// Projection from depth pixels to camera space and to the color raster
pub trait ProjectionModel {
    /// Homogeneous camera-space point `[x, y, z, w]` for depth pixel `(i, j)`
    ///
    /// `packed_depth` is the range in millimetres shifted left by
    /// [`depth::PLAYER_INDEX_BITS`].
    fn depth_to_camera(&self, i: u32, j: u32, packed_depth: u32) -> [f32; 4];

    /// Color-raster pixel `[x, y]` seeing the same point as depth pixel `(i, j)`
    ///
    /// Returns [`projection::NO_CORRESPONDENCE`] when no color pixel
    /// corresponds (no range reading). The result may lie outside the color
    /// raster near its edges.
    fn depth_to_color(&self, i: u32, j: u32, packed_depth: u32) -> [i32; 2];
}

/// Tunable constants of the nominal projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Inverse depth focal length (1/pixels) quoted at 320x240
    pub depth_inverse_focal_length: f32,
    /// Color focal length (pixels) quoted at 640x480
    pub color_focal_length: f32,
    /// Horizontal offset of the color imager from the depth imager (metres)
    pub baseline_m: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            depth_inverse_focal_length: projection::DEPTH_INVERSE_FOCAL_LENGTH_320X240,
            color_focal_length: projection::COLOR_FOCAL_LENGTH_640X480,
            baseline_m: projection::DEPTH_TO_COLOR_BASELINE_M,
        }
    }
}

/// Nominal pinhole projection for a depth/color sensor pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NominalProjection {
    depth: Resolution,
    color: Resolution,
    settings: ProjectionSettings,
}

impl NominalProjection {
    pub fn new(depth: Resolution, color: Resolution, settings: ProjectionSettings) -> Self {
        Self {
            depth,
            color,
            settings,
        }
    }

    pub fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }
}

impl Default for NominalProjection {
    fn default() -> Self {
        Self::new(
            Resolution::new(crate::constants::DEPTH_WIDTH, crate::constants::DEPTH_HEIGHT),
            Resolution::new(crate::constants::COLOR_WIDTH, crate::constants::COLOR_HEIGHT),
            ProjectionSettings::default(),
        )
    }
}

impl ProjectionModel for NominalProjection {
    fn depth_to_camera(&self, i: u32, j: u32, packed_depth: u32) -> [f32; 4] {
        let z = (packed_depth >> depth::PLAYER_INDEX_BITS) as f32 / 1000.0;

        let width = self.depth.width as f32;
        let height = self.depth.height as f32;
        let scale = self.settings.depth_inverse_focal_length * z;

        let x = (i as f32 - width / 2.0)
            * (projection::DEPTH_REFERENCE_WIDTH / width)
            * scale;
        let y = -(j as f32 - height / 2.0)
            * (projection::DEPTH_REFERENCE_HEIGHT / height)
            * scale;

        [x, y, z, 1.0]
    }

    fn depth_to_color(&self, i: u32, j: u32, packed_depth: u32) -> [i32; 2] {
        let [x, y, z, w] = self.depth_to_camera(i, j, packed_depth);
        if z <= 0.0 || w == 0.0 {
            return projection::NO_CORRESPONDENCE;
        }

        let (x, y, z) = (x / w, y / w, z / w);
        let focal = self.settings.color_focal_length
            * (self.color.width as f32 / projection::COLOR_REFERENCE_WIDTH);

        let u = self.color.width as f32 / 2.0 + focal * (x - self.settings.baseline_m) / z;
        let v = self.color.height as f32 / 2.0 - focal * y / z;

        if !u.is_finite() || !v.is_finite() {
            return projection::NO_CORRESPONDENCE;
        }

        [u.round() as i32, v.round() as i32]
    }
}
