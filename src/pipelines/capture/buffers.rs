// SPDX-License-Identifier: GPL-3.0-only

//! Fixed-size capture buffers
//!
//! All three buffers are sized once for the depth resolution and overwritten
//! in place by every refresh. None of them ever grows or shrinks.

use crate::backends::sensor::Resolution;
use crate::constants::projection::NO_CORRESPONDENCE;
use serde::{Deserialize, Serialize};

/// Normalized camera-space point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point from a homogeneous `[x, y, z, w]`
    pub fn from_homogeneous([x, y, z, w]: [f32; 4]) -> Self {
        Self::new(x / w, y / w, z / w)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Point3D {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// Color with channels normalized to `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Color of points without a color correspondence
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Color from stored B, G, R bytes
    pub fn from_bgr([b, g, r]: [u8; 3]) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }
}

/// Per depth pixel color-raster coordinates, in depth-pixel order
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMap {
    entries: Vec<[i32; 2]>,
}

impl IndexMap {
    /// Map of `len` entries, all without correspondence
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![NO_CORRESPONDENCE; len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, k: usize) -> Option<[i32; 2]> {
        self.entries.get(k).copied()
    }

    pub fn entries(&self) -> &[[i32; 2]] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [[i32; 2]] {
        &mut self.entries
    }
}

impl From<Vec<[i32; 2]>> for IndexMap {
    fn from(entries: Vec<[i32; 2]>) -> Self {
        Self { entries }
    }
}

/// Point, color and index-map storage for one depth resolution
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffers {
    resolution: Resolution,
    points: Vec<Point3D>,
    colors: Vec<Rgb>,
    index_map: IndexMap,
}

impl FrameBuffers {
    /// Allocate zeroed buffers for `resolution`
    pub fn new(resolution: Resolution) -> Self {
        let len = resolution.pixel_count();
        Self {
            resolution,
            points: vec![Point3D::default(); len],
            colors: vec![Rgb::BLACK; len],
            index_map: IndexMap::new(len),
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of slots in every buffer
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn index_map(&self) -> &IndexMap {
        &self.index_map
    }

    /// Mutable views used by a refresh: points and index map for the
    /// unprojector, colors for the sampler
    pub fn split_mut(&mut self) -> (&mut [Point3D], &mut IndexMap, &mut [Rgb]) {
        (&mut self.points, &mut self.index_map, &mut self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_sized_for_resolution() {
        let buffers = FrameBuffers::new(Resolution::new(8, 6));
        assert_eq!(buffers.len(), 48);
        assert_eq!(buffers.points().len(), 48);
        assert_eq!(buffers.colors().len(), 48);
        assert_eq!(buffers.index_map().len(), 48);
        assert!(
            buffers
                .index_map()
                .entries()
                .iter()
                .all(|&e| e == NO_CORRESPONDENCE)
        );
    }

    #[test]
    fn test_rgb_from_bgr_reverses_channels() {
        let c = Rgb::from_bgr([0, 51, 255]);
        assert_eq!(c, Rgb::new(1.0, 0.2, 0.0));
    }

    #[test]
    fn test_point_from_homogeneous_divides_by_w() {
        let p = Point3D::from_homogeneous([2.0, 4.0, 6.0, 2.0]);
        assert_eq!(p, Point3D::new(1.0, 2.0, 3.0));
    }
}
