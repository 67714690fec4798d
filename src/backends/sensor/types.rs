// SPDX-License-Identifier: GPL-3.0-only

//! Shared frame types for sensor streams
//!
//! Frames carry their raw bytes untouched. Samples are decoded with explicit
//! fixed-width little-endian reads, bounds-checked against the buffer, so a
//! short or malformed frame is rejected rather than read past its end.

use crate::constants::{COLOR_BYTES_PER_PIXEL, DEPTH_BYTES_PER_SAMPLE, depth};
use crate::errors::SensorError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Raster size of a sensor stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in the raster
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major buffer index of pixel `(i, j)`
    pub fn index(&self, i: u32, j: u32) -> usize {
        j as usize * self.width as usize + i as usize
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(crate::constants::DEPTH_WIDTH, crate::constants::DEPTH_HEIGHT)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Reference-counted frame bytes
///
/// Cloning shares the underlying allocation, so a replay source can hand out
/// the same frame every poll without copying pixels.
#[derive(Clone)]
pub struct FrameData(Arc<[u8]>);

impl FrameData {
    /// Get the length of the frame data in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the frame data is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for FrameData {
    fn from(bytes: Vec<u8>) -> Self {
        FrameData(bytes.into())
    }
}

impl From<&[u8]> for FrameData {
    fn from(bytes: &[u8]) -> Self {
        FrameData(bytes.into())
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameData({} bytes)", self.0.len())
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// Check that `height` rows of `row_bytes` each, `pitch` apart, fit in `len` bytes
fn check_raster(
    width: u32,
    height: u32,
    pitch: usize,
    len: usize,
    bytes_per_pixel: usize,
) -> Result<(), SensorError> {
    if width == 0 || height == 0 || pitch == 0 || len == 0 {
        return Err(SensorError::EmptyFrame);
    }

    let row_bytes = width as usize * bytes_per_pixel;
    if pitch < row_bytes {
        return Err(SensorError::InvalidLayout(format!(
            "pitch {} is smaller than a {}-pixel row ({} bytes)",
            pitch, width, row_bytes
        )));
    }

    let required = (height as usize - 1) * pitch + row_bytes;
    if len < required {
        return Err(SensorError::InvalidLayout(format!(
            "{} bytes cannot hold {}x{} raster with pitch {} ({} bytes needed)",
            len, width, height, pitch, required
        )));
    }

    Ok(())
}

/// One raw depth frame
///
/// Every sample is a little-endian `u16` with the range in millimetres in
/// the high 13 bits and a player index in the low 3 bits.
#[derive(Debug, Clone)]
pub struct DepthFrame {
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of consecutive rows
    pub pitch: usize,
    pub data: FrameData,
}

impl DepthFrame {
    pub fn new(width: u32, height: u32, pitch: usize, data: impl Into<FrameData>) -> Self {
        Self {
            width,
            height,
            pitch,
            data: data.into(),
        }
    }

    /// Build a tightly packed frame from range values in millimetres
    ///
    /// Values above [`depth::DEPTH_MAX_MM`] saturate.
    pub fn from_millimetres(width: u32, height: u32, millimetres: &[u16]) -> Self {
        let bytes: Vec<u8> = millimetres
            .iter()
            .flat_map(|&mm| pack_depth(mm).to_le_bytes())
            .collect();
        Self::new(width, height, width as usize * DEPTH_BYTES_PER_SAMPLE, bytes)
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Verify the byte layout can hold every declared sample
    pub fn check_layout(&self) -> Result<(), SensorError> {
        check_raster(
            self.width,
            self.height,
            self.pitch,
            self.data.len(),
            DEPTH_BYTES_PER_SAMPLE,
        )
    }

    /// Packed samples of row `j`, or `None` past the end of the data
    pub fn row(&self, j: u32) -> Option<impl Iterator<Item = u16> + '_> {
        let start = j as usize * self.pitch;
        let end = start + self.width as usize * DEPTH_BYTES_PER_SAMPLE;
        let bytes = self.data.get(start..end)?;
        Some(
            bytes
                .chunks_exact(DEPTH_BYTES_PER_SAMPLE)
                .map(|b| u16::from_le_bytes([b[0], b[1]])),
        )
    }

    /// Packed sample at `(i, j)`
    pub fn packed_sample(&self, i: u32, j: u32) -> Option<u16> {
        if i >= self.width {
            return None;
        }
        let offset = j as usize * self.pitch + i as usize * DEPTH_BYTES_PER_SAMPLE;
        let bytes = self.data.get(offset..offset + DEPTH_BYTES_PER_SAMPLE)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

/// Range in millimetres carried by a packed depth sample
pub fn depth_to_millimetres(packed: u16) -> u16 {
    packed >> depth::PLAYER_INDEX_BITS
}

/// Player index carried by a packed depth sample
pub fn player_index(packed: u16) -> u8 {
    (packed & depth::PLAYER_INDEX_MASK) as u8
}

/// Pack a range in millimetres with player index 0
pub fn pack_depth(millimetres: u16) -> u16 {
    millimetres.min(depth::DEPTH_MAX_MM) << depth::PLAYER_INDEX_BITS
}

/// One raw color frame, 4 bytes per pixel in B, G, R, X order
#[derive(Debug, Clone)]
pub struct ColorFrame {
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of consecutive rows
    pub pitch: usize,
    pub data: FrameData,
}

impl ColorFrame {
    pub fn new(width: u32, height: u32, pitch: usize, data: impl Into<FrameData>) -> Self {
        Self {
            width,
            height,
            pitch,
            data: data.into(),
        }
    }

    /// Build a tightly packed BGRX frame from RGB triples
    pub fn from_rgb(width: u32, height: u32, rgb: &[[u8; 3]]) -> Self {
        let bytes: Vec<u8> = rgb.iter().flat_map(|&[r, g, b]| [b, g, r, 0xFF]).collect();
        Self::new(width, height, width as usize * COLOR_BYTES_PER_PIXEL, bytes)
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Verify the byte layout can hold every declared pixel
    pub fn check_layout(&self) -> Result<(), SensorError> {
        check_raster(
            self.width,
            self.height,
            self.pitch,
            self.data.len(),
            COLOR_BYTES_PER_PIXEL,
        )
    }

    /// Stored B, G, R bytes of pixel `(x, y)`
    ///
    /// The offset is `y * pitch + x * 4` with no per-row clamping, so
    /// `x == width` addresses the first pixel of the next row. Returns `None`
    /// when the three bytes lie past the end of the data.
    pub fn bgr_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let offset = y as usize * self.pitch + x as usize * COLOR_BYTES_PER_PIXEL;
        let bytes = self.data.get(offset..offset + 3)?;
        Some([bytes[0], bytes[1], bytes[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_packing() {
        let packed = pack_depth(1234);
        assert_eq!(packed, 1234 << 3);
        assert_eq!(depth_to_millimetres(packed), 1234);
        assert_eq!(player_index(packed | 0b101), 5);
        assert_eq!(depth_to_millimetres(packed | 0b101), 1234);
    }

    #[test]
    fn test_pack_depth_saturates() {
        assert_eq!(depth_to_millimetres(pack_depth(u16::MAX)), depth::DEPTH_MAX_MM);
    }

    #[test]
    fn test_depth_rows_respect_pitch() {
        // 2x2 frame with 2 bytes of row padding
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&8u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(&[0xAA, 0xAA]);
        bytes.extend_from_slice(&24u16.to_le_bytes());
        bytes.extend_from_slice(&32u16.to_le_bytes());
        let frame = DepthFrame::new(2, 2, 6, bytes);

        assert!(frame.check_layout().is_ok());
        let row1: Vec<u16> = frame.row(1).unwrap().collect();
        assert_eq!(row1, vec![24, 32]);
        assert_eq!(frame.packed_sample(1, 0), Some(16));
        assert_eq!(frame.packed_sample(2, 0), None);
    }

    #[test]
    fn test_empty_frames_rejected() {
        let zero_pitch = DepthFrame::new(4, 4, 0, vec![0u8; 32]);
        assert_eq!(zero_pitch.check_layout(), Err(SensorError::EmptyFrame));

        let no_data = ColorFrame::new(4, 4, 16, Vec::new());
        assert_eq!(no_data.check_layout(), Err(SensorError::EmptyFrame));
    }

    #[test]
    fn test_short_frame_rejected() {
        let frame = DepthFrame::new(4, 4, 8, vec![0u8; 31]);
        assert!(matches!(
            frame.check_layout(),
            Err(SensorError::InvalidLayout(_))
        ));

        let narrow_pitch = ColorFrame::new(4, 1, 12, vec![0u8; 16]);
        assert!(matches!(
            narrow_pitch.check_layout(),
            Err(SensorError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_color_from_rgb_stores_bgr() {
        let frame = ColorFrame::from_rgb(2, 1, &[[10, 20, 30], [40, 50, 60]]);
        assert_eq!(frame.bgr_at(0, 0), Some([30, 20, 10]));
        assert_eq!(frame.bgr_at(1, 0), Some([60, 50, 40]));
        assert_eq!(frame.bgr_at(2, 0), None);
    }

    #[test]
    fn test_resolution_index_is_row_major() {
        let res = Resolution::new(640, 480);
        assert_eq!(res.pixel_count(), 307_200);
        assert_eq!(res.index(3, 2), 2 * 640 + 3);
        assert_eq!(res.to_string(), "640x480");
    }
}
