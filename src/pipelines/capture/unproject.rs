// SPDX-License-Identifier: GPL-3.0-only

//! Depth unprojection
//!
//! Turns one packed depth frame into camera-space points and the matching
//! color-raster coordinates, both written in depth-pixel order.

use super::buffers::{IndexMap, Point3D};
use crate::backends::kinect::ProjectionModel;
use crate::backends::sensor::{DepthFrame, depth_to_millimetres};
use crate::constants::depth::PLAYER_INDEX_BITS;
use crate::errors::SensorError;

/// Unproject every pixel of `frame` into `points` and `index_map`
///
/// The frame layout and buffer sizes are validated before anything is
/// written, so on `Err` both buffers are untouched.
pub fn unproject_depth_frame<P: ProjectionModel + ?Sized>(
    frame: &DepthFrame,
    projection: &P,
    points: &mut [Point3D],
    index_map: &mut IndexMap,
) -> Result<(), SensorError> {
    frame.check_layout()?;

    let expected = frame.resolution().pixel_count();
    if points.len() != expected || index_map.len() != expected {
        return Err(SensorError::InvalidLayout(format!(
            "{} frame does not fill {} point slots",
            frame.resolution(),
            points.len()
        )));
    }

    let width = frame.width as usize;
    let entries = index_map.entries_mut();

    for j in 0..frame.height {
        // check_layout guarantees every row is present
        let Some(row) = frame.row(j) else {
            continue;
        };
        let base = j as usize * width;

        for (i, packed) in row.enumerate() {
            let k = base + i;
            let i = i as u32;
            let packed_depth = u32::from(depth_to_millimetres(packed)) << PLAYER_INDEX_BITS;

            points[k] = Point3D::from_homogeneous(projection.depth_to_camera(i, j, packed_depth));
            entries[k] = projection.depth_to_color(i, j, packed_depth);
        }
    }

    Ok(())
}
