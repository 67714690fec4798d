// SPDX-License-Identifier: GPL-3.0-only

//! Color sampling through the depth-to-color index map

use super::buffers::{IndexMap, Rgb};
use crate::backends::sensor::{ColorFrame, Resolution};
use crate::errors::SensorError;

/// Whether `[x, y]` passes the bounds check against a `width` x `height` raster
///
/// The upper bounds are inclusive (`x == width` and `y == height` pass), the
/// same convention the device's correspondence table was produced with.
/// Reads at those edges are still bounds-checked against the frame data by
/// [`ColorFrame::bgr_at`].
pub fn in_color_bounds([x, y]: [i32; 2], width: u32, height: u32) -> bool {
    !(x < 0 || y < 0 || i64::from(x) > i64::from(width) || i64::from(y) > i64::from(height))
}

/// Fill `colors` from `frame`, one sample per index-map entry
///
/// Entries outside `bounds` (the depth resolution the index map was built
/// at), or whose bytes lie past the end of the frame, become
/// [`Rgb::BLACK`]. The frame layout and buffer sizes are validated before
/// anything is written.
pub fn sample_color_frame(
    frame: &ColorFrame,
    bounds: Resolution,
    index_map: &IndexMap,
    colors: &mut [Rgb],
) -> Result<(), SensorError> {
    frame.check_layout()?;

    if index_map.len() != colors.len() {
        return Err(SensorError::InvalidLayout(format!(
            "index map has {} entries for {} color slots",
            index_map.len(),
            colors.len()
        )));
    }

    for (color, &coords) in colors.iter_mut().zip(index_map.entries()) {
        *color = sample_pixel(frame, bounds, coords);
    }

    Ok(())
}

fn sample_pixel(frame: &ColorFrame, bounds: Resolution, coords: [i32; 2]) -> Rgb {
    if !in_color_bounds(coords, bounds.width, bounds.height) {
        return Rgb::BLACK;
    }

    let [x, y] = coords;
    frame
        .bgr_at(x as u32, y as u32)
        .map(Rgb::from_bgr)
        .unwrap_or(Rgb::BLACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_2x2() -> ColorFrame {
        ColorFrame::from_rgb(
            2,
            2,
            &[[255, 0, 0], [0, 255, 0], [0, 0, 255], [51, 102, 153]],
        )
    }

    #[test]
    fn test_bounds_check_is_inclusive_at_upper_edge() {
        assert!(in_color_bounds([0, 0], 640, 480));
        assert!(in_color_bounds([640, 480], 640, 480));
        assert!(!in_color_bounds([641, 0], 640, 480));
        assert!(!in_color_bounds([0, 481], 640, 480));
        assert!(!in_color_bounds([-1, 0], 640, 480));
        assert!(!in_color_bounds([0, -1], 640, 480));
    }

    #[test]
    fn test_samples_reverse_channel_order() {
        let frame = frame_2x2();
        let index_map = IndexMap::from(vec![[0, 0], [1, 0], [0, 1], [1, 1]]);
        let mut colors = vec![Rgb::BLACK; 4];

        sample_color_frame(&frame, frame.resolution(), &index_map, &mut colors).unwrap();

        assert_eq!(colors[0], Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(colors[1], Rgb::new(0.0, 1.0, 0.0));
        assert_eq!(colors[2], Rgb::new(0.0, 0.0, 1.0));
        assert_eq!(colors[3], Rgb::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn test_out_of_range_entries_are_black() {
        let frame = frame_2x2();
        let index_map = IndexMap::from(vec![[-1, -1], [3, 0], [0, 3], [-5, 1]]);
        let mut colors = vec![Rgb::new(0.5, 0.5, 0.5); 4];

        sample_color_frame(&frame, frame.resolution(), &index_map, &mut colors).unwrap();

        assert!(colors.iter().all(|c| *c == Rgb::BLACK));
    }

    #[test]
    fn test_edge_column_reads_next_row() {
        // x == width addresses the first pixel of the following row
        let frame = frame_2x2();
        let index_map = IndexMap::from(vec![[2, 0]]);
        let mut colors = vec![Rgb::BLACK; 1];

        sample_color_frame(&frame, frame.resolution(), &index_map, &mut colors).unwrap();
        assert_eq!(colors[0], Rgb::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_edge_row_past_data_is_black() {
        let frame = frame_2x2();
        let index_map = IndexMap::from(vec![[0, 2], [2, 2]]);
        let mut colors = vec![Rgb::new(1.0, 1.0, 1.0); 2];

        sample_color_frame(&frame, frame.resolution(), &index_map, &mut colors).unwrap();
        assert_eq!(colors, vec![Rgb::BLACK, Rgb::BLACK]);
    }

    #[test]
    fn test_length_mismatch_leaves_colors_untouched() {
        let frame = frame_2x2();
        let index_map = IndexMap::new(3);
        let mut colors = vec![Rgb::new(0.1, 0.2, 0.3); 4];

        let result = sample_color_frame(&frame, frame.resolution(), &index_map, &mut colors);

        assert!(matches!(result, Err(SensorError::InvalidLayout(_))));
        assert!(colors.iter().all(|c| *c == Rgb::new(0.1, 0.2, 0.3)));
    }

    #[test]
    fn test_bounds_follow_depth_resolution() {
        // 4x4 color raster sampled for a 2x2 depth raster
        let frame = ColorFrame::from_rgb(4, 4, &[[255, 255, 255]; 16]);
        let index_map = IndexMap::from(vec![[1, 1], [2, 2], [3, 0], [0, 3]]);
        let mut colors = vec![Rgb::new(0.5, 0.5, 0.5); 4];

        sample_color_frame(&frame, Resolution::new(2, 2), &index_map, &mut colors).unwrap();

        assert_eq!(colors[0], Rgb::new(1.0, 1.0, 1.0));
        assert_eq!(colors[1], Rgb::new(1.0, 1.0, 1.0));
        assert_eq!(colors[2], Rgb::BLACK);
        assert_eq!(colors[3], Rgb::BLACK);
    }
}
