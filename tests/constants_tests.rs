// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use depth_capture::constants::{self, depth, projection};

#[test]
fn test_default_resolution_is_vga() {
    assert_eq!((constants::DEPTH_WIDTH, constants::DEPTH_HEIGHT), (640, 480));
    assert_eq!((constants::COLOR_WIDTH, constants::COLOR_HEIGHT), (640, 480));
}

#[test]
fn test_player_index_fits_below_range() {
    // Largest range shifted back into position must still fit in 16 bits
    let packed = u32::from(depth::DEPTH_MAX_MM) << depth::PLAYER_INDEX_BITS;
    assert!(packed <= u32::from(u16::MAX));
    assert_eq!(depth::PLAYER_INDEX_MASK, 0b111);
}

#[test]
fn test_projection_constants_positive() {
    assert!(projection::DEPTH_INVERSE_FOCAL_LENGTH_320X240 > 0.0);
    assert!(projection::COLOR_FOCAL_LENGTH_640X480 > 0.0);
    assert_eq!(projection::NO_CORRESPONDENCE, [-1, -1]);
}

#[test]
fn test_version_is_set() {
    assert!(!constants::app_info::version().is_empty());
}
