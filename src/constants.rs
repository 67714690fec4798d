// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Depth sensor raster width (pixels)
pub const DEPTH_WIDTH: u32 = 640;
/// Depth sensor raster height (pixels)
pub const DEPTH_HEIGHT: u32 = 480;
/// Color sensor raster width (pixels)
pub const COLOR_WIDTH: u32 = 640;
/// Color sensor raster height (pixels)
pub const COLOR_HEIGHT: u32 = 480;

/// Bytes per color pixel (B, G, R, padding)
pub const COLOR_BYTES_PER_PIXEL: usize = 4;
/// Bytes per packed depth sample
pub const DEPTH_BYTES_PER_SAMPLE: usize = 2;

/// Capture refresh timing
pub mod timing {
    /// Run the full-frame refresh once every this many ticks
    pub const DEFAULT_REFRESH_PERIOD: u32 = 30;
    /// Host loop rate used by the CLI when ticking the session
    pub const DEFAULT_TICK_RATE_HZ: u32 = 30;
}

/// Packed depth sample layout
///
/// The device packs a 3-bit player index into the low bits of every depth
/// sample; the remaining 13 bits are the range in millimetres. The
/// projection functions take the range shifted back into that packed
/// position.
pub mod depth {
    /// Number of low bits holding the player index
    pub const PLAYER_INDEX_BITS: u32 = 3;
    /// Mask for the player index bits
    pub const PLAYER_INDEX_MASK: u16 = (1 << PLAYER_INDEX_BITS) - 1;
    /// Largest range the packed format can express
    pub const DEPTH_MAX_MM: u16 = u16::MAX >> PLAYER_INDEX_BITS;
}

/// Nominal projection parameters of the depth and color sensors
pub mod projection {
    /// Inverse depth focal length (1/pixels) at the 320x240 reference raster
    pub const DEPTH_INVERSE_FOCAL_LENGTH_320X240: f32 = 3.501e-3;
    /// Reference raster the inverse focal length is quoted for
    pub const DEPTH_REFERENCE_WIDTH: f32 = 320.0;
    pub const DEPTH_REFERENCE_HEIGHT: f32 = 240.0;
    /// Color focal length (pixels) at 640x480
    pub const COLOR_FOCAL_LENGTH_640X480: f32 = 531.15;
    pub const COLOR_REFERENCE_WIDTH: f32 = 640.0;
    /// Horizontal offset of the color sensor from the depth sensor (metres)
    pub const DEPTH_TO_COLOR_BASELINE_M: f32 = 0.025;
    /// Index map entry for pixels without a color correspondence
    pub const NO_CORRESPONDENCE: [i32; 2] = [-1, -1];
}

/// Fixed sensor pose measured for the capture rig
///
/// Row-major 4x4: rotation in the upper-left 3x3, translation (metres) in
/// the last column.
pub const CALIBRATION_PRESET: [f32; 16] = [
    0.990921, 0.0626205, -0.118975, -0.444162, //
    -0.0623196, 0.998037, 0.00625139, 0.0235913, //
    0.119133, 0.0012198, 0.992878, 0.042913, //
    0.0, 0.0, 0.0, 1.0,
];

/// File names used by replay sources and exports
pub mod files {
    /// 16-bit grayscale image of range values in millimetres
    pub const REPLAY_DEPTH: &str = "depth.png";
    /// 8-bit RGB(A) color image
    pub const REPLAY_COLOR: &str = "color.png";
    /// Directory name under the user config dir
    pub const CONFIG_DIR: &str = "depth-capture";
    pub const CONFIG_FILE: &str = "config.json";
    /// Extension appended to an export while it is being written
    pub const EXPORT_TEMP_SUFFIX: &str = ".partial";
    pub const EXPORT_EXTENSION: &str = "ply";
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
