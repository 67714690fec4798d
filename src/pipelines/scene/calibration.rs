// SPDX-License-Identifier: GPL-3.0-only

//! Sensor calibration transform
//!
//! A fixed rigid transform (rotation + translation) from sensor camera
//! space into the scene. It is supplied from outside, either as the rig
//! preset or as 16 row-major values, and is never estimated here.

use crate::constants::CALIBRATION_PRESET;
use crate::errors::CalibrationError;
use crate::pipelines::capture::Point3D;
use glam::{Mat3, Mat4, Vec4};

/// Tolerance for the orthonormality and affine-row checks
const RIGID_TOLERANCE: f32 = 1e-4;

/// 4x4 homogeneous rigid transform applied to exported points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationMatrix {
    matrix: Mat4,
}

impl CalibrationMatrix {
    pub const IDENTITY: CalibrationMatrix = CalibrationMatrix {
        matrix: Mat4::IDENTITY,
    };

    /// The measured pose of the capture rig's sensor
    pub fn sensor_preset() -> Self {
        Self {
            matrix: Mat4::from_cols_array(&CALIBRATION_PRESET).transpose(),
        }
    }

    /// Build from 16 row-major values
    ///
    /// The upper-left 3x3 block must be a proper rotation and the last row
    /// must be `0 0 0 1`.
    pub fn from_row_major(values: &[f32]) -> Result<Self, CalibrationError> {
        let values: &[f32; 16] = values
            .try_into()
            .map_err(|_| CalibrationError::WrongLength(values.len()))?;

        if values.iter().any(|v| !v.is_finite()) {
            return Err(CalibrationError::NonFinite);
        }

        let matrix = Mat4::from_cols_array(values).transpose();
        check_rigid(&matrix)?;
        Ok(Self { matrix })
    }

    /// The 16 values in row-major order
    pub fn to_row_major(&self) -> [f32; 16] {
        self.matrix.transpose().to_cols_array()
    }

    /// `M · [x, y, z, 1]`, keeping xyz
    pub fn apply_to_point(&self, point: Point3D) -> Point3D {
        let v = self.matrix * Vec4::new(point.x, point.y, point.z, 1.0);
        Point3D::new(v.x, v.y, v.z)
    }

    /// Transform every point, preserving order
    pub fn apply_to_points(&self, points: &[Point3D]) -> Vec<Point3D> {
        points.iter().map(|&p| self.apply_to_point(p)).collect()
    }

    /// Inverse rigid transform: rotation transposed, translation negated
    pub fn inverse(&self) -> Self {
        let rotation = Mat3::from_mat4(self.matrix).transpose();
        let translation = -(rotation * self.matrix.w_axis.truncate());
        let mut matrix = Mat4::from_mat3(rotation);
        matrix.w_axis = translation.extend(1.0);
        Self { matrix }
    }

    /// Column-major matrix for a renderer placing the sensor's point cloud
    pub fn scene_matrix(&self) -> [f32; 16] {
        self.matrix.to_cols_array()
    }

    /// Transform for the sensor marker drawn in the scene
    ///
    /// The marker model points down +Z; it is turned half a revolution about
    /// Y so it faces along the sensor's viewing direction.
    pub fn marker_transform(&self) -> Mat4 {
        self.matrix * Mat4::from_rotation_y(std::f32::consts::PI)
    }
}

impl Default for CalibrationMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn check_rigid(matrix: &Mat4) -> Result<(), CalibrationError> {
    let last_row = matrix.row(3);
    if !last_row.abs_diff_eq(Vec4::W, RIGID_TOLERANCE) {
        return Err(CalibrationError::NotRigid(format!(
            "last row is {:?}, expected [0, 0, 0, 1]",
            last_row.to_array()
        )));
    }

    let rotation = Mat3::from_mat4(*matrix);
    if !(rotation * rotation.transpose()).abs_diff_eq(Mat3::IDENTITY, RIGID_TOLERANCE) {
        return Err(CalibrationError::NotRigid(
            "rotation block is not orthonormal".to_string(),
        ));
    }

    let det = rotation.determinant();
    if (det - 1.0).abs() > RIGID_TOLERANCE {
        return Err(CalibrationError::NotRigid(format!(
            "rotation determinant is {}, expected 1",
            det
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point3D, b: Point3D) {
        let d = (a.x - b.x).abs().max((a.y - b.y).abs()).max((a.z - b.z).abs());
        assert!(d < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_identity_leaves_points_unchanged() {
        let m = CalibrationMatrix::IDENTITY;
        for p in [
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.5, -2.25, 3.0),
            Point3D::new(-0.001, 1e4, 0.5),
        ] {
            assert_eq!(m.apply_to_point(p), p);
        }
    }

    #[test]
    fn test_row_major_translation_in_last_column() {
        #[rustfmt::skip]
        let m = CalibrationMatrix::from_row_major(&[
            1.0, 0.0, 0.0, 10.0,
            0.0, 1.0, 0.0, 20.0,
            0.0, 0.0, 1.0, 30.0,
            0.0, 0.0, 0.0, 1.0,
        ])
        .unwrap();
        assert_eq!(
            m.apply_to_point(Point3D::new(1.0, 2.0, 3.0)),
            Point3D::new(11.0, 22.0, 33.0)
        );
        assert_eq!(m.to_row_major()[3], 10.0);
    }

    #[test]
    fn test_preset_applies_rows() {
        let m = CalibrationMatrix::sensor_preset();
        let p = m.apply_to_point(Point3D::new(1.0, 2.0, 3.0));
        assert_close(p, Point3D::new(0.315075, 1.9760999, 3.1431196));
        assert_eq!(m.to_row_major(), CALIBRATION_PRESET);
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = CalibrationMatrix::sensor_preset();
        let inv = m.inverse();
        for p in [
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(0.3, -0.2, 1.7),
            Point3D::new(-1.0, 2.0, 4.0),
        ] {
            assert_close(inv.apply_to_point(m.apply_to_point(p)), p);
        }
    }

    #[test]
    fn test_inverse_of_rotation_about_z() {
        let angle = std::f32::consts::FRAC_PI_2;
        #[rustfmt::skip]
        let m = CalibrationMatrix::from_row_major(&[
            angle.cos(), -angle.sin(), 0.0, 1.0,
            angle.sin(), angle.cos(), 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
        .unwrap();
        let p = Point3D::new(1.0, 0.0, 0.0);
        assert_close(m.apply_to_point(p), Point3D::new(1.0, 1.0, 0.0));
        assert_close(m.inverse().apply_to_point(Point3D::new(1.0, 1.0, 0.0)), p);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(
            CalibrationMatrix::from_row_major(&[1.0; 12]),
            Err(CalibrationError::WrongLength(12))
        );
    }

    #[test]
    fn test_rejects_scaling() {
        #[rustfmt::skip]
        let result = CalibrationMatrix::from_row_major(&[
            2.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]);
        assert!(matches!(result, Err(CalibrationError::NotRigid(_))));
    }

    #[test]
    fn test_rejects_reflection_and_projective_row() {
        #[rustfmt::skip]
        let reflection = CalibrationMatrix::from_row_major(&[
            -1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]);
        assert!(matches!(reflection, Err(CalibrationError::NotRigid(_))));

        let mut projective = Mat4::IDENTITY.to_cols_array();
        // Row-major index 12 is the first element of the last row
        projective[12] = 0.5;
        assert!(matches!(
            CalibrationMatrix::from_row_major(&projective),
            Err(CalibrationError::NotRigid(_))
        ));
    }

    #[test]
    fn test_rejects_nan() {
        let mut values = Mat4::IDENTITY.to_cols_array();
        values[5] = f32::NAN;
        assert_eq!(
            CalibrationMatrix::from_row_major(&values),
            Err(CalibrationError::NonFinite)
        );
    }

    #[test]
    fn test_scene_matrix_is_column_major() {
        let m = CalibrationMatrix::sensor_preset();
        let cols = m.scene_matrix();
        // Translation occupies the last column, elements 12..15 column-major
        assert_eq!(&cols[12..15], &[-0.444162, 0.0235913, 0.042913]);
    }

    #[test]
    fn test_marker_faces_along_view_direction() {
        let marker = CalibrationMatrix::IDENTITY.marker_transform();
        let forward = marker.transform_vector3(glam::Vec3::Z);
        assert!((forward - glam::Vec3::NEG_Z).length() < 1e-6);
    }
}
