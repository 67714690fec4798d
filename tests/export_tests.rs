// SPDX-License-Identifier: MPL-2.0

//! Integration tests for PLY export and calibration

use depth_capture::backends::kinect::NominalProjection;
use depth_capture::backends::replay::SyntheticSensor;
use depth_capture::backends::sensor::{
    ColorFrame, DepthFrame, DepthSensor, FrameQueue, Resolution, SensorStreams,
};
use depth_capture::errors::ExportError;
use depth_capture::pipelines::capture::{
    CaptureScheduler, CaptureSession, MissReason, Point3D, RefreshStatus, Stream,
};
use depth_capture::pipelines::scene::{CalibrationMatrix, export_point_cloud_ply};

const HEADER: &str = "ply\n\
format ascii 1.0\n\
element vertex {N}\n\
property float x\n\
property float y\n\
property float z\n\
element face 0\n\
property list uchar int vertex_index\n\
end_header\n";

fn header(n: usize) -> String {
    HEADER.replace("{N}", &n.to_string())
}

#[test]
fn test_empty_cloud_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.ply");

    let summary = export_point_cloud_ply(&[], &CalibrationMatrix::IDENTITY, &path).unwrap();
    assert_eq!(summary.vertex_count, 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), header(0));
}

#[test]
fn test_unit_points_under_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("axes.ply");
    let points = [
        Point3D::new(1.0, 0.0, 0.0),
        Point3D::new(0.0, 1.0, 0.0),
        Point3D::new(0.0, 0.0, 1.0),
    ];

    export_point_cloud_ply(&points, &CalibrationMatrix::IDENTITY, &path).unwrap();

    let expected = format!("{}1 0 0\n0 1 0\n0 0 1\n", header(3));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn test_export_applies_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shifted.ply");
    #[rustfmt::skip]
    let shift = CalibrationMatrix::from_row_major(&[
        1.0, 0.0, 0.0, 2.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, -1.0,
        0.0, 0.0, 0.0, 1.0,
    ])
    .unwrap();

    export_point_cloud_ply(&[Point3D::new(1.0, 1.0, 1.0)], &shift, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().last(), Some("3 1 0"));
}

#[test]
fn test_preset_round_trips_through_inverse() {
    let preset = CalibrationMatrix::sensor_preset();
    let p = Point3D::new(0.3, -1.2, 2.5);
    let back = preset.inverse().apply_to_point(preset.apply_to_point(p));

    assert!((back.x - p.x).abs() < 1e-4);
    assert!((back.y - p.y).abs() < 1e-4);
    assert!((back.z - p.z).abs() < 1e-4);
}

#[test]
fn test_identity_leaves_points_unchanged() {
    let points = [Point3D::new(0.5, -0.25, 3.0), Point3D::new(-7.0, 2.0, 0.0)];
    assert_eq!(CalibrationMatrix::IDENTITY.apply_to_points(&points), points.to_vec());
}

#[test]
fn test_missing_directory_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("cloud.ply");

    let result = export_point_cloud_ply(&[], &CalibrationMatrix::IDENTITY, &path);
    assert!(matches!(result, Err(ExportError::Open { .. })));
    assert!(!path.exists());
}

#[test]
fn test_snapshot_of_synthetic_scene() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.ply");
    let res = Resolution::new(32, 24);

    let streams = SyntheticSensor::new(res, res).open_streams().unwrap();
    let projection = NominalProjection::new(res, res, Default::default());
    let mut session = CaptureSession::new(streams, projection, CaptureScheduler::default())
        .with_calibration(CalibrationMatrix::sensor_preset());

    let snapshot = session.snapshot(&path).unwrap();
    assert!(snapshot.refresh.is_refreshed());
    assert_eq!(snapshot.export.vertex_count, 32 * 24);
    assert_eq!(snapshot.export.path, path);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(&header(32 * 24)));
    assert_eq!(text.lines().count(), 9 + 32 * 24);
}

#[test]
fn test_snapshot_after_miss_exports_last_good_frame() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.ply");
    let second = dir.path().join("second.ply");
    let res = Resolution::new(3, 2);

    let mut depth = FrameQueue::new();
    depth
        .push_frame(DepthFrame::from_millimetres(3, 2, &[900, 1000, 1100, 1200, 1300, 1400]))
        .push_miss();
    let mut session = CaptureSession::new(
        SensorStreams {
            depth,
            color: FrameQueue::repeating(ColorFrame::from_rgb(3, 2, &[[10, 20, 30]; 6])),
            depth_resolution: res,
            color_resolution: res,
        },
        NominalProjection::new(res, res, Default::default()),
        CaptureScheduler::default(),
    );

    let snapshot = session.snapshot(&first).unwrap();
    assert!(snapshot.refresh.is_refreshed());

    let snapshot = session.snapshot(&second).unwrap();
    assert_eq!(
        snapshot.refresh,
        RefreshStatus::Missed {
            stream: Stream::Depth,
            reason: MissReason::NoFrame
        }
    );
    assert_eq!(snapshot.export.vertex_count, 6);
    assert_eq!(
        std::fs::read_to_string(&second).unwrap(),
        std::fs::read_to_string(&first).unwrap()
    );
}
