// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for depth capture
//!
//! This module provides command-line functionality for:
//! - Running the capture loop against a sensor
//! - Saving a single snapshot as PLY
//! - Showing the effective configuration

use depth_capture::Config;
use depth_capture::errors::{AppError, AppResult, ConfigError};
use depth_capture::backends::kinect::NominalProjection;
use depth_capture::backends::replay::{ReplaySensor, SyntheticSensor};
use depth_capture::backends::sensor::{ColorFrame, DepthFrame, DepthSensor, FrameQueue};
use depth_capture::pipelines::capture::{CaptureSession, RefreshStatus};
use depth_capture::pipelines::scene::timestamped_export_path;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::info;

type Session = CaptureSession<FrameQueue<DepthFrame>, FrameQueue<ColorFrame>, NominalProjection>;

/// Where frames come from
pub enum Source {
    /// Directory holding `depth.png` and `color.png`
    Replay(PathBuf),
    /// Built-in tilted plane
    Synthetic,
}

/// Tick the capture loop, optionally exporting when it ends
pub fn run(
    config: &Config,
    source: Source,
    ticks: Option<u64>,
    export: bool,
    output: Option<PathBuf>,
    preset: bool,
) -> AppResult<()> {
    let mut session = open_session(config, source, preset)?;
    let interval = config.tick_interval();

    match ticks {
        Some(n) => println!("Running {} ticks (press Ctrl+C to stop early)", n),
        None => println!("Running until Ctrl+C"),
    }

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| AppError::from(format!("Failed to install Ctrl+C handler: {}", e)))?;

    let start = Instant::now();
    let mut tick: u64 = 0;
    let mut misses: u64 = 0;

    while ticks.is_none_or(|n| tick < n) {
        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping early...");
            break;
        }

        match session.tick() {
            RefreshStatus::Refreshed => {
                print!("\rRefreshes: {}", session.refresh_count());
                std::io::Write::flush(&mut std::io::stdout())?;
            }
            RefreshStatus::Missed { .. } => misses += 1,
            RefreshStatus::Throttled => {}
        }
        tick += 1;

        std::thread::sleep(interval);
    }
    println!();

    info!(
        ticks = tick,
        refreshes = session.refresh_count(),
        misses,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Capture loop finished"
    );
    println!(
        "{} ticks, {} refreshes, {} missed",
        tick,
        session.refresh_count(),
        misses
    );

    if export || output.is_some() {
        let path = resolve_output(config, output)?;
        let summary = session.export_ply(&path)?;
        println!(
            "Point cloud saved: {} ({} points)",
            summary.path.display(),
            summary.vertex_count
        );
    }

    Ok(())
}

/// Refresh once and export the current view
pub fn snapshot(
    config: &Config,
    source: Source,
    output: Option<PathBuf>,
    preset: bool,
) -> AppResult<()> {
    let mut session = open_session(config, source, preset)?;
    let path = resolve_output(config, output)?;

    println!("Saving view, please hold...");
    let snapshot = session.snapshot(&path)?;
    if let RefreshStatus::Missed { stream, reason } = &snapshot.refresh {
        println!("No fresh {} frame ({:?}), saved the last good one", stream, reason);
    }
    println!(
        "Point cloud saved: {} ({} points)",
        snapshot.export.path.display(),
        snapshot.export.vertex_count
    );

    Ok(())
}

/// Print where the config lives and what is in effect
pub fn show_config(path: Option<&Path>, config: &Config) -> AppResult<()> {
    match path {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not found, using defaults)", path.display()),
        None => println!("Config file: none (no config directory)"),
    }
    println!();
    let text = serde_json::to_string_pretty(config).map_err(ConfigError::from)?;
    println!("{}", text);
    Ok(())
}

fn open_session(
    config: &Config,
    source: Source,
    preset: bool,
) -> AppResult<Session> {
    let mut session = match source {
        Source::Replay(dir) => start_session(ReplaySensor::open(&dir)?, config)?,
        Source::Synthetic => start_session(SyntheticSensor::default(), config)?,
    };
    if preset {
        session.apply_calibration_preset();
    }
    Ok(session)
}

fn start_session<S>(sensor: S, config: &Config) -> AppResult<Session>
where
    S: DepthSensor<Depth = FrameQueue<DepthFrame>, Color = FrameQueue<ColorFrame>>,
{
    println!("Using sensor: {}", sensor.name());

    let streams = sensor.open_streams()?;
    println!(
        "Streams: depth {}, color {}",
        streams.depth_resolution, streams.color_resolution
    );

    let projection = NominalProjection::new(
        streams.depth_resolution,
        streams.color_resolution,
        config.projection,
    );
    let session = CaptureSession::new(streams, projection, config.scheduler()?)
        .with_calibration(config.calibration_matrix()?);
    Ok(session)
}

/// Explicit file, directory to name into, or the configured export directory
fn resolve_output(
    config: &Config,
    output: Option<PathBuf>,
) -> AppResult<PathBuf> {
    let path = match output {
        Some(path) if path.is_dir() => timestamped_export_path(&path),
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => {
            let dir = config.export_dir();
            std::fs::create_dir_all(&dir)?;
            timestamped_export_path(&dir)
        }
    };

    info!(path = %path.display(), "Export target");
    Ok(path)
}
