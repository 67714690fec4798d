// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for depth sensors
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Capture Session               │
//! └────────────────────┬────────────────────────┘
//!                      │ FrameSource (depth, color)
//! ┌────────────────────┴────────────────────────┐
//! │                Backend Layer                │
//! │  ┌─────────────┐    ┌──────────────────┐    │
//! │  │   Replay    │    │    Synthetic     │    │
//! │  │ (PNG pair)  │    │  (tilted plane)  │    │
//! │  └─────────────┘    └──────────────────┘    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`sensor`]: Stream handle trait and raw frame types
//! - [`kinect`]: Projection model from depth pixels to camera and color space
//! - [`replay`]: Replay and synthetic sensors

pub mod kinect;
pub mod replay;
pub mod sensor;
