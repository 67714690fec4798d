// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for depth capture and export
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Depth Frame  │ ──▶ │ Capture Pipeline  │ ──▶ │ Points       │
//! │ Color Frame  │     │  - Unprojection   │     │ Colors       │
//! │              │     │  - Color sampling │     │ (renderer)   │
//! └──────────────┘     └───────────────────┘     └──────┬───────┘
//!                                                       │
//!                      ┌───────────────────┐     ┌──────▼───────┐
//!                      │  Scene Pipeline   │ ◀── │ Calibration  │
//!                      │  - PLY export     │     │              │
//!                      └───────────────────┘     └──────────────┘
//! ```
//!
//! Everything runs on the thread that drives the host loop; a refresh is a
//! single synchronous call gated by the capture scheduler.

pub mod capture;
pub mod scene;
