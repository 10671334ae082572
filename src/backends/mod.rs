// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for frame sources
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          Detection / Capture Layer           │
//! └────────────────────┬────────────────────────┘
//!                      │ FrameSource
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────┐    ┌──────────────────┐   │
//! │  │   Camera    │    │  Virtual Camera  │   │
//! │  │   (types)   │    │  (image files)   │   │
//! │  └─────────────┘    └──────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! - [`camera`]: frame types, the `FrameSource` trait and device selection
//! - [`virtual_camera`]: a frame source replaying still images

pub mod camera;
pub mod virtual_camera;
