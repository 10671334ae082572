// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! The light capture pipeline consumes frames through [`FrameSource`] and
//! never opens devices itself. This module holds the shared frame types and
//! the camera selection policy used by front ends that do enumerate devices.

pub mod types;

pub use types::*;

use crate::constants::camera::BACK_CAMERA_HINTS;

/// Represents a camera device as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Human-readable label, may be empty before permission is granted
    pub name: String,
    /// Platform device identifier
    pub path: String,
}

/// Pick the camera to open by default
///
/// Prefers a back-facing camera (the one that usually has a flashlight),
/// recognised by its label, and falls back to the first device.
pub fn select_preferred_camera(cameras: &[CameraDevice]) -> Option<&CameraDevice> {
    cameras
        .iter()
        .find(|camera| {
            let name = camera.name.to_lowercase();
            BACK_CAMERA_HINTS.iter().any(|hint| name.contains(hint))
        })
        .or_else(|| cameras.first())
}
