// SPDX-License-Identifier: MPL-2.0

//! Photo capture from the live frame source
//!
//! Grabs exactly one frame without interrupting the stream.

use crate::backends::camera::types::{CameraFrame, FrameSource};
use crate::errors::PhotoError;
use tracing::debug;

/// Photo capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Take a single frame snapshot from the source
    ///
    /// The frame shares its pixel buffer with the stream, so this is cheap.
    /// A frame without pixels means there is nothing to draw from and maps
    /// to [`PhotoError::SurfaceUnavailable`].
    pub fn snapshot<S: FrameSource + ?Sized>(source: &mut S) -> Result<CameraFrame, PhotoError> {
        let frame = source.latest_frame().ok_or(PhotoError::NoFrameAvailable)?;

        if frame.is_empty() {
            return Err(PhotoError::SurfaceUnavailable(format!(
                "frame has no pixels ({}x{})",
                frame.width, frame.height
            )));
        }

        debug!(
            width = frame.width,
            height = frame.height,
            format = %frame.format,
            "Frame snapshot taken"
        );

        Ok(frame)
    }
}
