// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use std::sync::Arc;
use std::time::Instant;

/// Frame pixel storage
///
/// Cheap to clone: every clone shares the same bytes, so a frame can be
/// analysed and snapshotted without copying the pixel buffer.
#[derive(Clone)]
pub struct FrameData(Arc<[u8]>);

impl FrameData {
    /// Get the length of the frame data in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the frame data is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for FrameData {
    fn from(data: Vec<u8>) -> Self {
        FrameData(Arc::from(data))
    }
}

impl From<&[u8]> for FrameData {
    fn from(data: &[u8]) -> Self {
        FrameData(Arc::from(data))
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameData({} bytes)", self.0.len())
    }
}

impl AsRef<[u8]> for FrameData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// Pixel layout of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    #[default]
    RGBA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
}

impl PixelFormat {
    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::RGB24 => 3,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::RGBA => write!(f, "RGBA"),
            PixelFormat::RGB24 => write!(f, "RGB24"),
        }
    }
}

/// A single frame from the live video
///
/// Exists for one analysis pass or one snapshot; nothing keeps it around.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Packed pixel rows
    pub data: FrameData,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// When the frame was produced
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: impl Into<FrameData>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format: PixelFormat::RGBA,
            stride: width.saturating_mul(4),
            captured_at: Instant::now(),
        }
    }

    /// Build a tightly packed RGB frame
    pub fn from_rgb(width: u32, height: u32, data: impl Into<FrameData>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format: PixelFormat::RGB24,
            stride: width.saturating_mul(3),
            captured_at: Instant::now(),
        }
    }

    /// Whether the frame has no pixels at all
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the RGB channels of the pixel at (x, y)
    ///
    /// Returns `None` when the coordinates are outside the frame or the
    /// buffer is shorter than the dimensions claim.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.stride as usize + x as usize * self.format.bytes_per_pixel();
        let px = self.data.get(idx..idx + 3)?;
        Some([px[0], px[1], px[2]])
    }
}

/// Live video frame source
///
/// Stream lifecycle, device selection and permissions belong to whoever
/// implements this; the pipeline only reads frames and releases the stream
/// on teardown.
pub trait FrameSource: Send {
    /// Current frame, or `None` while the stream has nothing to show yet
    fn latest_frame(&mut self) -> Option<CameraFrame>;

    /// Whether the stream is live
    fn is_active(&self) -> bool;

    /// Stop the stream. Later calls to `latest_frame` return `None`.
    fn release(&mut self);
}
