// SPDX-License-Identifier: MPL-2.0

//! Async photo capture pipeline
//!
//! ```text
//! Frame Source → Snapshot → Post-Processing → Encoding → CaptureSink
//!       ↓
//! Stream continues uninterrupted
//! ```
//!
//! 1. **Snapshot**: grab exactly one frame (shared buffer, no copy)
//! 2. **Post-Processing**: RGBA/RGB with padding → packed RGB (blocking pool)
//! 3. **Encoding**: JPEG at quality 95 (blocking pool)
//! 4. **Hand-off**: the sink is told about the image, then persists it

pub mod capture;
pub mod encoding;
pub mod processing;

pub use capture::PhotoCapture;
pub use encoding::{CapturedImage, PhotoEncoder};
pub use processing::{PostProcessor, ProcessedImage};

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::path::PathBuf;

/// Receiver of captured stills
///
/// Naming and saving are the sink's business; the pipeline only supplies a
/// sequence number and timestamp through [`CapturedImage`].
pub trait CaptureSink: Send {
    /// Called once per successful capture, before it is persisted
    fn image_captured(&mut self, image: &CapturedImage);

    /// Take ownership of the image and store it
    fn persist(
        &mut self,
        image: CapturedImage,
    ) -> impl Future<Output = Result<PathBuf, PhotoError>> + Send;
}

/// Frame → JPEG workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoPipeline {
    post_processor: PostProcessor,
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    /// Pipeline with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with a custom JPEG quality
    pub fn with_quality(quality: u8) -> Self {
        let mut encoder = PhotoEncoder::new();
        encoder.set_quality(quality);
        Self {
            post_processor: PostProcessor::new(),
            encoder,
        }
    }

    pub fn quality(&self) -> u8 {
        self.encoder.quality()
    }

    /// Post-process and encode one snapshot
    pub async fn encode_frame(
        &self,
        frame: CameraFrame,
        sequence: u64,
        captured_at: DateTime<Utc>,
    ) -> Result<CapturedImage, PhotoError> {
        let processed = self.post_processor.process(frame).await?;
        self.encoder.encode(processed, sequence, captured_at).await
    }
}
