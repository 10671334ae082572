// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding
//!
//! Encodes processed images as JPEG on the blocking pool and wraps the
//! result with the capture metadata storage needs to name the file.

use super::processing::ProcessedImage;
use crate::constants::capture::{FILE_EXTENSION, FILE_PREFIX, JPEG_QUALITY};
use crate::errors::PhotoError;
use chrono::{DateTime, Utc};
use image::RgbImage;
use tracing::{debug, info};

/// An encoded still, ready to hand over to storage
#[derive(Clone)]
pub struct CapturedImage {
    /// JPEG bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 1-based capture number within the session
    pub sequence: u64,
    /// Wall-clock time of the snapshot
    pub captured_at: DateTime<Utc>,
}

impl CapturedImage {
    /// Unique file name: `capture-{sequence}-{timestamp}.jpg`
    ///
    /// The timestamp is the ISO-8601 UTC capture time with `:` and `.`
    /// replaced by `-`, e.g. `capture-3-2024-05-01T12-30-05-123Z.jpg`.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}.{}",
            FILE_PREFIX,
            self.sequence,
            self.captured_at.format("%Y-%m-%dT%H-%M-%S-%3fZ"),
            FILE_EXTENSION
        )
    }
}

impl std::fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedImage")
            .field("bytes", &self.data.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

/// JPEG encoder
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: u8,
}

impl PhotoEncoder {
    /// Encoder at the default quality (95)
    pub fn new() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }

    /// Set JPEG quality, clamped to 1-100
    pub fn set_quality(&mut self, quality: u8) {
        self.quality = quality.clamp(1, 100);
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a processed image asynchronously
    pub async fn encode(
        &self,
        processed: ProcessedImage,
        sequence: u64,
        captured_at: DateTime<Utc>,
    ) -> Result<CapturedImage, PhotoError> {
        info!(
            width = processed.width,
            height = processed.height,
            quality = self.quality,
            sequence,
            "Starting encoding"
        );

        let quality = self.quality;

        // CPU-bound
        tokio::task::spawn_blocking(move || {
            let data = Self::encode_jpeg(&processed.image, quality)?;

            debug!(size = data.len(), "Encoding complete");

            Ok(CapturedImage {
                data,
                width: processed.width,
                height: processed.height,
                sequence,
                captured_at,
            })
        })
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("encoding task error: {}", e)))?
    }

    /// Encode image as JPEG
    fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, PhotoError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| PhotoError::EncodingFailed(format!("JPEG encoding failed: {}", e)))?;

        Ok(buffer)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_format() {
        let captured_at = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 30, 5)
            .unwrap()
            + chrono::Duration::milliseconds(123);
        let image = CapturedImage {
            data: Vec::new(),
            width: 1,
            height: 1,
            sequence: 3,
            captured_at,
        };
        assert_eq!(image.file_name(), "capture-3-2024-05-01T12-30-05-123Z.jpg");
    }

    #[test]
    fn test_quality_clamped() {
        let mut encoder = PhotoEncoder::new();
        assert_eq!(encoder.quality(), 95);
        encoder.set_quality(0);
        assert_eq!(encoder.quality(), 1);
        encoder.set_quality(200);
        assert_eq!(encoder.quality(), 100);
    }

    #[tokio::test]
    async fn test_encode_produces_jpeg() {
        let processed = ProcessedImage {
            image: RgbImage::from_pixel(8, 8, image::Rgb([200, 10, 10])),
            width: 8,
            height: 8,
        };
        let captured = PhotoEncoder::new()
            .encode(processed, 1, Utc::now())
            .await
            .unwrap();

        // SOI marker
        assert_eq!(&captured.data[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&captured.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }
}
