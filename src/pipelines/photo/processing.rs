// SPDX-License-Identifier: MPL-2.0

//! Post-processing for captured frames
//!
//! Converts a stream frame (RGBA or RGB, possibly with row padding) into a
//! tightly packed RGB image ready for encoding.

use crate::backends::camera::types::{CameraFrame, PixelFormat};
use crate::errors::PhotoError;
use image::RgbImage;
use tracing::debug;

/// Processed image data
pub struct ProcessedImage {
    pub image: RgbImage,
    pub width: u32,
    pub height: u32,
}

/// Post-processor for captured frames
#[derive(Debug, Clone, Copy, Default)]
pub struct PostProcessor;

impl PostProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Process a captured frame on the blocking pool
    pub async fn process(&self, frame: CameraFrame) -> Result<ProcessedImage, PhotoError> {
        tokio::task::spawn_blocking(move || {
            let image = Self::to_rgb(&frame)?;
            debug!(width = frame.width, height = frame.height, "Post-processing complete");
            Ok(ProcessedImage {
                width: frame.width,
                height: frame.height,
                image,
            })
        })
        .await
        .map_err(|e| PhotoError::CaptureFailed(format!("post-processing task error: {}", e)))?
    }

    /// Copy the visible pixels of a frame into an RGB image
    ///
    /// Alpha is dropped and stride padding skipped.
    pub fn to_rgb(frame: &CameraFrame) -> Result<RgbImage, PhotoError> {
        let bpp = frame.format.bytes_per_pixel();
        let row_bytes = frame.width as usize * bpp;
        let stride = frame.stride as usize;

        if stride < row_bytes {
            return Err(PhotoError::CaptureFailed(format!(
                "stride {} smaller than row of {} bytes",
                stride, row_bytes
            )));
        }

        let needed = match frame.height as usize {
            0 => 0,
            h => (h - 1) * stride + row_bytes,
        };
        if frame.data.len() < needed {
            return Err(PhotoError::CaptureFailed(format!(
                "frame data too small: expected {}, got {}",
                needed,
                frame.data.len()
            )));
        }

        let mut rgb = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
        for y in 0..frame.height as usize {
            let row = &frame.data[y * stride..y * stride + row_bytes];
            match frame.format {
                PixelFormat::RGB24 => rgb.extend_from_slice(row),
                PixelFormat::RGBA => {
                    rgb.extend(row.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]));
                }
            }
        }

        RgbImage::from_raw(frame.width, frame.height, rgb).ok_or_else(|| {
            PhotoError::CaptureFailed("failed to create RGB image from frame data".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_rgba_drops_alpha_and_padding() {
        let data: Vec<u8> = vec![
            255, 0, 0, 255, 0, 255, 0, 128, 9, 9, // row 0 + padding
            0, 0, 255, 0, 10, 20, 30, 255, 9, 9, // row 1 + padding
        ];
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: data.into(),
            format: PixelFormat::RGBA,
            stride: 10,
            captured_at: Instant::now(),
        };

        let image = PostProcessor::to_rgb(&frame).unwrap();
        assert_eq!(
            image.as_raw(),
            &vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30]
        );
    }

    #[test]
    fn test_rgb_passthrough() {
        let frame = CameraFrame::from_rgb(2, 1, vec![1, 2, 3, 4, 5, 6]);
        let image = PostProcessor::to_rgb(&frame).unwrap();
        assert_eq!(image.get_pixel(1, 0).0, [4, 5, 6]);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let frame = CameraFrame::from_rgba(4, 4, vec![0u8; 10]);
        assert!(matches!(
            PostProcessor::to_rgb(&frame),
            Err(PhotoError::CaptureFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_process_on_blocking_pool() {
        let frame = CameraFrame::from_rgba(3, 2, vec![7u8; 24]);
        let processed = PostProcessor::new().process(frame).await.unwrap();
        assert_eq!((processed.width, processed.height), (3, 2));
        assert_eq!(processed.image.get_pixel(2, 1).0, [7, 7, 7]);
    }
}
