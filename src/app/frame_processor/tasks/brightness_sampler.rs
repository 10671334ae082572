// SPDX-License-Identifier: GPL-3.0-only

//! Brightness sampling task
//!
//! Scans a frame on a coarse grid (every `stride`-th pixel on both axes),
//! computes BT.601 luminance for each sample and keeps the brightest one.
//! Ties go to the first sample in row-major scan order.

use crate::app::frame_processor::types::{BrightestSample, PixelPoint};
use crate::backends::camera::types::CameraFrame;
use crate::constants::detection::{LUMA_WEIGHTS, SAMPLE_STRIDE};

/// Perceived luminance of an RGB triple (0.0-255.0)
pub fn luminance(rgb: [u8; 3]) -> f64 {
    let (wr, wg, wb) = LUMA_WEIGHTS;
    wr * f64::from(rgb[0]) + wg * f64::from(rgb[1]) + wb * f64::from(rgb[2])
}

/// Grid sampler over a frame
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    stride: u32,
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSampler {
    /// Sampler with the default stride of 4
    pub fn new() -> Self {
        Self {
            stride: SAMPLE_STRIDE,
        }
    }

    /// Sampler with a custom stride (0 is treated as 1)
    pub fn with_stride(stride: u32) -> Self {
        Self {
            stride: stride.max(1),
        }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Brightest sample of the whole frame
    ///
    /// A zero-area frame reports brightness 0 at (0, 0).
    pub fn sample(&self, frame: &CameraFrame) -> BrightestSample {
        self.brightest_where(frame, |_| true).unwrap_or_default()
    }

    /// Brightest sample among those accepted by `eligible`
    ///
    /// Returns `None` when no sample is eligible (or the frame is empty).
    pub fn brightest_where<F>(&self, frame: &CameraFrame, eligible: F) -> Option<BrightestSample>
    where
        F: Fn([u8; 3]) -> bool,
    {
        let mut best: Option<BrightestSample> = None;

        for (position, rgb) in self.samples(frame) {
            if !eligible(rgb) {
                continue;
            }
            let brightness = luminance(rgb);
            // Strict comparison keeps the first sample on ties
            if best.is_none_or(|b| brightness > b.brightness) {
                best = Some(BrightestSample {
                    brightness,
                    position,
                });
            }
        }

        best
    }

    /// Sampled positions with their RGB values, in row-major order
    ///
    /// Positions the buffer cannot back (truncated data) are skipped.
    pub fn samples<'a>(
        &self,
        frame: &'a CameraFrame,
    ) -> impl Iterator<Item = (PixelPoint, [u8; 3])> + 'a {
        let stride = self.stride as usize;
        (0..frame.height).step_by(stride).flat_map(move |y| {
            (0..frame.width)
                .step_by(stride)
                .filter_map(move |x| frame.pixel(x, y).map(|rgb| (PixelPoint::new(x, y), rgb)))
        })
    }
}
