// SPDX-License-Identifier: GPL-3.0-only

//! Light classification task
//!
//! Turns the brightest sample of a frame into a detection verdict. With a
//! target color only samples whose every channel is within the color
//! tolerance qualify; without one every sample does. The verdict is
//! `brightness > threshold`, strictly.

use crate::app::frame_processor::tasks::brightness_sampler::FrameSampler;
use crate::app::frame_processor::types::{DetectionSettings, SampleResult};
use crate::backends::camera::types::CameraFrame;
use crate::constants::detection::COLOR_TOLERANCE;
use tracing::trace;

/// Stateless light detector
#[derive(Debug, Clone, Copy)]
pub struct LightClassifier {
    sampler: FrameSampler,
    color_tolerance: u8,
}

impl Default for LightClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LightClassifier {
    /// Classifier with the default stride and color tolerance
    pub fn new() -> Self {
        Self {
            sampler: FrameSampler::new(),
            color_tolerance: COLOR_TOLERANCE,
        }
    }

    /// Classifier with custom sampling and tolerance
    pub fn with_params(sampler: FrameSampler, color_tolerance: u8) -> Self {
        Self {
            sampler,
            color_tolerance,
        }
    }

    pub fn color_tolerance(&self) -> u8 {
        self.color_tolerance
    }

    /// Classify one frame
    pub fn classify(&self, frame: &CameraFrame, settings: &DetectionSettings) -> SampleResult {
        let brightest = match settings.target_color {
            Some(target) => {
                let tolerance = self.color_tolerance;
                self.sampler
                    .brightest_where(frame, |rgb| target.matches(rgb, tolerance))
            }
            None => self.sampler.brightest_where(frame, |_| true),
        };

        let Some(brightest) = brightest else {
            trace!(
                width = frame.width,
                height = frame.height,
                target = ?settings.target_color,
                "No qualifying sample"
            );
            return SampleResult::empty();
        };

        let threshold = settings.sensitivity.threshold();
        let detected = brightest.brightness > threshold;

        trace!(
            brightness = brightest.brightness,
            threshold,
            x = brightest.position.x,
            y = brightest.position.y,
            detected,
            "Frame classified"
        );

        SampleResult {
            detected,
            brightest_point: Some(brightest.position),
            brightness: brightest.brightness,
        }
    }
}
