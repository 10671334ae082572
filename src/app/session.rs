// SPDX-License-Identifier: GPL-3.0-only

//! Capture session state
//!
//! Owned and mutated by the sequencer only. Observers (a UI, the CLI)
//! receive snapshots through a `tokio::sync::watch` channel.

use crate::app::frame_processor::{PixelPoint, SampleResult};
use crate::constants::detection::DOT_HISTORY_LEN;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSession {
    /// Detection ticks are acted on
    pub is_active: bool,
    /// A capture sequence is in flight
    pub is_processing: bool,
    /// The flashlight is on
    pub flashlight_on: bool,
    /// Successful captures so far; never reset
    pub capture_count: u64,
    /// Trailing history of brightest points, oldest first
    pub recent_points: VecDeque<PixelPoint>,
    /// Brightest point of the last frame, if that frame was a detection
    pub highlighted: Option<PixelPoint>,
    /// Result of the last analysed frame
    pub last_result: Option<SampleResult>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self {
            is_active: true,
            is_processing: false,
            flashlight_on: false,
            capture_count: 0,
            recent_points: VecDeque::with_capacity(DOT_HISTORY_LEN),
            highlighted: None,
            last_result: None,
        }
    }
}

impl CaptureSession {
    /// Record an analysed frame
    pub fn record(&mut self, result: SampleResult) {
        if let Some(point) = result.brightest_point {
            if self.recent_points.len() == DOT_HISTORY_LEN {
                self.recent_points.pop_front();
            }
            self.recent_points.push_back(point);
        }
        self.highlighted = result.brightest_point.filter(|_| result.detected);
        self.last_result = Some(result);
    }

    /// Suspend detection for a capture
    pub fn begin_processing(&mut self) {
        self.is_processing = true;
        self.is_active = false;
    }

    /// Re-arm detection
    pub fn finish_processing(&mut self) {
        self.is_processing = false;
        self.is_active = true;
    }

    /// Number the next capture will carry
    pub fn next_sequence(&self) -> u64 {
        self.capture_count + 1
    }
}
