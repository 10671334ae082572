// SPDX-License-Identifier: MPL-2.0

//! Frame processor module for light detection
//!
//! Frames are sampled on a coarse grid and the brightest qualifying sample
//! is compared against a sensitivity-derived threshold. Analysis is pure:
//! nothing here holds state between frames.

pub mod tasks;
pub mod types;

pub use tasks::{FrameSampler, LightClassifier, luminance};
pub use types::{
    BrightestSample, DetectionSettings, PixelPoint, SampleResult, Sensitivity, TargetColor,
};
