// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing tasks
//!
//! Grid sampling of frame brightness and the light classifier built on it.

pub mod brightness_sampler;
pub mod light_classifier;

pub use brightness_sampler::{FrameSampler, luminance};
pub use light_classifier::LightClassifier;
