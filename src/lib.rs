// SPDX-License-Identifier: MPL-2.0

//! Light Capture - capture a still whenever a bright light shows up
//!
//! Watches a live frame source, scores the brightness of a coarse pixel
//! grid on every detection tick and, when a light brighter than the
//! sensitivity threshold (optionally of a given color) appears, runs a
//! capture sequence: flashlight on, exposure settle, snapshot, flashlight
//! off, cooldown.
//!
//! # Architecture
//!
//! - [`app`]: detection (sampler, classifier) and the capture sequencer
//! - [`backends`]: frame source abstraction and the file-backed source
//! - [`flash`]: flashlight control and sysfs flash LEDs
//! - [`pipelines`]: snapshot → RGB → JPEG
//! - [`storage`]: saving captures to disk
//! - [`config`]: persisted tunables
//! - [`notifications`]: user-facing notices
//!
//! # Example
//!
//! ```ignore
//! // light-capture watch ~/scenes/led-blink --loop
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flash;
pub mod notifications;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use app::frame_processor::{DetectionSettings, LightClassifier, SampleResult, TargetColor};
pub use app::{CaptureSequencer, CaptureSession};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use notifications::{Notice, Notifier};
