// SPDX-License-Identifier: GPL-3.0-only

//! Light detection and capture sequencing
//!
//! - [`frame_processor`]: grid sampling and light classification
//! - [`tick`]: the refresh-driven detection tick and its interval gate
//! - [`session`]: the state observers see
//! - [`sequencer`]: the capture state machine tying it all together

pub mod frame_processor;
pub mod sequencer;
pub mod session;
pub mod tick;

pub use sequencer::{CaptureSequencer, SequencerState, SequencerTiming, TickOutcome};
pub use session::CaptureSession;
pub use tick::{DetectionGate, TickSource, refresh_ticks};
