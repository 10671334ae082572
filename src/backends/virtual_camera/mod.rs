// SPDX-License-Identifier: GPL-3.0-only

//! File-backed stand-in for a live camera
//!
//! Replays still images as if they were a video stream, so the detection
//! pipeline can run without camera hardware (demos, tests, recorded scenes).

mod file_source;

pub use file_source::{
    FileFrameSource, collect_image_paths, enumerate_virtual_cameras, load_image_as_frame,
};
