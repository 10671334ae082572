// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for still capture
//!
//! Heavy work (pixel conversion, JPEG encoding) runs on tokio's blocking
//! pool so the detection loop keeps its cadence while a capture is encoded.
//!
//! - [`photo`]: snapshot, conversion, JPEG encoding and the sink hand-off

pub mod photo;
