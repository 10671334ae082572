// SPDX-License-Identifier: GPL-3.0-only

//! Non-blocking user notices
//!
//! The pipeline never shows anything itself. It pushes [`Notice`]s into an
//! unbounded channel and whatever UI sits on the other end renders them as
//! transient, dismissible messages.

use crate::errors::{CameraError, IlluminationError, PhotoError};
use tokio::sync::mpsc;
use tracing::trace;

/// How a notice should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational, neutral styling
    Info,
    /// Something failed, destructive styling
    Error,
}

/// Which situation a notice reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The camera could not be opened
    CameraAccess,
    /// The device has no flashlight
    IlluminationUnsupported,
    /// Turning the flashlight on failed
    IlluminationControl,
    /// Snapshot, encoding or saving failed
    CaptureFailed,
    /// A capture was taken and handed to storage
    ImageCaptured,
}

/// A short message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn camera_access(error: &CameraError) -> Self {
        Self {
            kind: NoticeKind::CameraAccess,
            severity: Severity::Error,
            title: "Camera Error".to_string(),
            description: format!("Could not access the camera ({error}). Please check permissions."),
        }
    }

    pub fn illumination_unsupported() -> Self {
        Self {
            kind: NoticeKind::IlluminationUnsupported,
            severity: Severity::Info,
            title: "Flashlight Unavailable".to_string(),
            description: "Your device does not support flashlight control.".to_string(),
        }
    }

    pub fn illumination_control(error: &IlluminationError) -> Self {
        Self {
            kind: NoticeKind::IlluminationControl,
            severity: Severity::Error,
            title: "Flashlight Error".to_string(),
            description: format!("Could not control the flashlight ({error})."),
        }
    }

    pub fn capture_failed(error: &PhotoError) -> Self {
        Self {
            kind: NoticeKind::CaptureFailed,
            severity: Severity::Error,
            title: "Capture Error".to_string(),
            description: format!("Failed to capture image: {error}"),
        }
    }

    pub fn image_captured(file_name: &str) -> Self {
        Self {
            kind: NoticeKind::ImageCaptured,
            severity: Severity::Info,
            title: "Image Captured".to_string(),
            description: format!("Light detected, image saved as {file_name}."),
        }
    }

    /// Whether this notice reports a failure
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Sending half of the notice channel
///
/// Cloneable. A dropped receiver is not an error: notices are fire and forget.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: Option<mpsc::UnboundedSender<Notice>>,
}

impl Notifier {
    /// Create a notifier and the receiver the UI listens on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A notifier that drops every notice
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Push a notice without waiting
    pub fn notify(&self, notice: Notice) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(notice).is_err() {
            trace!("Notice receiver dropped");
        }
    }
}
