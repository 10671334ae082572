// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! These are design parameters, not discovered behavior. Everything that
//! tests may want to shrink (delays, stride) is also exposed through
//! [`crate::config::Config`].

/// Light detection parameters
pub mod detection {
    /// Spatial sampling stride in pixels, applied on both axes
    pub const SAMPLE_STRIDE: u32 = 4;

    /// Per-channel tolerance when matching a target color (0-255 scale)
    pub const COLOR_TOLERANCE: u8 = 50;

    /// ITU-R BT.601 perceived luminance weights (R, G, B)
    pub const LUMA_WEIGHTS: (f64, f64, f64) = (0.299, 0.587, 0.114);

    /// Number of recent brightest points kept for visualization
    pub const DOT_HISTORY_LEN: usize = 10;

    /// Default sensitivity (0-100). High so small LEDs still trigger.
    pub const DEFAULT_SENSITIVITY: f32 = 80.0;

    /// Sensitivity bounds
    pub const SENSITIVITY_MIN: f32 = 0.0;
    pub const SENSITIVITY_MAX: f32 = 100.0;

    /// Threshold units per sensitivity point (255 / 100)
    pub const THRESHOLD_STEP: f64 = 2.55;

    /// Maximum luminance value
    pub const MAX_BRIGHTNESS: f64 = 255.0;
}

/// Capture sequence timing
pub mod timing {
    use std::time::Duration;

    /// Minimum interval between two analysed frames
    pub const DETECTION_INTERVAL: Duration = Duration::from_millis(100);

    /// Time given to the sensor's auto-exposure after the flashlight turns on
    pub const SETTLE_DELAY: Duration = Duration::from_millis(2000);

    /// Quiet period after a capture before detection re-arms
    pub const COOLDOWN_DELAY: Duration = Duration::from_millis(5000);

    /// Host refresh cadence the detection tick piggybacks on (~60 Hz)
    pub const REFRESH_PERIOD: Duration = Duration::from_millis(16);
}

/// Still capture output
pub mod capture {
    /// JPEG quality for captured stills (0-100)
    pub const JPEG_QUALITY: u8 = 95;

    /// Folder created under the user's pictures directory
    pub const DEFAULT_SAVE_FOLDER: &str = "light-capture";

    /// Prefix of every capture file name
    pub const FILE_PREFIX: &str = "capture";

    /// Extension of every capture file name
    pub const FILE_EXTENSION: &str = "jpg";
}

/// Camera selection
pub mod camera {
    /// Label fragments identifying a back-facing camera
    pub const BACK_CAMERA_HINTS: &[&str] = &["back", "rear", "traseira"];
}

/// Supported file formats for the file-backed frame source
pub mod file_formats {
    /// Image file extensions (lowercase, without dot)
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if an extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Application info
pub mod app_info {
    /// Application name used for config and data directories
    pub const APP_NAME: &str = "light-capture";

    /// Config file name inside the config directory
    pub const CONFIG_FILE: &str = "config.json";

    /// Version string including the git revision when available
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
