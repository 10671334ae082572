// SPDX-License-Identifier: MPL-2.0

//! Types shared by the frame analysis tasks

use crate::constants::detection::{
    DEFAULT_SENSITIVITY, MAX_BRIGHTNESS, SENSITIVITY_MAX, SENSITIVITY_MIN, THRESHOLD_STEP,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixel coordinates inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl PixelPoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Color a light must match to count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TargetColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Every channel within `tolerance` of the target (inclusive)
    pub fn matches(&self, rgb: [u8; 3], tolerance: u8) -> bool {
        rgb[0].abs_diff(self.r) <= tolerance
            && rgb[1].abs_diff(self.g) <= tolerance
            && rgb[2].abs_diff(self.b) <= tolerance
    }
}

impl fmt::Display for TargetColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for TargetColor {
    type Err = String;

    /// Parse `R,G,B` or `#RRGGBB`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(format!("expected #RRGGBB, got '{}'", s));
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&hex[range], 16).map_err(|e| format!("invalid hex color '{}': {}", s, e))
            };
            return Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected R,G,B, got '{}'", s));
        }
        let channel = |part: &str| {
            part.parse::<u8>()
                .map_err(|e| format!("invalid channel '{}': {}", part, e))
        };
        Ok(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
    }
}

/// Detection sensitivity, 0 (never) to 100 (almost anything)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Sensitivity(f32);

impl Sensitivity {
    /// Clamp into [0, 100]; NaN becomes 0
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(SENSITIVITY_MIN);
        }
        Self(value.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Brightness a sample must exceed: `255 - sensitivity * 2.55`
    pub fn threshold(&self) -> f64 {
        MAX_BRIGHTNESS - f64::from(self.0) * THRESHOLD_STEP
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(DEFAULT_SENSITIVITY)
    }
}

impl From<f32> for Sensitivity {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Sensitivity> for f32 {
    fn from(value: Sensitivity) -> Self {
        value.0
    }
}

/// Brightest sample found in a frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrightestSample {
    /// Luminance, 0.0-255.0
    pub brightness: f64,
    pub position: PixelPoint,
}

/// Outcome of classifying one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleResult {
    /// Brightest qualifying sample exceeded the threshold
    pub detected: bool,
    /// Brightest qualifying sample, reported even when not detected.
    /// `None` when no sample qualified.
    pub brightest_point: Option<PixelPoint>,
    /// Luminance of the brightest qualifying sample (0 if none)
    pub brightness: f64,
}

impl SampleResult {
    /// Nothing qualified
    pub fn empty() -> Self {
        Self {
            detected: false,
            brightest_point: None,
            brightness: 0.0,
        }
    }
}

/// Tunables read on every detection tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectionSettings {
    pub sensitivity: Sensitivity,
    /// Turn the flashlight on around each capture
    pub flashlight_assist: bool,
    pub target_color: Option<TargetColor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_endpoints() {
        assert_eq!(Sensitivity::new(0.0).threshold(), 255.0);
        assert!(Sensitivity::new(100.0).threshold().abs() < 1e-9);
        assert!((Sensitivity::new(50.0).threshold() - 127.5).abs() < 1e-9);
    }

    #[test]
    fn test_sensitivity_clamped() {
        assert_eq!(Sensitivity::new(-5.0).value(), 0.0);
        assert_eq!(Sensitivity::new(250.0).value(), 100.0);
        assert_eq!(Sensitivity::new(f32::NAN).value(), 0.0);
        assert_eq!(Sensitivity::new(42.5).value(), 42.5);
    }

    #[test]
    fn test_target_color_tolerance_inclusive() {
        let target = TargetColor::new(255, 0, 0);
        assert!(target.matches([205, 50, 0], 50));
        assert!(!target.matches([204, 0, 0], 50));
        assert!(!target.matches([255, 51, 0], 50));
    }

    #[test]
    fn test_target_color_parse() {
        assert_eq!("255, 128,0".parse::<TargetColor>(), Ok(TargetColor::new(255, 128, 0)));
        assert_eq!("#00ff7f".parse::<TargetColor>(), Ok(TargetColor::new(0, 255, 127)));
        assert!("1,2".parse::<TargetColor>().is_err());
        assert!("300,0,0".parse::<TargetColor>().is_err());
        assert!("#12345".parse::<TargetColor>().is_err());
    }
}
