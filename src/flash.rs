// SPDX-License-Identifier: GPL-3.0-only

//! Illumination control
//!
//! [`IlluminationTrack`] is the device side: something that can report
//! whether it has a light and switch it. [`IlluminationController`] wraps a
//! track with the rules the capture pipeline needs (no-op without a live
//! stream, a single "unsupported" notice, failure notices only when
//! switching on).
//!
//! [`FlashHardware`] is the Linux implementation: flash LEDs exposed at
//! `/sys/class/leds/*:flash`, driven in torch mode through the `brightness`
//! file.

use crate::errors::IlluminationError;
use crate::notifications::{Notice, Notifier};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default sysfs directory holding LED class devices
pub const SYSFS_LEDS_DIR: &str = "/sys/class/leds";

/// What an illumination track can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackCapabilities {
    /// The track has a controllable light (torch)
    pub supports_illumination: bool,
}

/// A video track with an attached light
pub trait IlluminationTrack: Send {
    fn capabilities(&self) -> TrackCapabilities;

    /// Switch the light on or off
    fn set_illumination(&mut self, on: bool) -> Result<(), IlluminationError>;
}

/// Track without any light
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIllumination;

impl IlluminationTrack for NoIllumination {
    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities::default()
    }

    fn set_illumination(&mut self, _on: bool) -> Result<(), IlluminationError> {
        Err(IlluminationError::Unsupported)
    }
}

/// What happened to an illumination request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IlluminationOutcome {
    /// The track accepted the new state
    Applied,
    /// No live stream, nothing was touched
    NoStream,
    /// The track has no light
    Unsupported,
    /// The track rejected the request
    Failed,
}

impl IlluminationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, IlluminationOutcome::Applied)
    }
}

/// Applies illumination requests to a track
pub struct IlluminationController<T: IlluminationTrack> {
    track: T,
    notifier: Notifier,
    /// Last state the track accepted
    lit: bool,
    unsupported_notified: bool,
}

impl<T: IlluminationTrack> IlluminationController<T> {
    pub fn new(track: T, notifier: Notifier) -> Self {
        Self {
            track,
            notifier,
            lit: false,
            unsupported_notified: false,
        }
    }

    /// Whether the light is currently on, as far as we know
    pub fn is_on(&self) -> bool {
        self.lit
    }

    pub fn track(&self) -> &T {
        &self.track
    }

    /// Request the light on or off
    ///
    /// `stream_active` is the state of the video stream the track belongs
    /// to; with no live stream the request is dropped.
    pub fn set_illumination(&mut self, on: bool, stream_active: bool) -> IlluminationOutcome {
        if !stream_active {
            debug!(on, "Illumination request without a live stream");
            return IlluminationOutcome::NoStream;
        }

        if !self.track.capabilities().supports_illumination {
            if on && !self.unsupported_notified {
                info!("Illumination not supported by this track");
                self.unsupported_notified = true;
                self.notifier.notify(Notice::illumination_unsupported());
            }
            return IlluminationOutcome::Unsupported;
        }

        match self.track.set_illumination(on) {
            Ok(()) => {
                debug!(on, "Illumination applied");
                self.lit = on;
                IlluminationOutcome::Applied
            }
            Err(e) => {
                if on {
                    warn!(error = %e, "Failed to turn illumination on");
                    self.notifier.notify(Notice::illumination_control(&e));
                } else if self.lit {
                    warn!(error = %e, "Failed to turn illumination off");
                } else {
                    debug!(error = %e, "Illumination off request failed");
                }
                IlluminationOutcome::Failed
            }
        }
    }
}

/// A flash LED device discovered via sysfs
#[derive(Debug, Clone)]
pub struct FlashDevice {
    /// Sysfs path, e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    /// Maximum brightness value (from `max_brightness` file)
    max_brightness: u32,
    /// Human-readable name (directory basename)
    name: String,
}

/// Why an LED entry could not be used
enum LedAccess {
    /// `max_brightness` is missing or zero
    Invalid,
    /// The `brightness` file exists but cannot be written
    ReadOnly(PathBuf),
}

impl FlashDevice {
    /// Open the LED at `path` for writing
    fn open(path: PathBuf, name: String) -> Result<Self, LedAccess> {
        let max_path = path.join("max_brightness");
        let max_brightness = std::fs::read_to_string(&max_path)
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|max| *max > 0)
            .ok_or_else(|| {
                warn!(path = %max_path.display(), "Unusable max_brightness, LED skipped");
                LedAccess::Invalid
            })?;

        let brightness = path.join("brightness");
        if let Err(e) = std::fs::OpenOptions::new().write(true).open(&brightness) {
            warn!(path = %brightness.display(), error = %e, "Flash LED is not writable");
            return Err(LedAccess::ReadOnly(brightness));
        }

        Ok(Self {
            path,
            max_brightness,
            name,
        })
    }

    /// Get the device name (e.g. "white:flash")
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    /// Set raw brightness value (0 = off, max_brightness = full)
    pub fn set_brightness(&self, value: u32) -> io::Result<()> {
        let clamped = value.min(self.max_brightness);
        std::fs::write(self.path.join("brightness"), clamped.to_string())
    }

    /// Turn off the LED
    pub fn off(&self) -> io::Result<()> {
        self.set_brightness(0)
    }

    /// Turn on at a fraction of max brightness (0.0 = off, 1.0 = full)
    pub fn torch(&self, intensity: f32) -> io::Result<()> {
        let clamped = intensity.clamp(0.0, 1.0);
        let value = (clamped * self.max_brightness as f32).round() as u32;
        self.set_brightness(value)
    }
}

/// Flash LEDs found in an LED class directory
#[derive(Debug, Clone, Default)]
pub struct FlashHardware {
    /// Writable `*:flash` LEDs, sorted by name
    pub devices: Vec<FlashDevice>,
    /// Set when flash LEDs exist but none of them can be written
    pub permission_error: Option<String>,
}

impl FlashHardware {
    /// Look for flash LEDs under `/sys/class/leds`
    pub fn detect() -> FlashHardware {
        Self::detect_in(Path::new(SYSFS_LEDS_DIR))
    }

    /// Look for `*:flash` entries under `leds_dir`
    pub fn detect_in(leds_dir: &Path) -> FlashHardware {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            warn!(dir = %leds_dir.display(), "Cannot read LED directory, running without flash");
            return FlashHardware::default();
        };

        let mut devices = Vec::new();
        let mut read_only = Vec::new();
        for entry in entries.flatten() {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.ends_with(":flash") {
                continue;
            }

            match FlashDevice::open(entry.path(), name) {
                Ok(device) => {
                    info!(name = %device.name, max = device.max_brightness, "Flash LED found");
                    devices.push(device);
                }
                Err(LedAccess::ReadOnly(path)) => read_only.push(path),
                Err(LedAccess::Invalid) => {}
            }
        }

        devices.sort_by(|a, b| a.name.cmp(&b.name));
        let permission_error =
            (devices.is_empty() && !read_only.is_empty()).then(|| permission_message(&read_only));

        FlashHardware {
            devices,
            permission_error,
        }
    }

    /// Whether any controllable flash devices were found
    pub fn has_devices(&self) -> bool {
        !self.devices.is_empty()
    }
}

/// Message for flash LEDs that exist but cannot be written
fn permission_message(read_only: &[PathBuf]) -> String {
    let files: Vec<String> = read_only.iter().map(|p| p.display().to_string()).collect();
    format!(
        "Flash LEDs found but not writable: {}. Captures continue without the flashlight; \
         give your user write access to these files to enable it.",
        files.join(", ")
    )
}

impl IlluminationTrack for FlashHardware {
    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities {
            supports_illumination: self.has_devices(),
        }
    }

    /// Drive every LED; any device failing fails the request
    fn set_illumination(&mut self, on: bool) -> Result<(), IlluminationError> {
        if self.devices.is_empty() {
            return Err(IlluminationError::Unsupported);
        }

        let mut failures = Vec::new();
        for dev in &self.devices {
            let result = if on { dev.torch(1.0) } else { dev.off() };
            if let Err(e) = result {
                warn!(device = %dev.name, on, error = %e, "Failed to set flash LED");
                failures.push(format!("{}: {}", dev.name, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(IlluminationError::ControlFailed(failures.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NoticeKind;

    /// Track that records requests and fails on demand
    #[derive(Default)]
    struct FakeTrack {
        supported: bool,
        fail: bool,
        calls: Vec<bool>,
    }

    impl IlluminationTrack for FakeTrack {
        fn capabilities(&self) -> TrackCapabilities {
            TrackCapabilities {
                supports_illumination: self.supported,
            }
        }

        fn set_illumination(&mut self, on: bool) -> Result<(), IlluminationError> {
            self.calls.push(on);
            if self.fail {
                Err(IlluminationError::ControlFailed("busy".into()))
            } else {
                Ok(())
            }
        }
    }

    fn fake_leds(test: &str, leds: &[(&str, &str)]) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "light-capture-leds-{}-{}",
            test,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        for (name, max) in leds {
            let dir = root.join(name);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("max_brightness"), max).unwrap();
            std::fs::write(dir.join("brightness"), "0").unwrap();
        }
        root
    }

    #[test]
    fn test_no_stream_is_noop() {
        let (notifier, mut rx) = Notifier::channel();
        let mut controller = IlluminationController::new(
            FakeTrack {
                supported: true,
                ..Default::default()
            },
            notifier,
        );
        assert_eq!(controller.set_illumination(true, false), IlluminationOutcome::NoStream);
        assert!(controller.track().calls.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unsupported_notice_once_and_only_on_enable() {
        let (notifier, mut rx) = Notifier::channel();
        let mut controller = IlluminationController::new(FakeTrack::default(), notifier);

        assert_eq!(controller.set_illumination(false, true), IlluminationOutcome::Unsupported);
        assert!(rx.try_recv().is_err());

        assert_eq!(controller.set_illumination(true, true), IlluminationOutcome::Unsupported);
        assert_eq!(
            rx.try_recv().map(|n| n.kind),
            Ok(NoticeKind::IlluminationUnsupported)
        );

        controller.set_illumination(true, true);
        assert!(rx.try_recv().is_err());
        assert!(controller.track().calls.is_empty());
    }

    #[test]
    fn test_failure_notice_only_when_enabling() {
        let (notifier, mut rx) = Notifier::channel();
        let mut controller = IlluminationController::new(
            FakeTrack {
                supported: true,
                fail: true,
                ..Default::default()
            },
            notifier,
        );

        assert_eq!(controller.set_illumination(true, true), IlluminationOutcome::Failed);
        assert_eq!(
            rx.try_recv().map(|n| n.kind),
            Ok(NoticeKind::IlluminationControl)
        );
        assert!(!controller.is_on());

        assert_eq!(controller.set_illumination(false, true), IlluminationOutcome::Failed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_tracks_light_state() {
        let mut controller = IlluminationController::new(
            FakeTrack {
                supported: true,
                ..Default::default()
            },
            Notifier::disabled(),
        );
        assert!(controller.set_illumination(true, true).is_applied());
        assert!(controller.is_on());
        assert!(controller.set_illumination(false, true).is_applied());
        assert!(!controller.is_on());
        assert_eq!(controller.track().calls, vec![true, false]);
    }

    #[test]
    fn test_detect_fake_sysfs() {
        let root = fake_leds(
            "detect",
            &[
                ("yellow:flash", "255\n"),
                ("white:flash", "100\n"),
                ("broken:flash", "0\n"),
                ("green:status", "1\n"),
            ],
        );

        let hardware = FlashHardware::detect_in(&root);
        let names: Vec<&str> = hardware.devices.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["white:flash", "yellow:flash"]);
        assert!(hardware.permission_error.is_none());
        assert!(hardware.capabilities().supports_illumination);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_torch_writes_brightness() {
        let root = fake_leds("torch", &[("white:flash", "200")]);
        let mut hardware = FlashHardware::detect_in(&root);
        let brightness = root.join("white:flash").join("brightness");

        hardware.set_illumination(true).unwrap();
        assert_eq!(std::fs::read_to_string(&brightness).unwrap(), "200");

        hardware.set_illumination(false).unwrap();
        assert_eq!(std::fs::read_to_string(&brightness).unwrap(), "0");

        hardware.devices[0].torch(0.5).unwrap();
        assert_eq!(std::fs::read_to_string(&brightness).unwrap(), "100");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_led_dir() {
        let mut hardware = FlashHardware::detect_in(Path::new("/nonexistent/leds"));
        assert!(!hardware.has_devices());
        assert!(!hardware.capabilities().supports_illumination);
        assert_eq!(hardware.set_illumination(true), Err(IlluminationError::Unsupported));
        assert!(NoIllumination.set_illumination(true).is_err());
    }

    #[test]
    fn test_permission_message_lists_files() {
        let message = permission_message(&[
            PathBuf::from("/sys/class/leds/white:flash/brightness"),
            PathBuf::from("/sys/class/leds/yellow:flash/brightness"),
        ]);
        assert!(message.contains("white:flash/brightness, /sys/class/leds/yellow:flash"));
        assert!(message.contains("without the flashlight"));
    }
}
