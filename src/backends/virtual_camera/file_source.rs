// SPDX-License-Identifier: GPL-3.0-only

//! Frame source streaming from image files

use crate::backends::camera::CameraDevice;
use crate::backends::camera::types::{CameraFrame, FrameSource, PixelFormat};
use crate::constants::file_formats;
use crate::errors::CameraError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Load an image file as an RGBA frame
pub fn load_image_as_frame(path: &Path) -> Result<CameraFrame, CameraError> {
    debug!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        CameraError::AccessDenied(format!("failed to load image '{}': {}", path.display(), e))
    })?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();
    let data: Vec<u8> = rgba.into_raw();

    Ok(CameraFrame {
        data: data.into(),
        width,
        height,
        stride: width * 4,
        format: PixelFormat::RGBA,
        captured_at: std::time::Instant::now(),
    })
}

/// Resolve a file or directory into the ordered list of images to replay
///
/// A directory yields every supported image directly inside it, sorted by
/// file name.
pub fn collect_image_paths(path: &Path) -> Result<Vec<PathBuf>, CameraError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = std::fs::read_dir(path).map_err(|e| {
        CameraError::AccessDenied(format!("cannot read '{}': {}", path.display(), e))
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(file_formats::is_image_extension)
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(CameraError::NoCameraFound);
    }
    Ok(paths)
}

/// List the sub-directories of `root` as virtual cameras
///
/// Each sub-directory is one "device" whose label is the directory name,
/// so a recorded scene can hold e.g. `front/` and `back/` feeds.
pub fn enumerate_virtual_cameras(root: &Path) -> Vec<CameraDevice> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut cameras: Vec<CameraDevice> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_dir())
        .map(|p| CameraDevice {
            name: p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: p.to_string_lossy().into_owned(),
        })
        .collect();
    cameras.sort_by(|a, b| a.path.cmp(&b.path));
    cameras
}

/// Replays decoded images, each one shown for `frame_duration`
///
/// The clock starts at the first `latest_frame` call. Without looping the
/// last image stays on screen once the sequence is exhausted.
pub struct FileFrameSource {
    frames: Vec<CameraFrame>,
    frame_duration: Duration,
    looped: bool,
    started_at: Option<Instant>,
    active: bool,
}

impl FileFrameSource {
    /// Open a single image or a directory of images
    pub fn open(path: &Path, frame_duration: Duration, looped: bool) -> Result<Self, CameraError> {
        let paths = collect_image_paths(path)?;
        let mut frames = Vec::with_capacity(paths.len());
        for image_path in &paths {
            match load_image_as_frame(image_path) {
                Ok(frame) => frames.push(frame),
                Err(e) => warn!(path = %image_path.display(), error = %e, "Skipping unreadable image"),
            }
        }

        if frames.is_empty() {
            return Err(CameraError::NoCameraFound);
        }

        info!(
            path = %path.display(),
            frames = frames.len(),
            frame_ms = frame_duration.as_millis(),
            looped,
            "File frame source opened"
        );

        Ok(Self::from_frames(frames, frame_duration, looped))
    }

    /// Replay frames that are already in memory
    pub fn from_frames(frames: Vec<CameraFrame>, frame_duration: Duration, looped: bool) -> Self {
        Self {
            frames,
            frame_duration: frame_duration.max(Duration::from_millis(1)),
            looped,
            started_at: None,
            active: true,
        }
    }

    /// Number of frames in the sequence
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn frame_index(&self, elapsed: Duration) -> Option<usize> {
        if self.frames.is_empty() {
            return None;
        }
        let index = (elapsed.as_millis() / self.frame_duration.as_millis()) as usize;
        if self.looped {
            Some(index % self.frames.len())
        } else {
            Some(index.min(self.frames.len() - 1))
        }
    }
}

impl FrameSource for FileFrameSource {
    fn latest_frame(&mut self) -> Option<CameraFrame> {
        if !self.active {
            return None;
        }
        let now = Instant::now();
        let started_at = *self.started_at.get_or_insert(now);
        let index = self.frame_index(now.duration_since(started_at))?;

        let mut frame = self.frames[index].clone();
        frame.captured_at = std::time::Instant::now();
        Some(frame)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn release(&mut self) {
        if self.active {
            debug!("File frame source released");
        }
        self.active = false;
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(value: u8) -> CameraFrame {
        CameraFrame::from_rgba(2, 2, vec![value; 16])
    }

    #[test]
    fn test_frame_index_without_loop() {
        let source =
            FileFrameSource::from_frames(vec![solid(0), solid(1)], Duration::from_millis(100), false);
        assert_eq!(source.frame_index(Duration::from_millis(0)), Some(0));
        assert_eq!(source.frame_index(Duration::from_millis(150)), Some(1));
        assert_eq!(source.frame_index(Duration::from_secs(10)), Some(1));
    }

    #[test]
    fn test_frame_index_with_loop() {
        let source =
            FileFrameSource::from_frames(vec![solid(0), solid(1)], Duration::from_millis(100), true);
        assert_eq!(source.frame_index(Duration::from_millis(250)), Some(0));
        assert_eq!(source.frame_index(Duration::from_millis(350)), Some(1));
    }

    #[test]
    fn test_release_stops_frames() {
        let mut source = FileFrameSource::from_frames(vec![solid(7)], Duration::from_millis(100), true);
        assert!(source.latest_frame().is_some());
        source.release();
        assert!(!source.is_active());
        assert!(source.latest_frame().is_none());
    }

    #[test]
    fn test_open_missing_path() {
        let missing = std::env::temp_dir().join("light-capture-missing-source-dir");
        assert!(FileFrameSource::open(&missing, Duration::from_millis(100), false).is_err());
    }

    #[test]
    fn test_open_directory_of_images() {
        let dir = std::env::temp_dir().join(format!("light-capture-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 10, 10, 255]))
            .save(dir.join("b.png"))
            .unwrap();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([250, 250, 250, 255]))
            .save(dir.join("a.png"))
            .unwrap();
        std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

        let paths = collect_image_paths(&dir).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.png"));

        let mut source = FileFrameSource::open(&dir, Duration::from_secs(60), false).unwrap();
        assert_eq!(source.len(), 2);
        let frame = source.latest_frame().unwrap();
        assert_eq!(frame.pixel(0, 0), Some([250, 250, 250]));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_enumerate_virtual_cameras() {
        let root = std::env::temp_dir().join(format!("light-capture-cameras-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("front")).unwrap();
        std::fs::create_dir_all(root.join("back")).unwrap();
        std::fs::write(root.join("readme.txt"), "").unwrap();

        let cameras = enumerate_virtual_cameras(&root);
        let names: Vec<&str> = cameras.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["back", "front"]);

        std::fs::remove_dir_all(&root).unwrap();
    }
}
