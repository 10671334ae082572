// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for captured stills

use crate::constants::app_info::APP_NAME;
use crate::constants::capture::{DEFAULT_SAVE_FOLDER, FILE_EXTENSION};
use crate::errors::PhotoError;
use crate::pipelines::photo::{CaptureSink, CapturedImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default folder for captures: `~/Pictures/light-capture`
///
/// Falls back to the data directory, then the current directory, when the
/// platform has no pictures folder.
pub fn default_capture_dir() -> PathBuf {
    dirs::picture_dir()
        .map(|p| p.join(DEFAULT_SAVE_FOLDER))
        .or_else(|| dirs::data_dir().map(|p| p.join(APP_NAME).join("captures")))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_FOLDER))
}

/// Saves every capture as a file in one directory
///
/// The directory is created on the first save.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    saved: u64,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of files written by this sink
    pub fn saved(&self) -> u64 {
        self.saved
    }
}

impl CaptureSink for DirectorySink {
    fn image_captured(&mut self, image: &CapturedImage) {
        debug!(
            sequence = image.sequence,
            bytes = image.data.len(),
            "Capture received"
        );
    }

    async fn persist(&mut self, image: CapturedImage) -> Result<PathBuf, PhotoError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(image.file_name());
        tokio::fs::write(&path, &image.data).await?;

        self.saved += 1;
        info!(path = %path.display(), sequence = image.sequence, "Capture saved");
        Ok(path)
    }
}

/// Saved captures in `dir`, newest first
///
/// A missing directory is simply empty.
pub async fn list_captures(dir: &Path) -> Vec<PathBuf> {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut files: Vec<_> = entries
            .flatten()
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(FILE_EXTENSION))
            })
            .collect();

        // Newest first; ties fall back to name so capture numbers stay ordered
        files.sort_by_key(|e| {
            let modified = e.metadata().ok().and_then(|m| m.modified().ok());
            (std::cmp::Reverse(modified), std::cmp::Reverse(e.file_name()))
        });

        files.into_iter().map(|e| e.path()).collect()
    })
    .await
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn temp_dir(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "light-capture-storage-{}-{}",
            test,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn image(sequence: u64, second: u32) -> CapturedImage {
        CapturedImage {
            data: vec![0xFF, 0xD8, 0xFF, 0xD9],
            width: 1,
            height: 1,
            sequence,
            captured_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, second).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_persist_creates_directory() {
        let dir = temp_dir("persist").join("nested");
        let mut sink = DirectorySink::new(&dir);

        let path = sink.persist(image(1, 0)).await.unwrap();
        assert_eq!(path, dir.join("capture-1-2024-01-01T00-00-00-000Z.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(sink.saved(), 1);

        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[tokio::test]
    async fn test_list_captures_newest_first() {
        let dir = temp_dir("list");
        let mut sink = DirectorySink::new(&dir);
        sink.persist(image(1, 0)).await.unwrap();
        sink.persist(image(2, 1)).await.unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let files = list_captures(&dir).await;
        let names: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.ends_with(".jpg")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_list_missing_dir() {
        assert!(list_captures(Path::new("/nonexistent/captures")).await.is_empty());
    }
}
