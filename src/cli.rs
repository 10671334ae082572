// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Analysing a single image
//! - Watching a file-backed frame source and capturing on detection
//! - Showing the persisted configuration

use light_capture::app::frame_processor::{Sensitivity, TargetColor};
use light_capture::app::{CaptureSequencer, refresh_ticks};
use light_capture::backends::camera::select_preferred_camera;
use light_capture::backends::virtual_camera::{
    FileFrameSource, collect_image_paths, enumerate_virtual_cameras, load_image_as_frame,
};
use light_capture::config::Config;
use light_capture::constants::timing::REFRESH_PERIOD;
use light_capture::errors::{AppError, CameraError};
use light_capture::flash::FlashHardware;
use light_capture::notifications::{Notice, Notifier};
use light_capture::pipelines::photo::PhotoPipeline;
use light_capture::storage::{DirectorySink, list_captures};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tracing::{debug, info};

/// Options of the `watch` command
pub struct WatchOptions {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub sensitivity: Option<f32>,
    pub no_flashlight: bool,
    pub color: Option<TargetColor>,
    pub frame_ms: u64,
    pub looped: bool,
}

/// Explicit config path, or the platform default
pub fn resolve_config_path(path: Option<PathBuf>) -> Result<PathBuf, AppError> {
    path.or_else(Config::default_path)
        .ok_or_else(|| AppError::Config("no config directory on this platform".to_string()))
}

/// Classify one image and print the result
pub fn analyze(
    config_path: &Path,
    image: &Path,
    sensitivity: Option<f32>,
    color: Option<TargetColor>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config_path)?;
    let mut settings = config.detection_settings();
    if let Some(sensitivity) = sensitivity {
        settings.sensitivity = Sensitivity::new(sensitivity);
    }
    if color.is_some() {
        settings.target_color = color;
    }

    let frame = load_image_as_frame(image)?;
    let result = config.detection.classifier().classify(&frame, &settings);

    println!("Image:       {} ({}x{})", image.display(), frame.width, frame.height);
    println!(
        "Sensitivity: {} (threshold {:.1})",
        settings.sensitivity.value(),
        settings.sensitivity.threshold()
    );
    if let Some(target) = settings.target_color {
        println!("Target:      {}", target);
    }
    println!("Brightness:  {:.1}", result.brightness);
    match result.brightest_point {
        Some(point) => println!("Brightest:   ({}, {})", point.x, point.y),
        None => println!("Brightest:   none"),
    }
    println!("Detected:    {}", if result.detected { "yes" } else { "no" });

    Ok(())
}

/// Run the capture pipeline over a file-backed source until Ctrl+C
pub fn watch(config_path: &Path, options: WatchOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load(config_path)?;
    if let Some(sensitivity) = options.sensitivity {
        config.sensitivity = Sensitivity::new(sensitivity);
    }
    if options.no_flashlight {
        config.flashlight_assist = false;
    }
    if options.color.is_some() {
        config.target_color = options.color;
    }
    if options.output.is_some() {
        config.output_dir = options.output.clone();
    }

    let (notifier, mut notices) = Notifier::channel();

    let frame_duration = Duration::from_millis(options.frame_ms);
    let source = match open_source(options.source.as_deref(), frame_duration, options.looped) {
        Ok(source) => source,
        Err(e) => {
            print_notice(&Notice::camera_access(&e));
            return Err(e.into());
        }
    };

    let flash = FlashHardware::detect();
    if let Some(message) = &flash.permission_error {
        eprintln!("{}", message);
    }

    let capture_dir = config.capture_dir();
    println!("Saving captures to {}", capture_dir.display());
    println!(
        "Sensitivity {}, flashlight {}{}",
        config.sensitivity.value(),
        if config.flashlight_assist { "on" } else { "off" },
        config
            .target_color
            .map(|c| format!(", color {}", c))
            .unwrap_or_default()
    );
    println!("Watching... (press Ctrl+C to stop)");

    let (_settings_tx, settings_rx) = watch::channel(config.detection_settings());
    let mut sequencer = CaptureSequencer::new(
        source,
        flash,
        DirectorySink::new(&capture_dir),
        settings_rx,
        notifier,
    )
    .with_timing(config.timing.into())
    .with_classifier(config.detection.classifier())
    .with_pipeline(PhotoPipeline::with_quality(config.jpeg_quality));

    let stop = Arc::new(Notify::new());
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        stop_handler.notify_one();
    })?;

    let rt = tokio::runtime::Runtime::new()?;
    let captures = rt.block_on(async {
        let printer = tokio::spawn(async move {
            while let Some(notice) = notices.recv().await {
                print_notice(&notice);
            }
        });

        let shutdown = async move {
            stop.notified().await;
            println!();
            println!("Stopping...");
        };
        sequencer.run(refresh_ticks(REFRESH_PERIOD), shutdown).await;

        // Closing the notice channel ends the printer
        let counts = (sequencer.session().capture_count, sequencer.sink().saved());
        drop(sequencer);
        let _ = printer.await;
        counts
    });

    let (captured, written) = captures;
    let in_folder = rt.block_on(list_captures(&capture_dir));
    println!(
        "{} capture(s) this session, {} saved, {} in folder",
        captured,
        written,
        in_folder.len()
    );
    if let Some(latest) = in_folder.first() {
        println!("Latest: {}", latest.display());
    }

    Ok(())
}

/// Print the config, optionally resetting it first
pub fn show_config(config_path: &Path, reset: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = if reset {
        let config = Config::default();
        config.save(config_path)?;
        println!("Configuration reset.");
        config
    } else {
        Config::load(config_path)?
    };

    println!("# {}", config_path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Open the frame source for `watch`
///
/// A directory holding only sub-directories is treated as a set of
/// cameras; the back-facing one is preferred.
fn open_source(
    path: Option<&Path>,
    frame_duration: Duration,
    looped: bool,
) -> Result<FileFrameSource, CameraError> {
    let path = path.ok_or(CameraError::NoCameraFound)?;

    let cameras = enumerate_virtual_cameras(path);
    let has_images = collect_image_paths(path).is_ok();
    if !cameras.is_empty() && !has_images {
        let camera = select_preferred_camera(&cameras).ok_or(CameraError::NoCameraFound)?;
        info!(name = %camera.name, path = %camera.path, "Using camera");
        println!("Using camera: {}", camera.name);
        return FileFrameSource::open(Path::new(&camera.path), frame_duration, looped);
    }

    debug!(path = %path.display(), "Opening frame source");
    FileFrameSource::open(path, frame_duration, looped)
}

fn print_notice(notice: &Notice) {
    if notice.is_error() {
        eprintln!("[{}] {}", notice.title, notice.description);
    } else {
        println!("[{}] {}", notice.title, notice.description);
    }
}
