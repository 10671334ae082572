// SPDX-License-Identifier: GPL-3.0-only

//! Capture sequencer
//!
//! State machine driven by detection ticks and two timers:
//!
//! ```text
//!   Idle ──detected──▶ Preparing ──settle──▶ Capturing ──▶ Cooldown ──cooldown──▶ Idle
//! ```
//!
//! While not `Idle` every tick is dropped, so at most one capture sequence
//! is ever in flight. The settle delay only runs with flashlight assist;
//! without it the snapshot is taken on the next timer turn. A failed
//! capture still goes through the cooldown.
//!
//! [`CaptureSequencer::run`] drives everything from a [`TickSource`]; the
//! `on_tick` / `on_timer` pair exposes the same transitions step by step.

use crate::app::frame_processor::{DetectionSettings, LightClassifier, SampleResult};
use crate::app::session::CaptureSession;
use crate::app::tick::{DetectionGate, TickSource};
use crate::backends::camera::types::FrameSource;
use crate::constants::timing;
use crate::flash::{IlluminationController, IlluminationTrack};
use crate::notifications::{Notice, Notifier};
use crate::pipelines::photo::{CaptureSink, PhotoCapture, PhotoPipeline};
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Delays used by the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTiming {
    pub detection_interval: Duration,
    pub settle_delay: Duration,
    pub cooldown_delay: Duration,
}

impl Default for SequencerTiming {
    fn default() -> Self {
        Self {
            detection_interval: timing::DETECTION_INTERVAL,
            settle_delay: timing::SETTLE_DELAY,
            cooldown_delay: timing::COOLDOWN_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Detecting
    Idle,
    /// Waiting for exposure to settle before the snapshot
    Preparing { deadline: Instant },
    /// Snapshot, encoding and hand-off in progress
    Capturing,
    /// Waiting before detection re-arms
    Cooldown { deadline: Instant },
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The sequencer has been shut down
    Stopped,
    /// A capture sequence is in flight
    Ignored,
    /// Too soon after the last analysed tick
    Throttled,
    /// The stream has no frame to analyse
    NoFrame,
    /// The frame was analysed, nothing detected
    Analyzed(SampleResult),
    /// A light was detected and a capture sequence started
    Triggered(SampleResult),
}

/// Detection loop and capture sequence over a frame source
pub struct CaptureSequencer<S, T, K>
where
    S: FrameSource,
    T: IlluminationTrack,
    K: CaptureSink,
{
    source: S,
    illumination: IlluminationController<T>,
    sink: K,
    classifier: LightClassifier,
    pipeline: PhotoPipeline,
    timing: SequencerTiming,
    gate: DetectionGate,
    settings: watch::Receiver<DetectionSettings>,
    notifier: Notifier,
    state: SequencerState,
    session: CaptureSession,
    session_tx: watch::Sender<CaptureSession>,
    /// Flashlight assist as it was when the current sequence started
    assist: bool,
    stopped: bool,
}

impl<S, T, K> CaptureSequencer<S, T, K>
where
    S: FrameSource,
    T: IlluminationTrack,
    K: CaptureSink,
{
    pub fn new(
        source: S,
        track: T,
        sink: K,
        settings: watch::Receiver<DetectionSettings>,
        notifier: Notifier,
    ) -> Self {
        let timing = SequencerTiming::default();
        let session = CaptureSession::default();
        let (session_tx, _) = watch::channel(session.clone());

        Self {
            source,
            illumination: IlluminationController::new(track, notifier.clone()),
            sink,
            classifier: LightClassifier::new(),
            pipeline: PhotoPipeline::new(),
            timing,
            gate: DetectionGate::new(timing.detection_interval),
            settings,
            notifier,
            state: SequencerState::Idle,
            session,
            session_tx,
            assist: false,
            stopped: false,
        }
    }

    pub fn with_timing(mut self, timing: SequencerTiming) -> Self {
        self.timing = timing;
        self.gate = DetectionGate::new(timing.detection_interval);
        self
    }

    pub fn with_classifier(mut self, classifier: LightClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PhotoPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Observe session snapshots
    pub fn subscribe(&self) -> watch::Receiver<CaptureSession> {
        self.session_tx.subscribe()
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn timing(&self) -> SequencerTiming {
        self.timing
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// When the pending timer fires, if one is pending
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SequencerState::Preparing { deadline } | SequencerState::Cooldown { deadline } => {
                Some(deadline)
            }
            SequencerState::Idle | SequencerState::Capturing => None,
        }
    }

    fn publish(&self) {
        self.session_tx.send_replace(self.session.clone());
    }

    /// Handle one detection tick
    pub fn on_tick(&mut self, now: Instant) -> TickOutcome {
        if self.stopped {
            return TickOutcome::Stopped;
        }
        if self.state != SequencerState::Idle || self.session.is_processing {
            return TickOutcome::Ignored;
        }
        if !self.gate.ready(now) {
            return TickOutcome::Throttled;
        }

        let Some(frame) = self.source.latest_frame() else {
            return TickOutcome::NoFrame;
        };

        let settings = *self.settings.borrow();
        let result = self.classifier.classify(&frame, &settings);
        self.session.record(result);

        if !result.detected {
            self.publish();
            return TickOutcome::Analyzed(result);
        }

        info!(
            brightness = result.brightness,
            x = result.brightest_point.map(|p| p.x),
            y = result.brightest_point.map(|p| p.y),
            assist = settings.flashlight_assist,
            "Light detected, starting capture"
        );

        self.session.begin_processing();
        self.assist = settings.flashlight_assist;

        let deadline = if self.assist {
            self.illumination
                .set_illumination(true, self.source.is_active());
            self.session.flashlight_on = self.illumination.is_on();
            now + self.timing.settle_delay
        } else {
            now
        };
        self.state = SequencerState::Preparing { deadline };
        self.publish();

        TickOutcome::Triggered(result)
    }

    /// Advance past the pending timer
    ///
    /// Called once [`deadline`](Self::deadline) has passed. From `Preparing`
    /// this runs the whole capture and enters the cooldown; from `Cooldown`
    /// it re-arms detection.
    pub async fn on_timer(&mut self) {
        if self.stopped {
            return;
        }
        match self.state {
            SequencerState::Preparing { .. } => {
                self.state = SequencerState::Capturing;
                self.capture().await;

                let deadline = Instant::now() + self.timing.cooldown_delay;
                debug!(cooldown_ms = self.timing.cooldown_delay.as_millis() as u64, "Cooling down");
                self.state = SequencerState::Cooldown { deadline };
                self.publish();
            }
            SequencerState::Cooldown { .. } => {
                self.state = SequencerState::Idle;
                self.session.finish_processing();
                self.publish();
                debug!("Detection re-armed");
            }
            SequencerState::Idle | SequencerState::Capturing => {}
        }
    }

    /// Snapshot, light off, encode, hand off
    async fn capture(&mut self) {
        if !self.source.is_active() {
            debug!("Stream released before capture, skipping");
            return;
        }

        let snapshot = PhotoCapture::snapshot(&mut self.source);
        let captured_at = chrono::Utc::now();

        if self.assist {
            self.illumination
                .set_illumination(false, self.source.is_active());
            self.session.flashlight_on = self.illumination.is_on();
        }

        let frame = match snapshot {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Snapshot failed");
                self.notifier.notify(Notice::capture_failed(&e));
                return;
            }
        };

        let sequence = self.session.next_sequence();
        let image = match self.pipeline.encode_frame(frame, sequence, captured_at).await {
            Ok(image) => image,
            Err(e) => {
                error!(error = %e, sequence, "Encoding failed");
                self.notifier.notify(Notice::capture_failed(&e));
                return;
            }
        };

        self.sink.image_captured(&image);
        self.session.capture_count = sequence;
        self.publish();

        let file_name = image.file_name();
        match self.sink.persist(image).await {
            Ok(path) => {
                info!(path = %path.display(), sequence, "Image captured");
                self.notifier.notify(Notice::image_captured(&file_name));
            }
            Err(e) => {
                error!(error = %e, file = %file_name, "Failed to save capture");
                self.notifier.notify(Notice::capture_failed(&e));
            }
        }
    }

    /// Drive the sequencer until `shutdown` resolves or the ticks end
    ///
    /// Ticks that arrive while a sequence is in flight are consumed and
    /// dropped. The stream is released on exit.
    pub async fn run<Ticks, Shutdown>(&mut self, mut ticks: Ticks, shutdown: Shutdown)
    where
        Ticks: TickSource,
        Shutdown: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Detection loop started");

        loop {
            let deadline = self.deadline();
            let timer = async move {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    debug!("Shutdown requested");
                    break;
                }
                _ = timer => self.on_timer().await,
                tick = ticks.next() => match tick {
                    Some(now) => {
                        self.on_tick(now);
                    }
                    None => {
                        debug!("Tick source ended");
                        break;
                    }
                },
            }
        }

        self.shutdown();
        info!(captures = self.session.capture_count, "Detection loop stopped");
    }

    /// Tear down: light off, release the stream, stop reacting
    ///
    /// Pending delays are abandoned. Calling this twice is harmless.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }

        if self.illumination.is_on()
            && !self
                .illumination
                .set_illumination(false, self.source.is_active())
                .is_applied()
        {
            warn!("Flashlight may still be on after teardown");
        }

        self.source.release();
        self.stopped = true;
        self.state = SequencerState::Idle;
        self.session.is_active = false;
        self.session.is_processing = false;
        self.session.flashlight_on = self.illumination.is_on();
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::CameraFrame;
    use crate::errors::{IlluminationError, PhotoError};
    use crate::flash::{NoIllumination, TrackCapabilities};
    use crate::pipelines::photo::CapturedImage;
    use std::path::PathBuf;

    struct StaticSource {
        frame: Option<CameraFrame>,
        active: bool,
    }

    impl StaticSource {
        fn bright() -> Self {
            let mut data = vec![10u8; 8 * 8 * 4];
            data[..4].copy_from_slice(&[250, 250, 250, 255]);
            Self {
                frame: Some(CameraFrame::from_rgba(8, 8, data)),
                active: true,
            }
        }

        fn dark() -> Self {
            Self {
                frame: Some(CameraFrame::from_rgba(8, 8, vec![0u8; 8 * 8 * 4])),
                active: true,
            }
        }
    }

    impl FrameSource for StaticSource {
        fn latest_frame(&mut self) -> Option<CameraFrame> {
            if self.active { self.frame.clone() } else { None }
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn release(&mut self) {
            self.active = false;
            self.frame = None;
        }
    }

    #[derive(Default)]
    struct MemorySink {
        captured: Vec<u64>,
        fail: bool,
    }

    impl CaptureSink for MemorySink {
        fn image_captured(&mut self, image: &CapturedImage) {
            self.captured.push(image.sequence);
        }

        async fn persist(&mut self, image: CapturedImage) -> Result<PathBuf, PhotoError> {
            if self.fail {
                return Err(PhotoError::SaveFailed("disk full".into()));
            }
            Ok(PathBuf::from(image.file_name()))
        }
    }

    struct Torch;

    impl IlluminationTrack for Torch {
        fn capabilities(&self) -> TrackCapabilities {
            TrackCapabilities {
                supports_illumination: true,
            }
        }

        fn set_illumination(&mut self, _on: bool) -> Result<(), IlluminationError> {
            Ok(())
        }
    }

    fn settings(assist: bool) -> watch::Receiver<DetectionSettings> {
        let (tx, rx) = watch::channel(DetectionSettings {
            flashlight_assist: assist,
            ..Default::default()
        });
        // Keep the last value readable after the sender is gone
        drop(tx);
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn test_dark_frame_stays_idle() {
        let mut seq = CaptureSequencer::new(
            StaticSource::dark(),
            NoIllumination,
            MemorySink::default(),
            settings(false),
            Notifier::disabled(),
        );
        assert!(matches!(seq.on_tick(Instant::now()), TickOutcome::Analyzed(r) if !r.detected));
        assert_eq!(seq.state(), SequencerState::Idle);
        assert!(seq.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_assist_captures_on_next_timer() {
        let now = Instant::now();
        let mut seq = CaptureSequencer::new(
            StaticSource::bright(),
            Torch,
            MemorySink::default(),
            settings(false),
            Notifier::disabled(),
        );

        assert!(matches!(seq.on_tick(now), TickOutcome::Triggered(_)));
        assert_eq!(seq.deadline(), Some(now));
        assert!(!seq.session().flashlight_on);

        seq.on_timer().await;
        assert_eq!(seq.sink().captured, vec![1]);
        assert!(matches!(seq.state(), SequencerState::Cooldown { .. }));

        seq.on_timer().await;
        assert_eq!(seq.state(), SequencerState::Idle);
        assert!(seq.session().is_active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_ignored_while_processing() {
        let now = Instant::now();
        let mut seq = CaptureSequencer::new(
            StaticSource::bright(),
            Torch,
            MemorySink::default(),
            settings(true),
            Notifier::disabled(),
        );

        assert!(matches!(seq.on_tick(now), TickOutcome::Triggered(_)));
        assert!(seq.session().flashlight_on);
        for step in 1..30 {
            let later = now + Duration::from_millis(step * 150);
            assert_eq!(seq.on_tick(later), TickOutcome::Ignored);
        }
        assert!(seq.sink().captured.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_persist_failure_still_counts_and_cools_down() {
        let (notifier, mut notices) = Notifier::channel();
        let mut seq = CaptureSequencer::new(
            StaticSource::bright(),
            NoIllumination,
            MemorySink {
                fail: true,
                ..Default::default()
            },
            settings(false),
            notifier,
        );

        seq.on_tick(Instant::now());
        seq.on_timer().await;

        assert_eq!(seq.session().capture_count, 1);
        assert!(matches!(seq.state(), SequencerState::Cooldown { .. }));
        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.kind, crate::notifications::NoticeKind::CaptureFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_is_idempotent() {
        let mut seq = CaptureSequencer::new(
            StaticSource::bright(),
            Torch,
            MemorySink::default(),
            settings(true),
            Notifier::disabled(),
        );
        seq.on_tick(Instant::now());
        seq.shutdown();
        seq.shutdown();

        assert!(seq.is_stopped());
        assert!(!seq.session().flashlight_on);
        assert_eq!(seq.on_tick(Instant::now()), TickOutcome::Stopped);
        seq.on_timer().await;
        assert!(seq.sink().captured.is_empty());
    }
}
