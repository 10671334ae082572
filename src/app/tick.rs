// SPDX-License-Identifier: GPL-3.0-only

//! Detection tick source
//!
//! Detection piggybacks on the host's refresh cadence: every refresh yields
//! a tick, and [`DetectionGate`] lets through only the ticks that arrive
//! more than the detection interval after the last one that ran. Anything
//! yielding [`Instant`]s can drive the sequencer, so tests feed ticks from
//! a channel on a paused clock.

use futures::stream::{BoxStream, Stream, StreamExt};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// A stream of tick instants
pub trait TickSource: Stream<Item = Instant> + Unpin + Send {}

impl<T> TickSource for T where T: Stream<Item = Instant> + Unpin + Send {}

/// Ticks at the host refresh cadence
///
/// Late ticks are skipped, never bunched up: only the latest refresh counts.
pub fn refresh_ticks(period: Duration) -> BoxStream<'static, Instant> {
    async_stream::stream! {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            yield interval.tick().await;
        }
    }
    .boxed()
}

/// Minimum-interval gate in front of the classifier
#[derive(Debug, Clone)]
pub struct DetectionGate {
    interval: Duration,
    last: Option<Instant>,
}

impl DetectionGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a tick at `now` should run detection
    ///
    /// The first tick always passes; afterwards more than `interval` must
    /// have elapsed since the last tick that passed.
    pub fn ready(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last
            && now.saturating_duration_since(last) <= self.interval
        {
            return false;
        }
        self.last = Some(now);
        true
    }
}
