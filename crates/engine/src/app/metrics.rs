use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LockResult, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::journey::JourneyCounters;

/// Loop pacing for the last closed window, plus what the journey did in it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    /// Totals since the last restart.
    pub journey: JourneyCounters,
    pub transitions_in_window: u64,
    pub wheel_drops_in_window: u64,
}

/// Shared read side for the overlay and embedders; the loop is the only writer.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    shared: Arc<SharedMetrics>,
}

#[derive(Debug, Default)]
struct SharedMetrics {
    latest: RwLock<LoopMetricsSnapshot>,
    poison_reported: AtomicBool,
}

impl SharedMetrics {
    fn recover<G>(&self, result: LockResult<G>, operation: &'static str) -> G {
        result.unwrap_or_else(|poisoned| {
            if !self.poison_reported.swap(true, Ordering::Relaxed) {
                warn!(operation, "metrics_lock_poisoned");
            }
            poisoned.into_inner()
        })
    }
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        *self.shared.recover(self.shared.latest.read(), "read")
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        *self.shared.recover(self.shared.latest.write(), "write") = snapshot;
    }
}

/// Counts frames and ticks until `interval` has passed, then closes the window.
#[derive(Debug)]
pub(crate) struct MetricsWindow {
    opened_at: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    frame_time_total: Duration,
    journey_at_open: JourneyCounters,
}

impl MetricsWindow {
    pub(crate) fn open(interval: Duration, now: Instant, journey: JourneyCounters) -> Self {
        Self {
            opened_at: now,
            interval,
            frames: 0,
            ticks: 0,
            frame_time_total: Duration::ZERO,
            journey_at_open: journey,
        }
    }

    pub(crate) fn sample_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_total = self.frame_time_total.saturating_add(frame_dt);
    }

    pub(crate) fn sample_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn close_if_elapsed(
        &mut self,
        now: Instant,
        journey: JourneyCounters,
    ) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.opened_at);
        if elapsed < self.interval {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_total.as_secs_f32() * 1000.0 / frames as f32,
        };
        // A restart resets the journey totals; count from zero in that case.
        let since_open = |now: u64, then: u64| now.checked_sub(then).unwrap_or(now);

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms,
            journey,
            transitions_in_window: since_open(
                journey.transitions,
                self.journey_at_open.transitions,
            ),
            wheel_drops_in_window: since_open(
                journey.dropped_wheel_events,
                self.journey_at_open.dropped_wheel_events,
            ),
        };
        *self = Self::open(self.interval, now, journey);
        Some(snapshot)
    }
}
