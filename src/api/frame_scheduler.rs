use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Handle of one requested paint tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickHandle(u64);

impl TickHandle {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// External source of paint opportunities.
///
/// `request_tick` asks for one callback at the next paint opportunity; the
/// host then calls `StreamingChart::on_tick` with the returned handle.
pub trait TickSource {
    fn request_tick(&mut self) -> TickHandle;
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// Tick source for headless hosts and tests.
///
/// It only records the outstanding request; the host decides when it fires.
#[derive(Debug, Default)]
pub struct ManualTickSource {
    next_raw: u64,
    pending: Option<TickHandle>,
    requested: usize,
    cancelled: usize,
}

impl ManualTickSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    #[must_use]
    pub fn requested_count(&self) -> usize {
        self.requested
    }

    #[must_use]
    pub fn cancelled_count(&self) -> usize {
        self.cancelled
    }
}

impl TickSource for ManualTickSource {
    fn request_tick(&mut self) -> TickHandle {
        self.next_raw += 1;
        let handle = TickHandle(self.next_raw);
        self.pending = Some(handle);
        self.requested += 1;
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Wall clock read once per tick, in unix milliseconds.
pub trait Clock {
    fn now_millis(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        Utc::now().timestamp_millis() as f64
    }
}

/// Settable clock; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(now_millis: f64) -> Self {
        let clock = Self::default();
        clock.set(now_millis);
        clock
    }

    pub fn set(&self, now_millis: f64) {
        self.bits.store(now_millis.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, by_millis: f64) {
        self.set(self.now_millis() + by_millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

/// Frame-rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameThrottle {
    frame_time_ms: f64,
    last_render_time: Option<f64>,
}

impl FrameThrottle {
    #[must_use]
    pub fn new(frame_time_ms: f64) -> Self {
        Self {
            frame_time_ms,
            last_render_time: None,
        }
    }

    #[must_use]
    pub fn frame_time_ms(&self) -> f64 {
        self.frame_time_ms
    }

    #[must_use]
    pub fn last_render_time(&self) -> Option<f64> {
        self.last_render_time
    }

    /// Admits a paint at `now` unless the previous admitted paint is less
    /// than one frame time ago. Only admitted paints move the reference time.
    pub fn admit(&mut self, now: f64) -> bool {
        if self.frame_time_ms > 0.0
            && self
                .last_render_time
                .is_some_and(|last| now - last < self.frame_time_ms)
        {
            return false;
        }
        self.last_render_time = Some(now);
        true
    }

    /// Forgets the last admitted paint; the next `admit` always succeeds.
    pub fn reset(&mut self) {
        self.last_render_time = None;
    }
}

/// Maps replayed data onto the wall clock through a latched offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NonRealtimeAlignment {
    offset: Option<f64>,
}

impl NonRealtimeAlignment {
    #[must_use]
    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    /// Chart time for `wall_clock`.
    ///
    /// The offset between the wall clock and `latest_data_time` is latched the
    /// first time data is seen; until then the wall clock is used directly.
    pub fn chart_time(&mut self, wall_clock: f64, delay: f64, latest_data_time: Option<i64>) -> f64 {
        if self.offset.is_none() {
            if let Some(latest) = latest_data_time {
                let offset = wall_clock - latest as f64;
                debug!(offset_ms = offset, "latched non-realtime offset");
                self.offset = Some(offset);
            }
        }
        wall_clock - self.offset.unwrap_or(0.0) - delay
    }

    pub fn reset(&mut self) {
        self.offset = None;
    }
}

/// Lifecycle of the repaint loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    Idle,
    Scheduled(TickHandle),
    Rendering { stop_requested: bool },
}

/// Drives the repaint loop over a [`TickSource`].
///
/// At most one tick is outstanding. `stop` is honored from any state; inside
/// a render pass it takes effect when the pass finishes.
#[derive(Debug)]
pub struct FrameScheduler<T: TickSource> {
    source: T,
    state: SchedulerState,
    throttle: FrameThrottle,
    alignment: NonRealtimeAlignment,
}

impl<T: TickSource> FrameScheduler<T> {
    #[must_use]
    pub fn new(source: T, frame_time_ms: f64) -> Self {
        Self {
            source,
            state: SchedulerState::Idle,
            throttle: FrameThrottle::new(frame_time_ms),
            alignment: NonRealtimeAlignment::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        match self.state {
            SchedulerState::Idle => false,
            SchedulerState::Scheduled(_) => true,
            SchedulerState::Rendering { stop_requested } => !stop_requested,
        }
    }

    #[must_use]
    pub fn pending_tick(&self) -> Option<TickHandle> {
        match self.state {
            SchedulerState::Scheduled(handle) => Some(handle),
            _ => None,
        }
    }

    /// Requests the first tick. Returns `false` when already running.
    pub fn start(&mut self) -> bool {
        match self.state {
            SchedulerState::Idle => {
                let handle = self.source.request_tick();
                self.state = SchedulerState::Scheduled(handle);
                debug!(tick = handle.raw(), "frame scheduler started");
                true
            }
            SchedulerState::Rendering {
                stop_requested: true,
            } => {
                self.state = SchedulerState::Rendering {
                    stop_requested: false,
                };
                true
            }
            _ => false,
        }
    }

    /// Cancels the pending tick and resets the throttle and the alignment
    /// offset. Returns `false` when the loop was not running.
    pub fn stop(&mut self) -> bool {
        self.alignment.reset();
        self.throttle.reset();
        match self.state {
            SchedulerState::Idle => false,
            SchedulerState::Scheduled(handle) => {
                self.source.cancel_tick(handle);
                self.state = SchedulerState::Idle;
                debug!(tick = handle.raw(), "frame scheduler stopped");
                true
            }
            SchedulerState::Rendering { stop_requested } => {
                self.state = SchedulerState::Rendering {
                    stop_requested: true,
                };
                debug!("frame scheduler stop requested during render");
                !stop_requested
            }
        }
    }

    /// Enters `Rendering` when `handle` is the outstanding tick. Stale or
    /// foreign handles are ignored and return `false`.
    pub fn begin_tick(&mut self, handle: TickHandle) -> bool {
        if self.state != SchedulerState::Scheduled(handle) {
            trace!(tick = handle.raw(), state = ?self.state, "ignoring stale tick");
            return false;
        }
        self.state = SchedulerState::Rendering {
            stop_requested: false,
        };
        true
    }

    /// Leaves `Rendering`, requesting the next tick unless a stop arrived
    /// during the pass. Returns `true` when the loop continues.
    pub fn finish_tick(&mut self) -> bool {
        let SchedulerState::Rendering { stop_requested } = self.state else {
            return self.is_running();
        };
        if stop_requested {
            self.state = SchedulerState::Idle;
            debug!("frame scheduler stopped after render");
            return false;
        }
        let handle = self.source.request_tick();
        self.state = SchedulerState::Scheduled(handle);
        true
    }

    pub fn admit(&mut self, now: f64) -> bool {
        self.throttle.admit(now)
    }

    #[must_use]
    pub fn throttle(&self) -> FrameThrottle {
        self.throttle
    }

    #[must_use]
    pub fn alignment(&self) -> NonRealtimeAlignment {
        self.alignment
    }

    pub fn alignment_mut(&mut self) -> &mut NonRealtimeAlignment {
        &mut self.alignment
    }

    #[must_use]
    pub fn source(&self) -> &T {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut T {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameThrottle, NonRealtimeAlignment};

    #[test]
    fn unthrottled_admits_every_paint() {
        let mut throttle = FrameThrottle::new(0.0);
        assert!(throttle.admit(0.0));
        assert!(throttle.admit(0.0));
        assert!(throttle.admit(1.0));
    }

    #[test]
    fn alignment_latches_first_observed_data() {
        let mut alignment = NonRealtimeAlignment::default();
        assert_eq!(alignment.chart_time(10_000.0, 0.0, None), 10_000.0);

        assert_eq!(alignment.chart_time(10_000.0, 500.0, Some(4_000)), 3_500.0);
        assert_eq!(alignment.offset(), Some(6_000.0));

        // Newer data does not move the latched offset.
        assert_eq!(alignment.chart_time(11_000.0, 500.0, Some(9_000)), 4_500.0);

        alignment.reset();
        assert_eq!(alignment.offset(), None);
    }
}
