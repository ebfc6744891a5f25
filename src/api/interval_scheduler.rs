use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{ChartError, ChartResult};

/// Task run on every firing of a repeating timer.
pub type IntervalTask = Box<dyn FnMut() + Send + 'static>;

/// Handle of a repeating timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Source of repeating timers, independent of the paint tick.
pub trait IntervalScheduler {
    fn schedule_repeating(
        &mut self,
        interval: Duration,
        task: IntervalTask,
    ) -> ChartResult<TimerHandle>;

    /// Cancels a timer; unknown handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

fn validate_interval(interval: Duration) -> ChartResult<()> {
    if interval.is_zero() {
        return Err(ChartError::InvalidData(
            "timer interval must be > 0".to_owned(),
        ));
    }
    Ok(())
}

struct ThreadTimer {
    cancelled: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Runs each repeating timer on its own thread.
///
/// Timer threads park between firings. `cancel` unparks the thread and joins
/// it, so a cancelled task never runs again once `cancel` returns. A firing
/// already in progress finishes first.
#[derive(Default)]
pub struct ThreadIntervalScheduler {
    next_raw: u64,
    timers: IndexMap<TimerHandle, ThreadTimer>,
}

impl ThreadIntervalScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl fmt::Debug for ThreadIntervalScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadIntervalScheduler")
            .field("active", &self.timers.len())
            .finish()
    }
}

impl IntervalScheduler for ThreadIntervalScheduler {
    fn schedule_repeating(
        &mut self,
        interval: Duration,
        mut task: IntervalTask,
    ) -> ChartResult<TimerHandle> {
        validate_interval(interval)?;
        self.next_raw += 1;
        let handle = TimerHandle(self.next_raw);

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let thread = thread::Builder::new()
            .name(format!("stream-chart-timer-{}", handle.raw()))
            .spawn(move || {
                let mut next_fire = Instant::now() + interval;
                loop {
                    if flag.load(Ordering::Acquire) {
                        return;
                    }
                    let now = Instant::now();
                    if now >= next_fire {
                        if flag.load(Ordering::Acquire) {
                            return;
                        }
                        task();
                        next_fire = Instant::now() + interval;
                    } else {
                        thread::park_timeout(next_fire - now);
                    }
                }
            })
            .map_err(|e| ChartError::Backend(format!("failed to spawn timer thread: {e}")))?;

        debug!(timer = handle.raw(), interval_ms = interval.as_millis() as u64, "timer scheduled");
        self.timers.insert(handle, ThreadTimer { cancelled, thread });
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(timer) = self.timers.shift_remove(&handle) {
            timer.cancelled.store(true, Ordering::Release);
            timer.thread.thread().unpark();
            // A task cancelling its own timer cannot wait for itself.
            if timer.thread.thread().id() != thread::current().id()
                && timer.thread.join().is_err()
            {
                warn!(timer = handle.raw(), "timer task panicked");
            }
            debug!(timer = handle.raw(), "timer cancelled");
        }
    }
}

impl Drop for ThreadIntervalScheduler {
    fn drop(&mut self) {
        let handles: Vec<TimerHandle> = self.timers.keys().copied().collect();
        for handle in handles {
            self.cancel(handle);
        }
    }
}

struct ManualTimer {
    interval: Duration,
    next_due: Duration,
    task: IntervalTask,
}

#[derive(Default)]
struct ManualTimers {
    elapsed: Duration,
    next_raw: u64,
    timers: IndexMap<TimerHandle, ManualTimer>,
}

/// Deterministic timers fired by [`ManualIntervalScheduler::advance`].
///
/// Clones share state, so a test can keep one clone while a chart owns
/// another.
#[derive(Clone, Default)]
pub struct ManualIntervalScheduler {
    inner: Arc<Mutex<ManualTimers>>,
}

impl ManualIntervalScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn timers(&self) -> MutexGuard<'_, ManualTimers> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advances the timer clock and runs every task that came due, once per
    /// elapsed interval. Returns the number of task runs.
    pub fn advance(&self, by: Duration) -> usize {
        let mut state = self.timers();
        state.elapsed += by;
        let elapsed = state.elapsed;

        let mut fired = 0;
        for timer in state.timers.values_mut() {
            while timer.next_due <= elapsed {
                (timer.task)();
                timer.next_due += timer.interval;
                fired += 1;
            }
        }
        trace!(elapsed_ms = elapsed.as_millis() as u64, fired, "manual timers advanced");
        fired
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.timers().timers.len()
    }

    #[must_use]
    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers().timers.contains_key(&handle)
    }
}

impl fmt::Debug for ManualIntervalScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.timers();
        f.debug_struct("ManualIntervalScheduler")
            .field("elapsed", &state.elapsed)
            .field("active", &state.timers.len())
            .finish()
    }
}

impl IntervalScheduler for ManualIntervalScheduler {
    fn schedule_repeating(
        &mut self,
        interval: Duration,
        task: IntervalTask,
    ) -> ChartResult<TimerHandle> {
        validate_interval(interval)?;
        let mut state = self.timers();
        state.next_raw += 1;
        let handle = TimerHandle(state.next_raw);
        let next_due = state.elapsed + interval;
        state.timers.insert(
            handle,
            ManualTimer {
                interval,
                next_due,
                task,
            },
        );
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers().timers.shift_remove(&handle);
    }
}
