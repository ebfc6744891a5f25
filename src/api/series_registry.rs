use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{SeriesBounds, SeriesDisplayOptions, SeriesHandle, SeriesId, TimeSeries};
use crate::error::ChartResult;

use super::{IntervalScheduler, TimerHandle};

struct RegisteredSeries {
    series: SeriesHandle,
    reset_timer: Option<TimerHandle>,
}

/// Series attached to a chart, in insertion order.
///
/// The registry owns the reset-bounds timer of each member: `remove`,
/// `clear` and dropping the registry cancel them.
pub struct SeriesRegistry {
    entries: IndexMap<SeriesId, RegisteredSeries>,
    timers: Box<dyn IntervalScheduler>,
}

impl SeriesRegistry {
    #[must_use]
    pub fn new(timers: Box<dyn IntervalScheduler>) -> Self {
        Self {
            entries: IndexMap::new(),
            timers,
        }
    }

    /// Attaches `series`, merging `options` into its style.
    ///
    /// Adding a member again only merges the options. Returns `true` when the
    /// series was newly attached.
    pub fn add(&mut self, series: &SeriesHandle, options: SeriesDisplayOptions) -> ChartResult<bool> {
        if self.entries.contains_key(&series.id()) {
            series.lock().apply_display_options(options)?;
            trace!(series = series.id().raw(), "series already attached");
            return Ok(false);
        }

        // The series is only touched once its timer exists.
        let (style, series_options) = {
            let guard = series.lock();
            (options.apply_to(guard.style()).validate()?, guard.options())
        };
        let reset_timer = if series_options.reset_bounds
            && !series_options.reset_bounds_interval.is_zero()
        {
            let target = series.clone();
            Some(self.timers.schedule_repeating(
                series_options.reset_bounds_interval,
                Box::new(move || target.reset_bounds()),
            )?)
        } else {
            None
        };
        series.lock().set_style(style)?;

        self.entries.insert(
            series.id(),
            RegisteredSeries {
                series: series.clone(),
                reset_timer,
            },
        );
        debug!(
            series = series.id().raw(),
            reset_timer = reset_timer.is_some(),
            count = self.entries.len(),
            "series attached"
        );
        Ok(true)
    }

    /// Detaches `series` and cancels its timer. Returns `true` when it was a member.
    pub fn remove(&mut self, series: &SeriesHandle) -> bool {
        let Some(entry) = self.entries.shift_remove(&series.id()) else {
            return false;
        };
        if let Some(timer) = entry.reset_timer {
            self.timers.cancel(timer);
        }
        debug!(
            series = series.id().raw(),
            count = self.entries.len(),
            "series detached"
        );
        true
    }

    pub fn clear(&mut self) {
        for (_, entry) in self.entries.drain(..) {
            if let Some(timer) = entry.reset_timer {
                self.timers.cancel(timer);
            }
        }
    }

    #[must_use]
    pub fn contains(&self, series: &SeriesHandle) -> bool {
        self.entries.contains_key(&series.id())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesHandle> {
        self.entries.values().map(|entry| &entry.series)
    }

    #[must_use]
    pub fn reset_timer(&self, series: &SeriesHandle) -> Option<TimerHandle> {
        self.entries
            .get(&series.id())
            .and_then(|entry| entry.reset_timer)
    }

    /// Visits enabled series in insertion order with the series locked.
    pub fn for_each_drawable<F>(&self, mut visit: F) -> ChartResult<()>
    where
        F: FnMut(SeriesId, &mut TimeSeries) -> ChartResult<()>,
    {
        for (id, entry) in &self.entries {
            let mut series = entry.series.lock();
            if series.is_disabled() {
                continue;
            }
            visit(*id, &mut *series)?;
        }
        Ok(())
    }

    /// Bounds of every enabled series, read now.
    #[must_use]
    pub fn enabled_bounds(&self) -> SmallVec<[SeriesBounds; 4]> {
        self.entries
            .values()
            .filter_map(|entry| {
                let series = entry.series.lock();
                (!series.is_disabled()).then_some(series.bounds())
            })
            .collect()
    }

    /// Prunes every member, enabled or not. Returns the samples removed.
    pub fn prune(&self, oldest_valid_time: f64, max_data_set_length: usize) -> usize {
        self.entries
            .values()
            .map(|entry| {
                entry
                    .series
                    .lock()
                    .remove_old_data(oldest_valid_time, max_data_set_length)
            })
            .sum()
    }

    /// Newest timestamp across all members.
    #[must_use]
    pub fn latest_time(&self) -> Option<i64> {
        self.entries
            .values()
            .filter_map(|entry| entry.series.lock().latest_time())
            .max()
    }
}

impl fmt::Debug for SeriesRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesRegistry")
            .field("series", &self.entries.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Drop for SeriesRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}
