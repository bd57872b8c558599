//! The periodic recompute cycle and the global preview offset.
//!
//! Each pass walks the visible entries in display order, computes a
//! [`ClockFace`] for each from the [`TimeSource`], and hands it to the
//! [`RenderSink`]. A failing entry is logged and skipped; the rest of the
//! pass still runs.
//!
//! The trigger is a [`tokio::time::Interval`] owned by the ticker. It is
//! polled by whoever drives the app (see [`ClockTicker::wait`]), so passes
//! never overlap and need no locking.

use std::time::Duration;

use serde::Serialize;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use worldclock_types::{ClockFace, TimezoneEntry};

use crate::clock::TimeSource;
use crate::sink::RenderSink;

/// Errors that can occur while configuring the ticker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickerError {
    /// The tick period is unusable.
    #[error("invalid ticker config: {reason}")]
    InvalidConfig {
        /// Why the period was rejected.
        reason: String,
    },
}

/// Signed hours added to the real instant for previewing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GlobalOffset(i32);

impl GlobalOffset {
    /// No shift: real time.
    pub const ZERO: Self = Self(0);

    /// An offset of `hours`.
    pub const fn new(hours: i32) -> Self {
        Self(hours)
    }

    /// The offset in hours.
    pub const fn hours(self) -> i32 {
        self.0
    }

    /// Whether this is real time.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Apply a rewind/forward/reset step. `0` resets; anything else is added
    /// with saturation.
    #[must_use]
    pub const fn shifted(self, delta: i32) -> Self {
        if delta == 0 {
            Self::ZERO
        } else {
            Self(self.0.saturating_add(delta))
        }
    }

    /// `"current time"`, `"+1 hour"`, `"-3 hours"`.
    pub fn describe(self) -> String {
        match self.0 {
            0 => "current time".to_owned(),
            1 | -1 => format!("{:+} hour", self.0),
            h => format!("{h:+} hours"),
        }
    }
}

impl core::fmt::Display for GlobalOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:+}h", self.0)
    }
}

/// Summary of one recompute pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Pass number, starting at 1.
    pub pass: u64,
    /// Offset in effect during the pass.
    pub offset: GlobalOffset,
    /// Faces handed to the sink.
    pub rendered: usize,
    /// Entries skipped because their time could not be computed.
    pub failed: usize,
}

/// Drives periodic recompute passes and holds the preview offset.
#[derive(Debug)]
pub struct ClockTicker {
    period: Duration,
    interval: Option<Interval>,
    offset: GlobalOffset,
    passes: u64,
}

impl ClockTicker {
    /// Create a stopped ticker firing every `period_ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`TickerError::InvalidConfig`] if `period_ms` is zero.
    pub fn new(period_ms: u64) -> Result<Self, TickerError> {
        if period_ms == 0 {
            return Err(TickerError::InvalidConfig {
                reason: "tick period must be positive".to_owned(),
            });
        }
        Ok(Self {
            period: Duration::from_millis(period_ms),
            interval: None,
            offset: GlobalOffset::ZERO,
            passes: 0,
        })
    }

    /// Time between triggers.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Current preview offset.
    pub const fn offset(&self) -> GlobalOffset {
        self.offset
    }

    /// Number of passes run so far.
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Whether the trigger is armed.
    pub const fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Arm the trigger. The first tick fires one period from now; missed
    /// ticks are skipped rather than replayed. Calling this while running
    /// restarts the schedule.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        let now = Instant::now();
        let first = now.checked_add(self.period).unwrap_or(now);
        let mut interval = tokio::time::interval_at(first, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
        info!(period = ?self.period, "clock ticker started");
    }

    /// Disarm the trigger. Idempotent.
    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            info!(passes = self.passes, "clock ticker stopped");
        }
    }

    /// Wait for the next trigger. Pends forever while stopped, so it can sit
    /// in a `select!` next to other event sources.
    pub async fn wait(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Recompute and render every entry in `entries`, in order.
    pub fn run_pass<'a>(
        &mut self,
        time: &TimeSource,
        entries: impl IntoIterator<Item = &'a TimezoneEntry>,
        sink: &mut dyn RenderSink,
    ) -> TickSummary {
        self.passes = self.passes.saturating_add(1);
        let offset = self.offset;
        let mut rendered: usize = 0;
        let mut failed: usize = 0;

        for entry in entries {
            match time.reading(&entry.timezone_name, offset.hours()) {
                Ok(reading) => {
                    let face = ClockFace::new(
                        entry.id.clone(),
                        reading.date,
                        reading.time,
                        reading.utc_offset_label(),
                    );
                    sink.render_face(&face);
                    rendered = rendered.saturating_add(1);
                }
                Err(e) => {
                    warn!(
                        id = %entry.id,
                        zone = %entry.timezone_name,
                        error = %e,
                        "skipping entry for this pass"
                    );
                    failed = failed.saturating_add(1);
                }
            }
        }

        debug!(pass = self.passes, offset = offset.hours(), rendered, failed, "pass complete");
        TickSummary {
            pass: self.passes,
            offset,
            rendered,
            failed,
        }
    }

    /// Set the offset to `hours`, notify the sink, and run a pass at once.
    pub fn set_offset<'a>(
        &mut self,
        hours: i32,
        time: &TimeSource,
        entries: impl IntoIterator<Item = &'a TimezoneEntry>,
        sink: &mut dyn RenderSink,
    ) -> TickSummary {
        self.apply_offset(GlobalOffset::new(hours), sink);
        self.run_pass(time, entries, sink)
    }

    /// Rewind (`-1`), forward (`+1`) or reset (`0`), then run a pass at once.
    pub fn shift_offset<'a>(
        &mut self,
        delta: i32,
        time: &TimeSource,
        entries: impl IntoIterator<Item = &'a TimezoneEntry>,
        sink: &mut dyn RenderSink,
    ) -> TickSummary {
        self.apply_offset(self.offset.shifted(delta), sink);
        self.run_pass(time, entries, sink)
    }

    fn apply_offset(&mut self, offset: GlobalOffset, sink: &mut dyn RenderSink) {
        self.offset = offset;
        info!(offset = offset.hours(), showing = %offset.describe(), "offset changed");
        sink.offset_changed(offset);
    }
}
