//! Progress and timing observation
//!
//! The core never logs progress itself; it reports to a [`RunObserver`] handed
//! in by the caller, one observer per run.

use std::fmt;
use std::time::Duration;

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Scanning both inputs and building their key indexes.
    Indexing,
    Matching,
    OnlyInLeft,
    OnlyInRight,
    /// Writing the report file.
    Saving,
    /// Whole run, reported once at the end.
    Total,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Indexing => "indexing",
            Stage::Matching => "matching keys",
            Stage::OnlyInLeft => "keys only in file1",
            Stage::OnlyInRight => "keys only in file2",
            Stage::Saving => "saving report",
            Stage::Total => "total",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait RunObserver {
    /// `count` items of `stage` have been processed so far.
    fn on_progress(&mut self, stage: Stage, count: u64);

    /// `stage` finished after `elapsed`.
    fn on_timing(&mut self, stage: Stage, elapsed: Duration);
}

impl<O: RunObserver + ?Sized> RunObserver for &mut O {
    fn on_progress(&mut self, stage: Stage, count: u64) {
        (**self).on_progress(stage, count)
    }

    fn on_timing(&mut self, stage: Stage, elapsed: Duration) {
        (**self).on_timing(stage, elapsed)
    }
}

/// Forwards observations to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn on_progress(&mut self, stage: Stage, count: u64) {
        info!(stage = %stage, count, "progress");
    }

    fn on_timing(&mut self, stage: Stage, elapsed: Duration) {
        info!(stage = %stage, seconds = elapsed.as_secs_f64(), "stage finished");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_progress(&mut self, _stage: Stage, _count: u64) {}

    fn on_timing(&mut self, _stage: Stage, _elapsed: Duration) {}
}

/// True when `count` lands on a progress boundary. An interval of 0 disables
/// periodic reports.
pub(crate) fn is_progress_tick(count: u64, interval: u64) -> bool {
    interval > 0 && count % interval == 0
}
