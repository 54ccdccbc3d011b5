//! Debounced "background is ready" signal derived from loader counters.

use crate::constants::*;
use crate::keys::ActiveKey;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateTimings {
    /// Delay before reporting ready when there is nothing to load.
    pub empty_delay: f64,
    /// Delay after every asset has loaded, so the last uploads land first.
    pub settle_delay: f64,
    /// Upper bound on time-to-visible while loading stalls.
    pub fallback: f64,
}

impl Default for GateTimings {
    fn default() -> Self {
        Self {
            empty_delay: GATE_EMPTY_DELAY_SEC,
            settle_delay: GATE_SETTLE_DELAY_SEC,
            fallback: GATE_FALLBACK_SEC,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u32,
    pub total: u32,
}

impl LoadProgress {
    pub fn new(loaded: u32, total: u32) -> Self {
        Self { loaded, total }
    }
}

/// Polled once per frame with the active key, the loader counters and the
/// current time. Commits at most one ready decision per activation.
#[derive(Debug)]
pub struct ReadinessGate {
    timings: GateTimings,
    key: Option<ActiveKey>,
    progress: Option<LoadProgress>,
    settle_at: Option<f64>,
    fallback_at: Option<f64>,
    latched: bool,
    reported: Option<bool>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new(GateTimings::default())
    }
}

impl ReadinessGate {
    pub fn new(timings: GateTimings) -> Self {
        Self {
            timings,
            key: None,
            progress: None,
            settle_at: None,
            fallback_at: None,
            latched: false,
            reported: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.reported == Some(true)
    }

    /// Returns `Some(ready)` whenever the reported value changes.
    pub fn update(&mut self, key: ActiveKey, progress: LoadProgress, now: f64) -> Option<bool> {
        let mut event = None;

        if self.key != Some(key) {
            self.key = Some(key);
            self.progress = None;
            self.settle_at = None;
            self.fallback_at = None;
            self.latched = false;
            event = self.report(false);
        }

        if self.latched {
            return event;
        }

        if self.progress != Some(progress) {
            self.progress = Some(progress);
            // New counters supersede any settle that was about to fire.
            self.settle_at = None;
            if progress.total == 0 {
                self.settle_at = Some(now + self.timings.empty_delay);
            } else if progress.loaded >= progress.total {
                self.settle_at = Some(now + self.timings.settle_delay);
            } else {
                event = self.report(false).or(event);
                if self.fallback_at.is_none() {
                    self.fallback_at = Some(now + self.timings.fallback);
                }
            }
        }

        let due = |at: Option<f64>| at.is_some_and(|at| now >= at);
        if due(self.settle_at) || due(self.fallback_at) {
            if due(self.fallback_at) && !due(self.settle_at) {
                log::info!("readiness: fallback fired after {}s", self.timings.fallback);
            }
            self.latched = true;
            self.settle_at = None;
            self.fallback_at = None;
            event = self.report(true);
        }
        event
    }

    fn report(&mut self, ready: bool) -> Option<bool> {
        if self.reported == Some(ready) {
            return None;
        }
        self.reported = Some(ready);
        Some(ready)
    }
}
