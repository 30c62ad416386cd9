//! Scheduling of watch ticks.
//!
//! The watch loop never sleeps on its own. It asks a [`Ticker`] for the next
//! tick, which lets tests drive it with a finite, instant schedule.

use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};

/// Source of watch ticks.
#[allow(async_fn_in_trait)]
pub trait Ticker {
    /// Wait for the next tick. Returns `false` when the schedule is over.
    async fn tick(&mut self) -> bool;
}

/// Ticks forever at a fixed period, the first tick firing immediately.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// Create a ticker firing every `period`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval(period);
        // A slow tick delays the next one instead of causing a burst
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Fires a fixed number of ticks without waiting.
#[derive(Debug, Clone, Copy)]
pub struct CountedTicker {
    remaining: usize,
}

impl CountedTicker {
    /// Create a ticker that fires `ticks` times.
    pub fn new(ticks: usize) -> Self {
        Self { remaining: ticks }
    }

    /// A single tick.
    pub fn once() -> Self {
        Self::new(1)
    }
}

impl Ticker for CountedTicker {
    async fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
