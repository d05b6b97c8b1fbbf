//! Per-tick reports and running totals.

use std::time::Duration;

use granule_core::PassStats;

/// What one call to [`crate::Simulation::step`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 0.
    pub tick: u64,
    /// Update pass counters.
    pub pass: PassStats,
    /// Cells written by brush strokes before the pass.
    pub painted: usize,
    /// Wall time of the whole tick.
    pub elapsed: Duration,
}

impl TickReport {
    /// Wall time in microseconds, saturating.
    #[inline]
    #[must_use]
    pub fn elapsed_us(&self) -> u64 {
        u64::try_from(self.elapsed.as_micros()).unwrap_or(u64::MAX)
    }
}

/// Running totals over many ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickStatsAccumulator {
    /// Ticks recorded.
    pub ticks_recorded: u64,
    /// Sum of tick times.
    pub total_us_sum: u64,
    /// Fastest tick.
    pub min_tick_us: u64,
    /// Slowest tick.
    pub max_tick_us: u64,
    /// Ticks slower than the budget.
    pub ticks_over_budget: u64,
    /// Cells moved across all ticks.
    pub moved_sum: u64,
    /// Cells painted across all ticks.
    pub painted_sum: u64,
}

impl TickStatsAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks_recorded: 0,
            total_us_sum: 0,
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            ticks_over_budget: 0,
            moved_sum: 0,
            painted_sum: 0,
        }
    }

    /// Records one tick, counting it as over budget if slower than `budget`.
    pub fn record(&mut self, report: &TickReport, budget: Duration) {
        let us = report.elapsed_us();
        self.ticks_recorded += 1;
        self.total_us_sum = self.total_us_sum.saturating_add(us);
        self.min_tick_us = self.min_tick_us.min(us);
        self.max_tick_us = self.max_tick_us.max(us);
        self.moved_sum = self.moved_sum.saturating_add(report.pass.moved as u64);
        self.painted_sum = self.painted_sum.saturating_add(report.painted as u64);

        if report.elapsed > budget {
            self.ticks_over_budget += 1;
        }
    }

    /// Average tick time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_tick_ms(&self) -> f64 {
        if self.ticks_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.ticks_recorded as f64) / 1000.0
    }

    /// Fraction of ticks over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.ticks_recorded == 0 {
            return 0.0;
        }
        self.ticks_over_budget as f64 / self.ticks_recorded as f64
    }
}

impl Default for TickStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
