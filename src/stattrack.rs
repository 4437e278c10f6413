use crate::engine::{SimulationStep, SimulationTrace};
use crate::policy::Policy;
use serde::Serialize;
use std::ops::{Add, AddAssign};

/// Hit and miss counters accumulated over a prefix of a trace. The counters are always derived
/// from the trace and a cursor, never maintained independently of them.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Serialize)]
pub struct RunningStatistics {
    pub hits: usize,
    pub misses: usize,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self { hits: 0, misses: 0 }
    }

    pub fn record(&mut self, step: &SimulationStep) {
        match step.is_hit() {
            true => self.hits += 1,
            false => self.misses += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.hits + self.misses
    }

    /// Share of references which faulted, as a percentage. Zero when nothing was observed.
    pub fn fault_ratio(&self) -> f64 {
        percentage(self.misses, self.total())
    }

    pub fn hit_ratio(&self) -> f64 {
        percentage(self.hits, self.total())
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    match whole {
        0 => 0.0,
        _ => part as f64 / whole as f64 * 100.0,
    }
}

impl Add<RunningStatistics> for RunningStatistics {
    type Output = RunningStatistics;

    fn add(self, rhs: RunningStatistics) -> Self::Output {
        Self::Output {
            hits: self.hits + rhs.hits,
            misses: self.misses + rhs.misses,
        }
    }
}

impl AddAssign for RunningStatistics {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.add(rhs)
    }
}

impl std::fmt::Display for RunningStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits: {}  misses: {}  fault ratio: {:.2}%",
            self.hits,
            self.misses,
            self.fault_ratio()
        )
    }
}

/// Count hits and misses over the closed prefix `[0, cursor]` of `trace`. A `None` cursor means
/// playback has not started and yields zero for both counters. A cursor past the last step is
/// clamped to it, so the counters never exceed the trace length.
///
/// # Examples
///
/// ```
/// use page_replacement_sim::engine::simulate;
/// use page_replacement_sim::policy::Policy;
/// use page_replacement_sim::reference::ReferenceSequence;
/// use page_replacement_sim::stattrack::stats;
///
/// let trace = simulate(Policy::Lru, &ReferenceSequence::parse("1 1 2"), 2);
/// let counted = stats(&trace, Some(1));
/// assert_eq!((counted.hits, counted.misses), (1, 1));
/// ```
pub fn stats(trace: &SimulationTrace, cursor: Option<usize>) -> RunningStatistics {
    let mut statistics = RunningStatistics::new();
    if let Some(cursor) = clamp(trace, cursor) {
        trace
            .iter()
            .take(cursor + 1)
            .for_each(|step| statistics.record(step));
    }
    statistics
}

/// `cursor` limited to the last index of `trace`; always `None` for an empty trace.
fn clamp(trace: &SimulationTrace, cursor: Option<usize>) -> Option<usize> {
    let last = trace.last_index()?;
    cursor.map(|cursor| cursor.min(last))
}

/// Incremental cache of the running statistics for a moving cursor. Forward movement only scans
/// the newly revealed steps; any backward movement recounts the prefix from scratch.
#[derive(Debug, Default, Clone)]
pub struct StatCache {
    cursor: Option<usize>,
    statistics: RunningStatistics,
}

impl StatCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything cached. Required whenever the observed trace is replaced.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.statistics = RunningStatistics::new();
    }

    /// Bring the cache in line with `cursor` over `trace` and return the statistics.
    pub fn update(&mut self, trace: &SimulationTrace, cursor: Option<usize>) -> RunningStatistics {
        let cursor = clamp(trace, cursor);
        match (self.cursor, cursor) {
            (_, None) => self.reset(),
            (Some(previous), Some(next)) if next >= previous => {
                trace
                    .iter()
                    .skip(previous + 1)
                    .take(next - previous)
                    .for_each(|step| self.statistics.record(step));
            }
            (None, Some(_)) | (Some(_), Some(_)) => {
                self.statistics = stats(trace, cursor);
            }
        }
        self.cursor = cursor;
        self.statistics
    }

    pub fn current(&self) -> RunningStatistics {
        self.statistics
    }
}

/// Whole-trace statistics for summary views.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct Summary {
    pub policy: Policy,
    pub capacity: usize,
    pub references: usize,
    pub hits: usize,
    pub faults: usize,
    pub hit_ratio: f64,
    pub fault_ratio: f64,
}

impl From<&SimulationTrace> for Summary {
    fn from(trace: &SimulationTrace) -> Self {
        let totals = stats(trace, trace.last_index());
        Self {
            policy: trace.policy(),
            capacity: trace.capacity(),
            references: trace.len(),
            hits: totals.hits,
            faults: totals.misses,
            hit_ratio: totals.hit_ratio(),
            fault_ratio: totals.fault_ratio(),
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "
Stats Tracked ({} algorithm with {} frames)
---------------------------------
references:              {:08}
page_hits:               {:08}
page_faults:             {:08}

hit ratio:               {:.2}%
page fault ratio:        {:.2}%
",
            self.policy,
            self.capacity,
            self.references,
            self.hits,
            self.faults,
            self.hit_ratio,
            self.fault_ratio,
        )
    }
}
