use crate::engine::{SimulationStep, SimulationTrace};
use crate::error::PlaybackError;
use crate::stattrack::{RunningStatistics, StatCache};
use crate::{BASE_TICK, DEFAULT_SPEED};
use serde::Serialize;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Stand-in period for a deadline that would overflow the clock, roughly 136 years.
const FALLBACK_PERIOD: Duration = Duration::from_secs(u32::MAX as u64);

/// Playback modes. `Stopped` has no cursor, `Finished` sits on the last step of the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Stopped,
    Paused,
    Playing,
    Finished,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Stopped => "stopped",
            Mode::Paused => "paused",
            Mode::Playing => "playing",
            Mode::Finished => "finished",
        };
        write!(f, "{}", name)
    }
}

/// Snapshot of the controller for observers. A `None` cursor means playback has not started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub cursor: Option<usize>,
    pub mode: Mode,
    pub speed: f64,
}

/// Identifies one arming of the auto-play timer. Once the timer is disarmed, whether by a pause,
/// a reset, a speed change or a trace replacement, its handle goes stale for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Timer {
    handle: TimerHandle,
    period: Duration,
    due: Instant,
}

/// The `PlaybackController` walks a cursor forward over a shared, read-only trace either one
/// step at a time or under a cooperative auto-play timer. At most one timer is ever armed, and
/// every transition out of `Playing` disarms it before returning.
#[derive(Debug)]
pub struct PlaybackController {
    trace: Rc<SimulationTrace>,
    cursor: Option<usize>,
    mode: Mode,
    speed: f64,
    period: Duration,
    timer: Option<Timer>,
    generation: u64,
    statistics: StatCache,
}

impl PlaybackController {
    /// Create a stopped controller over `trace` at the default speed.
    pub fn new(trace: Rc<SimulationTrace>) -> Self {
        Self {
            trace,
            cursor: None,
            mode: Mode::Stopped,
            speed: DEFAULT_SPEED,
            period: BASE_TICK,
            timer: None,
            generation: 0,
            statistics: StatCache::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            cursor: self.cursor,
            mode: self.mode,
            speed: self.speed,
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn trace(&self) -> &SimulationTrace {
        &self.trace
    }

    /// The step under the cursor, if playback has started.
    pub fn current_step(&self) -> Option<&SimulationStep> {
        self.cursor.and_then(|cursor| self.trace.get(cursor))
    }

    /// Hits and misses over every step revealed so far.
    pub fn statistics(&self) -> RunningStatistics {
        self.statistics.current()
    }

    /// Handle of the armed timer, `None` unless playing.
    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer.as_ref().map(|timer| timer.handle)
    }

    /// Instant at which the armed timer next wants to tick.
    pub fn next_due(&self) -> Option<Instant> {
        self.timer.as_ref().map(|timer| timer.due)
    }

    /// Interval between two ticks at the current speed.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Begin or resume auto-play and return the handle of the armed timer.
    ///
    /// From `Stopped` or `Finished` the cursor restarts at the first step; from `Paused` it
    /// carries on where it was. Calling `start` while already playing keeps the existing timer.
    /// An empty trace cannot be played and a single-step trace finishes immediately; in both
    /// cases no timer is armed.
    pub fn start(&mut self) -> Option<TimerHandle> {
        let last = self.trace.last_index()?;
        match self.mode {
            Mode::Playing => self.timer(),
            Mode::Paused => {
                self.mode = Mode::Playing;
                Some(self.arm())
            }
            Mode::Stopped | Mode::Finished => {
                self.move_cursor(Some(0));
                if last == 0 {
                    self.disarm();
                    self.mode = Mode::Finished;
                    None
                } else {
                    self.mode = Mode::Playing;
                    Some(self.arm())
                }
            }
        }
    }

    /// Stop auto-play, leaving the cursor where it is.
    pub fn pause(&mut self) {
        if self.mode != Mode::Playing {
            return;
        }
        self.disarm();
        self.mode = match self.at_last() {
            true => Mode::Finished,
            false => Mode::Paused,
        };
    }

    /// Reveal exactly one more step. Only honoured while stopped or paused; returns whether the
    /// cursor moved.
    pub fn step(&mut self) -> bool {
        match self.mode {
            Mode::Stopped | Mode::Paused => self.advance(),
            Mode::Playing | Mode::Finished => false,
        }
    }

    /// Cancel any timer and return to `Stopped` with no cursor.
    pub fn reset(&mut self) {
        self.disarm();
        self.mode = Mode::Stopped;
        self.move_cursor(None);
    }

    /// Swap in a freshly computed trace. This always resets, even mid-play, so a pending tick can
    /// never move a cursor over a trace it was not armed for.
    pub fn replace_trace(&mut self, trace: Rc<SimulationTrace>) {
        self.reset();
        self.trace = trace;
    }

    /// Change the playback speed multiplier. While playing, the timer is re-armed with the new
    /// period and the previous handle goes stale.
    ///
    /// # Errors
    ///
    /// Rejects zero, negative and non-finite multipliers, as well as multipliers so small that
    /// the resulting period cannot be scheduled. The state is left untouched on error.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), PlaybackError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PlaybackError::InvalidSpeed { speed });
        }
        let period = Duration::try_from_secs_f64(BASE_TICK.as_secs_f64() / speed)
            .ok()
            .filter(|period| Instant::now().checked_add(*period).is_some())
            .ok_or(PlaybackError::InvalidSpeed { speed })?;
        self.speed = speed;
        self.period = period;
        if self.mode == Mode::Playing {
            self.arm();
        }
        Ok(())
    }

    /// Deliver a tick from the timer identified by `handle`. Ticks from any timer other than the
    /// one currently armed are ignored. Returns whether the cursor moved.
    pub fn tick(&mut self, handle: TimerHandle) -> bool {
        match self.timer() {
            Some(armed) if armed == handle && self.mode == Mode::Playing => self.advance(),
            _ => false,
        }
    }

    /// Cooperative driver for the timer: fires at most one tick if the armed deadline has passed
    /// by `now`, then schedules the next one a full period later. Returns the new cursor when a
    /// tick fired.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let handle = match self.timer.as_mut() {
            Some(timer) if timer.due <= now => {
                timer.due = deadline(now, timer.period);
                timer.handle
            }
            _ => return None,
        };
        match self.tick(handle) {
            true => self.cursor,
            false => None,
        }
    }

    fn at_last(&self) -> bool {
        self.cursor.is_some() && self.cursor == self.trace.last_index()
    }

    fn advance(&mut self) -> bool {
        let last = match self.trace.last_index() {
            Some(last) => last,
            None => return false,
        };
        let next = self.cursor.map_or(0, |cursor| cursor + 1);
        if next > last {
            return false;
        }
        self.move_cursor(Some(next));
        if next == last {
            self.disarm();
            self.mode = Mode::Finished;
        } else if self.mode == Mode::Stopped {
            self.mode = Mode::Paused;
        }
        true
    }

    fn move_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
        self.statistics.update(&self.trace, cursor);
    }

    fn arm(&mut self) -> TimerHandle {
        self.disarm();
        self.generation += 1;
        let handle = TimerHandle(self.generation);
        let period = self.period;
        self.timer = Some(Timer {
            handle,
            period,
            due: deadline(Instant::now(), period),
        });
        handle
    }

    fn disarm(&mut self) {
        self.timer = None;
    }
}

/// `now + period`, capped at the latest instant the clock can represent past `now`.
fn deadline(now: Instant, period: Duration) -> Instant {
    now.checked_add(period)
        .or_else(|| now.checked_add(FALLBACK_PERIOD))
        .unwrap_or(now)
}
