//! Frame-sample clock.
//!
//! The host supplies one raw timestamp per frame (e.g. milliseconds from an
//! animation-frame callback).  The clock never reads wall-clock time itself.
//!
//! | Event            | Effect                                                        |
//! |------------------|---------------------------------------------------------------|
//! | first sample     | offset := raw; simulated time := 0                            |
//! | later sample     | time := raw − offset; elapsed := Δtime / units-per-tick       |
//! | pause            | no samples are taken; tick and time freeze                    |
//! | first after pause| offset grows by the paused gap, so elapsed is 0 for that frame |
//!
//! The tick counter advances by exactly one per dispatched frame.

use am_core::Tick;

#[derive(Clone, Debug, PartialEq)]
pub struct FrameClock {
    /// Frames dispatched so far.
    pub tick: Tick,
    /// Simulated time in raw sample units since the first frame.
    pub time: f64,
    /// `time` at the previous frame.
    pub prev_time: f64,
    /// Raw timestamp corresponding to `time == 0`, plus all paused gaps.
    pub start_delay: f64,
    /// Raw sample units per tick of simulated time.
    pub units_per_tick: f64,
    started: bool,
    running: bool,
    resuming: bool,
}

impl FrameClock {
    pub fn new(units_per_tick: f64) -> Self {
        Self {
            tick:        Tick::ZERO,
            time:        0.0,
            prev_time:   0.0,
            start_delay: 0.0,
            units_per_tick,
            started:     false,
            running:     false,
            resuming:    false,
        }
    }

    /// Start accepting frames.  Returns `false` if already running.
    pub fn run(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.resuming = self.started;
        true
    }

    /// Stop accepting frames.  Returns `false` if already stopped.
    pub fn pause(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Simulated time in ticks.
    #[inline]
    pub fn elapsed_ticks(&self) -> f64 {
        self.time / self.units_per_tick
    }

    /// Take one frame sample.
    ///
    /// Returns the tick being dispatched and the elapsed simulated time
    /// since the previous frame, in ticks; `None` while stopped.
    pub fn sample(&mut self, raw: f64) -> Option<(Tick, f64)> {
        if !self.running {
            return None;
        }
        if !self.started {
            self.started = true;
            self.start_delay = raw;
        } else if self.resuming {
            self.start_delay = raw - self.time;
        }
        self.resuming = false;

        self.time = raw - self.start_delay;
        let elapsed = ((self.time - self.prev_time) / self.units_per_tick).max(0.0);
        self.prev_time = self.time;

        let tick = self.tick;
        self.tick = self.tick.next();
        Some((tick, elapsed))
    }

    /// Stop and return to the never-started state.
    pub fn reset(&mut self) {
        *self = Self::new(self.units_per_tick);
    }
}
