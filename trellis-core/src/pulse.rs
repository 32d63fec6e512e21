//! Frame timing.
//!
//! A [`Pulse`] turns wall-clock or simulated time into the [`UpdateContext`]
//! handed to every component hook during a frame.

/// Per-frame timing passed to component hooks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateContext {
    /// Number of frames advanced before this one.
    pub frame_number: u64,
    /// Absolute time of this frame in seconds.
    pub time: f64,
    /// Seconds since the pulse started.
    pub seconds_elapsed: f64,
    /// Seconds since the previous frame.
    pub seconds_delta: f64,
}

/// Frame clock producing [`UpdateContext`] values.
///
/// # Example
///
/// ```
/// use trellis_core::Pulse;
///
/// let mut pulse = Pulse::new();
/// let first = pulse.advance(0.016);
/// let second = pulse.advance(0.016);
/// assert_eq!(second.frame_number, first.frame_number + 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pulse {
    context: UpdateContext,
    start: Option<f64>,
    frames: u64,
}

impl Pulse {
    /// Create a pulse that hasn't produced a frame yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The context of the most recent frame.
    pub fn context(&self) -> &UpdateContext {
        &self.context
    }

    /// Advance by a fixed time step.
    pub fn advance(&mut self, seconds_delta: f64) -> UpdateContext {
        let time = match self.start {
            Some(_) => self.context.time + seconds_delta,
            None => seconds_delta,
        };
        let start = *self.start.get_or_insert(0.0);
        self.next(time, start, seconds_delta)
    }

    /// Advance to an absolute time in seconds. The first call only anchors
    /// the clock and reports a zero delta.
    pub fn advance_to(&mut self, time: f64) -> UpdateContext {
        let delta = match self.start {
            Some(_) => (time - self.context.time).max(0.0),
            None => 0.0,
        };
        let start = *self.start.get_or_insert(time);
        self.next(time, start, delta)
    }

    fn next(&mut self, time: f64, start: f64, delta: f64) -> UpdateContext {
        self.context = UpdateContext {
            frame_number: self.frames,
            time,
            seconds_elapsed: time - start,
            seconds_delta: delta,
        };
        self.frames += 1;
        self.context
    }
}
