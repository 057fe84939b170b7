//! Pausable elapsed-time source
//!
//! The driver derives every frame's `dt` from one timer, so pausing it is
//! enough to freeze the simulation without a catch-up jump on resume.

use crate::platform::Clock;

/// Elapsed seconds since the last reset, excluding paused spans
#[derive(Debug, Clone)]
pub struct Timer<C: Clock> {
    clock: C,
    /// Seconds accumulated before the current running span
    banked: f64,
    /// Clock reading when the current running span began (None while paused)
    running_since: Option<f64>,
}

impl<C: Clock> Timer<C> {
    /// New timer, paused at zero
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            banked: 0.0,
            running_since: None,
        }
    }

    /// Resume counting from where it left off
    pub fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(self.clock.now());
        }
    }

    /// Freeze elapsed time
    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += (self.clock.now() - since).max(0.0);
        }
    }

    /// Back to zero, paused
    pub fn reset(&mut self) {
        self.banked = 0.0;
        self.running_since = None;
    }

    pub fn is_paused(&self) -> bool {
        self.running_since.is_none()
    }

    /// Seconds since the last reset, frozen while paused
    pub fn elapsed(&self) -> f64 {
        match self.running_since {
            Some(since) => self.banked + (self.clock.now() - since).max(0.0),
            None => self.banked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualClock;

    #[test]
    fn test_starts_paused() {
        let clock = ManualClock::new();
        let timer = Timer::new(clock.clone());
        clock.advance(5.0);
        assert!(timer.is_paused());
        assert_eq!(timer.elapsed(), 0.0);
    }

    #[test]
    fn test_pause_freezes_and_start_resumes() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(clock.clone());

        timer.start();
        clock.advance(1.0);
        assert_eq!(timer.elapsed(), 1.0);

        timer.pause();
        clock.advance(10.0);
        assert_eq!(timer.elapsed(), 1.0);

        timer.start();
        clock.advance(0.5);
        assert_eq!(timer.elapsed(), 1.5);
    }

    #[test]
    fn test_repeated_start_and_pause_are_idempotent() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(clock.clone());

        timer.start();
        clock.advance(1.0);
        timer.start();
        clock.advance(1.0);
        assert_eq!(timer.elapsed(), 2.0);

        timer.pause();
        timer.pause();
        assert_eq!(timer.elapsed(), 2.0);
    }

    #[test]
    fn test_reset() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(clock.clone());
        timer.start();
        clock.advance(3.0);
        timer.reset();
        assert!(timer.is_paused());
        assert_eq!(timer.elapsed(), 0.0);
    }
}
