//! Single-shot debounce timer (§4.D "State machines"): `Idle -> Armed ->
//! Elapsed -> Idle`. `Elapsed` is observed exactly once, at the first
//! `poll()` call at or after the deadline, and the timer returns to `Idle`
//! immediately rather than staying latched — the caller's "clear" action is
//! the one-shot signal, not the timer's own state.
//!
//! Advanced by comparing against a caller-supplied `now` (§4.D doc comment
//! on `Processor::process_telemetry`), not a real clock, so processors stay
//! testable without `tokio::time`.

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Armed(f64),
    Elapsed,
}

#[derive(Debug, Clone, Copy)]
pub struct SingleShotTimer {
    state: State,
}

impl SingleShotTimer {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Arms (or re-arms, disarming any pending timer) for `duration` seconds
    /// from `now`.
    pub fn arm(&mut self, now: f64, duration: f64) {
        self.state = State::Armed(now + duration);
    }

    /// True iff the timer is not currently counting down (never armed, or
    /// already elapsed and cleared).
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Advances the timer to `now`. Returns `true` exactly once, on the
    /// call where an armed deadline has passed; the timer is `Idle` again
    /// immediately afterwards.
    pub fn poll(&mut self, now: f64) -> bool {
        if let State::Armed(deadline) = self.state {
            if now >= deadline {
                self.state = State::Elapsed;
            }
        }
        if self.state == State::Elapsed {
            self.state = State::Idle;
            true
        } else {
            false
        }
    }
}

impl Default for SingleShotTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_deadline() {
        let mut timer = SingleShotTimer::new();
        timer.arm(0.0, 2.0);
        assert!(!timer.poll(1.0));
        assert!(timer.poll(2.0));
        assert!(!timer.poll(2.0), "must not re-fire on the next poll");
        assert!(timer.is_idle());
    }

    #[test]
    fn rearming_resets_the_deadline() {
        let mut timer = SingleShotTimer::new();
        timer.arm(0.0, 2.0);
        timer.arm(1.0, 2.0);
        assert!(!timer.poll(2.0), "rearmed deadline is now 3.0");
        assert!(timer.poll(3.0));
    }

    #[test]
    fn never_armed_is_idle() {
        let timer = SingleShotTimer::new();
        assert!(timer.is_idle());
    }
}
