//! Autoplay countdown.
//!
//! `Stopped -> Running <-> Paused`, with `Stopped` as both the initial and
//! the terminal state. The timer owns no clock: every transition takes the
//! current instant, and [`AutoplayTimer::poll`] reports when an advance is due.
//! Resuming after a pause starts a full fresh interval; remaining time is not
//! carried over.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use crate::error::CarouselError;

/// Where the countdown is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    /// Not counting. Initial and terminal state.
    Stopped,
    /// Counting down to `deadline`.
    Running {
        /// When the next advance is due.
        deadline: Instant,
    },
    /// Held by a hover; resuming restarts the interval.
    Paused,
}

/// Pausable, resettable autoplay countdown driven by caller-supplied instants.
#[derive(Debug, Clone)]
pub struct AutoplayTimer {
    interval: Duration,
    state: AutoplayState,
}

impl Default for AutoplayTimer {
    fn default() -> Self {
        Self {
            interval: Duration::ZERO,
            state: AutoplayState::Stopped,
        }
    }
}

impl AutoplayTimer {
    /// A stopped timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AutoplayState {
        self.state
    }

    /// Interval set by the last [`AutoplayTimer::start`].
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Counting down.
    pub fn is_running(&self) -> bool {
        matches!(self.state, AutoplayState::Running { .. })
    }

    /// Held by [`AutoplayTimer::pause`].
    pub fn is_paused(&self) -> bool {
        matches!(self.state, AutoplayState::Paused)
    }

    /// Never started, or stopped.
    pub fn is_stopped(&self) -> bool {
        matches!(self.state, AutoplayState::Stopped)
    }

    /// Instant of the next advance while running.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            AutoplayState::Running { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Begin counting down from `now`. A zero interval leaves the timer
    /// stopped.
    pub fn start(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if interval.is_zero() {
            self.state = AutoplayState::Stopped;
            return;
        }
        self.state = AutoplayState::Running {
            deadline: now + interval,
        };
    }

    /// Hold the countdown. No-op unless running.
    pub fn pause(&mut self) {
        if self.is_running() {
            self.state = AutoplayState::Paused;
        }
    }

    /// Leave the paused state with a full fresh interval.
    pub fn resume(&mut self, now: Instant) {
        if self.is_paused() {
            self.state = AutoplayState::Running {
                deadline: now + self.interval,
            };
        }
    }

    /// Cancel the pending fire and schedule a fresh interval from `now`.
    /// Called on every manual interaction so the next automatic advance is a
    /// full interval away.
    pub fn reset(&mut self, now: Instant) {
        if self.is_running() {
            self.state = AutoplayState::Running {
                deadline: now + self.interval,
            };
        }
    }

    /// Release the countdown. Safe to call any number of times.
    pub fn stop(&mut self) {
        self.state = AutoplayState::Stopped;
    }

    /// Returns `true` when an advance is due at `now` and reschedules the
    /// next one a full interval later.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            AutoplayState::Running { deadline } if now >= deadline => {
                self.state = AutoplayState::Running {
                    deadline: now + self.interval,
                };
                true
            }
            _ => false,
        }
    }

    /// Poll and, when due, run `on_advance` behind the callback guard. The
    /// timer is rescheduled before the callback runs, so a failing consumer
    /// never stops autoplay.
    pub fn fire_due<F>(&mut self, now: Instant, on_advance: F) -> bool
    where
        F: FnOnce() -> anyhow::Result<()>,
    {
        if !self.poll(now) {
            return false;
        }
        run_guarded("autoplay advance", on_advance);
        true
    }
}

/// Run a consumer callback, converting errors and panics into a logged
/// warning. Returns the failure, if any, for callers that count them.
pub(crate) fn run_guarded<F>(label: &str, callback: F) -> Option<CarouselError>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    let failure = match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => return None,
        Ok(Err(err)) => CarouselError::Callback(format!("{err:#}")),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            CarouselError::Callback(format!("panicked: {message}"))
        }
    };
    tracing::warn!(target: "carousel::autoplay", callback = label, error = %failure, "consumer callback failed");
    Some(failure)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(1_000);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_per_interval() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new();
        timer.start(INTERVAL, t0);
        assert!(!timer.poll(t0 + ms(999)));
        assert!(timer.poll(t0 + ms(1_000)));
        assert!(!timer.poll(t0 + ms(1_500)));
        assert!(timer.poll(t0 + ms(2_000)));
    }

    #[test]
    fn pause_suppresses_and_resume_restarts_full_interval() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new();
        timer.start(INTERVAL, t0);
        timer.pause();
        for step in 1..=30 {
            assert!(!timer.poll(t0 + ms(step * 100)));
        }
        timer.resume(t0 + ms(3_000));
        assert!(!timer.poll(t0 + ms(3_999)));
        assert!(timer.poll(t0 + ms(4_000)));
    }

    #[test]
    fn reset_pushes_next_fire_a_full_interval_out() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new();
        timer.start(INTERVAL, t0);
        timer.reset(t0 + ms(900));
        assert!(!timer.poll(t0 + ms(1_000)));
        assert_eq!(timer.next_deadline(), Some(t0 + ms(1_900)));
        assert!(timer.poll(t0 + ms(1_900)));
    }

    #[test]
    fn reset_does_not_wake_a_paused_timer() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new();
        timer.start(INTERVAL, t0);
        timer.pause();
        timer.reset(t0 + ms(500));
        assert!(timer.is_paused());
    }

    #[test]
    fn stop_is_idempotent_and_terminal() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new();
        timer.start(INTERVAL, t0);
        timer.stop();
        timer.stop();
        assert!(timer.is_stopped());
        timer.resume(t0);
        timer.reset(t0);
        assert!(!timer.poll(t0 + ms(10_000)));
    }

    #[test]
    fn failing_callback_keeps_autoplay_alive() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new();
        timer.start(INTERVAL, t0);
        assert!(timer.fire_due(t0 + INTERVAL, || anyhow::bail!("boom")));
        assert!(timer.fire_due(t0 + INTERVAL * 2, || panic!("consumer bug")));
        assert!(timer.is_running());
        assert_eq!(timer.next_deadline(), Some(t0 + INTERVAL * 3));
    }
}
