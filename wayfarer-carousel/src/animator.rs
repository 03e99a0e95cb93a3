//! Time-based tween for hosts that animate the track offset themselves
//! instead of relying on CSS transitions or native smooth scrolling.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
/// Easing curve shared by the CSS transition and [`SnapAnimator`].
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Slow start.
    EaseIn,
    /// Slow finish.
    EaseOut,
    /// Slow start and finish.
    #[default]
    EaseInOut,
}

impl Easing {
    /// Eased progress for linear progress `t`, clamped to `0..=1`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }

    /// CSS timing-function keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

/// Tween from one track offset to another over a fixed duration.
#[derive(Debug, Clone)]
pub struct SnapAnimator {
    active: bool,
    start: f32,
    target: f32,
    started_at: Option<Instant>,
    duration: Duration,
    easing: Easing,
}

impl Default for SnapAnimator {
    fn default() -> Self {
        Self {
            active: false,
            start: 0.0,
            target: 0.0,
            started_at: None,
            duration: Duration::from_millis(500),
            easing: Easing::EaseInOut,
        }
    }
}

impl SnapAnimator {
    /// Idle animator resting at offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tween is in progress.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Offset the current or last tween ends at.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Tween from `current` to `target`. A zero duration jumps straight there.
    pub fn start(
        &mut self,
        current: f32,
        target: f32,
        duration: Duration,
        easing: Easing,
        now: Instant,
    ) {
        if duration.is_zero() {
            self.jump(target);
            return;
        }
        self.active = true;
        self.start = current;
        self.target = target;
        self.started_at = Some(now);
        self.duration = duration;
        self.easing = easing;
    }

    /// Place the offset at `target` without animating.
    pub fn jump(&mut self, target: f32) {
        self.active = false;
        self.start = target;
        self.target = target;
        self.started_at = None;
    }

    /// Offset at `now`. Finishes the animation once its duration elapsed.
    pub fn sample(&mut self, now: Instant) -> f32 {
        if !self.active {
            return self.target;
        }
        let Some(started_at) = self.started_at else {
            self.active = false;
            return self.target;
        };
        let elapsed = now.saturating_duration_since(started_at);
        if elapsed >= self.duration {
            self.active = false;
            return self.target;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.start + (self.target - self.start) * self.easing.apply(t)
    }

    /// Cancel the current animation immediately, leaving the offset at its
    /// target.
    pub fn cancel(&mut self) {
        self.active = false;
    }
}
