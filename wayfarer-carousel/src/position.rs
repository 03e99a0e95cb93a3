//! Index-to-offset math and the settle/teleport rule.
//!
//! Two addressing modes share one wrap rule. In centred-transform mode the
//! display index becomes a track translation that keeps the active slide in
//! the middle of the viewport. In native-scroll mode it becomes a
//! `scrollLeft` value and settling is detected from scroll events.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::animator::Easing;
use crate::types::{AddressingMode, JumpPolicy};

/// Geometry needed to place the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layout {
    /// Track translated so the active slide sits centred in the viewport.
    CenteredTransform {
        /// Slide width plus gap.
        item_stride: f32,
        /// Visible width of the track.
        viewport_width: f32,
    },
    /// Host scroll container; slides snap to their left edge.
    NativeScroll {
        /// Slide width plus gap.
        item_stride: f32,
    },
}

impl Layout {
    /// Layout for `mode`; the viewport only matters when centring.
    pub fn new(mode: AddressingMode, item_stride: f32, viewport_width: f32) -> Self {
        match mode {
            AddressingMode::CenteredTransform => Layout::CenteredTransform {
                item_stride,
                viewport_width,
            },
            AddressingMode::NativeScroll => Layout::NativeScroll { item_stride },
        }
    }

    /// Slide width plus gap.
    pub fn item_stride(&self) -> f32 {
        match *self {
            Layout::CenteredTransform { item_stride, .. }
            | Layout::NativeScroll { item_stride } => item_stride,
        }
    }
}

/// Position the host applies to its track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Offset {
    /// Leftward translation of the track, in pixels.
    Transform {
        /// Pixels.
        x: f32,
    },
    /// Scroll container `scrollLeft`, in pixels.
    Scroll {
        /// Pixels.
        left: f32,
    },
}

impl Offset {
    /// The offset in pixels, whatever its kind.
    pub fn value(self) -> f32 {
        match self {
            Offset::Transform { x } => x,
            Offset::Scroll { left } => left,
        }
    }
}

/// Offset that brings `display_index` into place.
pub fn compute_offset(display_index: usize, layout: Layout) -> Offset {
    let index = display_index as f32;
    match layout {
        Layout::CenteredTransform {
            item_stride,
            viewport_width,
        } => Offset::Transform {
            x: index * item_stride - (viewport_width / 2.0 - item_stride / 2.0),
        },
        Layout::NativeScroll { item_stride } => Offset::Scroll {
            left: index * item_stride,
        },
    }
}

/// Outcome of a completed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settle {
    /// Where the track rests after settling.
    pub display_index: usize,
    /// `false` when the settle was a teleport.
    pub transition_enabled: bool,
    /// The index jumped out of a clone region.
    pub teleported: bool,
}

/// Apply the wrap rule once a transition has finished at `display_index`.
///
/// Past the last logical slide the index moves back by `len`; before the
/// first it moves forward by `len`. A teleport disables transitions; the
/// caller re-enables them on the following frame.
pub fn on_index_settled(display_index: usize, len: usize, pad: usize) -> Settle {
    let stay = Settle {
        display_index,
        transition_enabled: true,
        teleported: false,
    };
    if pad == 0 || len == 0 {
        return Settle {
            display_index: display_index.min(len.saturating_sub(1)),
            ..stay
        };
    }
    let teleport_to = if display_index >= len + pad {
        display_index - len
    } else if display_index < pad {
        display_index + len
    } else {
        return stay;
    };
    tracing::debug!(
        target: "carousel::position",
        from = display_index,
        to = teleport_to,
        "teleporting out of clone region"
    );
    Settle {
        display_index: teleport_to,
        transition_enabled: false,
        teleported: true,
    }
}

/// Display index to travel to for `logical_index`, starting from `current`.
///
/// Out-of-range logical indices are wrapped rather than rejected. Returns
/// `None` for an empty list.
pub fn jump_target(
    current: usize,
    logical_index: isize,
    len: usize,
    pad: usize,
    policy: JumpPolicy,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let logical = logical_index.rem_euclid(len as isize) as usize;
    let canonical = pad + logical;
    if pad == 0 {
        return Some(canonical);
    }

    let padded_len = len + 2 * pad;
    let candidates = [
        canonical.checked_sub(len),
        Some(canonical),
        Some(canonical + len).filter(|i| *i < padded_len),
    ];
    let candidates = candidates.into_iter().flatten();

    let target = match policy {
        JumpPolicy::Shortest => candidates
            .min_by_key(|c| (c.abs_diff(current), std::cmp::Reverse(*c)))
            .unwrap_or(canonical),
        JumpPolicy::Forward => candidates
            .filter(|c| *c >= current)
            .min()
            .unwrap_or(canonical),
    };
    Some(target)
}

/// Nearest slide for a native scroll position.
pub fn index_for_scroll(scroll_left: f32, item_stride: f32, padded_len: usize) -> usize {
    if padded_len == 0
        || item_stride <= 0.0
        || !item_stride.is_finite()
        || !scroll_left.is_finite()
    {
        return 0;
    }
    let raw = (scroll_left / item_stride).round().max(0.0) as usize;
    raw.min(padded_len - 1)
}

/// How the host should perform a native scroll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    /// Animated scroll.
    Smooth,
    /// Jump without animation.
    Instant,
}

/// The single authoritative transition timing. The CSS transition string and
/// every engine-side wait derive from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTiming {
    /// Length of one slide transition.
    pub duration: Duration,
    /// Curve used by CSS and the engine alike.
    pub easing: Easing,
}

impl TransitionTiming {
    /// Timing from a duration and curve.
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self { duration, easing }
    }

    /// CSS `transition` value for `property`, or `none` while transitions are
    /// disabled for a teleport.
    pub fn css_value(&self, property: &str, enabled: bool) -> String {
        if !enabled {
            return "none".to_string();
        }
        format!(
            "{property} {}ms {}",
            self.duration.as_millis(),
            self.easing.css_name()
        )
    }

    /// `behavior` for a native `scrollTo`.
    pub fn scroll_behavior(&self, enabled: bool) -> ScrollBehavior {
        if enabled && !self.duration.is_zero() {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        }
    }

    /// When a transition started at `started_at` is over.
    pub fn ends_at(&self, started_at: Instant) -> Instant {
        started_at + self.duration
    }
}

/// Debounce for native scroll events: the position counts as settled once no
/// scroll event arrived for the configured quiet period, or immediately on a
/// `scrollend` notification.
#[derive(Debug, Clone)]
pub struct ScrollSettle {
    debounce: Duration,
    candidate: Option<f32>,
    last_event: Option<Instant>,
}

impl ScrollSettle {
    /// Debounce with the given quiet period.
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            candidate: None,
            last_event: None,
        }
    }

    /// A scroll was recorded and has not settled.
    pub fn is_pending(&self) -> bool {
        self.candidate.is_some()
    }

    /// Note a scroll event; the quiet period restarts.
    pub fn record(&mut self, scroll_left: f32, now: Instant) {
        self.candidate = Some(scroll_left);
        self.last_event = Some(now);
    }

    /// When the quiet period of the pending scroll runs out.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_event.map(|last| last + self.debounce)
    }

    /// Settled position once the quiet period elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<f32> {
        let last = self.last_event?;
        if now.saturating_duration_since(last) < self.debounce {
            return None;
        }
        self.flush()
    }

    /// Settle immediately at the last recorded position.
    pub fn flush(&mut self) -> Option<f32> {
        self.last_event = None;
        self.candidate.take()
    }

    /// Drop any pending scroll.
    pub fn clear(&mut self) {
        self.candidate = None;
        self.last_event = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_offset_keeps_slide_in_the_middle() {
        let layout = Layout::CenteredTransform {
            item_stride: 300.0,
            viewport_width: 1200.0,
        };
        // slide 2 starts at 600; centring shifts by (600 - 150)
        assert_eq!(compute_offset(2, layout), Offset::Transform { x: 150.0 });
        let narrow = Layout::CenteredTransform {
            item_stride: 300.0,
            viewport_width: 300.0,
        };
        assert_eq!(compute_offset(2, narrow).value(), 600.0);
    }

    #[test]
    fn native_offset_is_scroll_left() {
        let layout = Layout::NativeScroll { item_stride: 250.0 };
        assert_eq!(compute_offset(3, layout), Offset::Scroll { left: 750.0 });
    }

    #[test]
    fn settle_teleports_out_of_both_clone_regions() {
        // N = 5, pad = 1: padded = [E A B C D E A]
        let tail = on_index_settled(6, 5, 1);
        assert_eq!(
            tail,
            Settle {
                display_index: 1,
                transition_enabled: false,
                teleported: true
            }
        );
        let head = on_index_settled(0, 5, 1);
        assert_eq!(head.display_index, 5);
        assert!(head.teleported);

        let inside = on_index_settled(3, 5, 1);
        assert!(!inside.teleported);
        assert!(inside.transition_enabled);
    }

    #[test]
    fn settle_preserves_logical_index() {
        let len = 7;
        for pad in 1..=len {
            for display in 0..len + 2 * pad {
                let settled = on_index_settled(display, len, pad);
                let before = crate::loop_buffer::wrap_logical(display as isize, pad, len);
                let after = crate::loop_buffer::wrap_logical(
                    settled.display_index as isize,
                    pad,
                    len,
                );
                assert_eq!(before, after, "pad={pad} display={display}");
                assert!(settled.display_index >= pad);
                assert!(settled.display_index < pad + len);
            }
        }
    }

    #[test]
    fn jump_normalizes_out_of_range_indices() {
        assert_eq!(jump_target(1, -1, 5, 1, JumpPolicy::Forward), Some(5));
        assert_eq!(jump_target(1, 12, 5, 1, JumpPolicy::Forward), Some(3));
        assert_eq!(jump_target(0, 3, 0, 0, JumpPolicy::Shortest), None);
    }

    #[test]
    fn shortest_jump_uses_clone_when_closer() {
        // N = 5, pad = 2: padded = [D E A B C D E A B]
        // From E (display 6) to A: canonical 2 (distance 4), clone 7 (distance 1)
        assert_eq!(jump_target(6, 0, 5, 2, JumpPolicy::Shortest), Some(7));
        // Forward from display 6 to D: clone 0 and canonical 5 are behind
        assert_eq!(jump_target(6, 3, 5, 2, JumpPolicy::Forward), Some(5));
        // From A (display 2) to E: clone 1 at distance 1 beats canonical 6
        assert_eq!(jump_target(2, 4, 5, 2, JumpPolicy::Shortest), Some(1));
        assert_eq!(jump_target(2, 4, 5, 2, JumpPolicy::Forward), Some(6));
    }

    #[test]
    fn shortest_jump_ties_go_forward() {
        // N = 4, pad = 4: padded len 12, logical 4..8. From 6, logical 0
        // has candidates 0, 4, 8; 4 and 8 are both two away.
        assert_eq!(jump_target(6, 0, 4, 4, JumpPolicy::Shortest), Some(8));
    }

    #[test]
    fn scroll_position_rounds_to_nearest_slide() {
        assert_eq!(index_for_scroll(740.0, 250.0, 9), 3);
        assert_eq!(index_for_scroll(-20.0, 250.0, 9), 0);
        assert_eq!(index_for_scroll(1e6, 250.0, 9), 8);
        assert_eq!(index_for_scroll(10.0, 0.0, 9), 0);
    }

    #[test]
    fn scroll_settle_debounces() {
        let t0 = Instant::now();
        let mut settle = ScrollSettle::new(Duration::from_millis(150));
        settle.record(100.0, t0);
        settle.record(180.0, t0 + Duration::from_millis(100));
        assert_eq!(settle.poll(t0 + Duration::from_millis(200)), None);
        assert_eq!(settle.poll(t0 + Duration::from_millis(250)), Some(180.0));
        assert!(!settle.is_pending());

        settle.record(40.0, t0);
        assert_eq!(settle.flush(), Some(40.0));
        assert_eq!(settle.flush(), None);
    }

    #[test]
    fn css_transition_follows_the_single_duration() {
        let timing = TransitionTiming::new(Duration::from_millis(450), Easing::EaseOut);
        assert_eq!(timing.css_value("transform", true), "transform 450ms ease-out");
        assert_eq!(timing.css_value("transform", false), "none");
        assert_eq!(timing.scroll_behavior(false), ScrollBehavior::Instant);
        assert_eq!(timing.scroll_behavior(true), ScrollBehavior::Smooth);
    }
}
