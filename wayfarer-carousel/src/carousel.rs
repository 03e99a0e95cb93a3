//! Carousel: one looping carousel instance.
//!
//! Ties the loop buffer, autoplay countdown, offset math and frame gate
//! together behind the operations a block needs: `advance`, `jump_to` and
//! `set_paused`, plus hooks the host calls as its own events arrive
//! (transition end, scroll, animation frame, resize, clock tick).
//!
//! Every method that depends on time takes `now`; the carousel never reads a
//! clock itself.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::animator::SnapAnimator;
use crate::autoplay::{AutoplayTimer, run_guarded};
use crate::driver::AutoplayDriver;
use crate::frame::FrameGate;
use crate::loop_buffer::{ListIdentity, LoopBuffer, PaddedList};
use crate::position::{
    Layout, Offset, ScrollBehavior, ScrollSettle, TransitionTiming,
    compute_offset, index_for_scroll, jump_target, on_index_settled,
};
use crate::types::{
    AddressingMode, CarouselConfig, CarouselSnapshot, Direction,
};

/// Called with the new logical index whenever the active slide changes.
pub type ActiveIndexCallback =
    Box<dyn FnMut(usize) -> anyhow::Result<()> + Send>;

/// One mounted carousel: padded slides, the active display index and the
/// autoplay countdown that moves it.
pub struct Carousel<T> {
    config: CarouselConfig,
    buffer: LoopBuffer<T>,
    display_index: usize,
    transition_enabled: bool,
    is_paused: bool,
    viewport_width: f32,
    autoplay: AutoplayTimer,
    /// Real-time countdown that replaces `autoplay` once attached.
    driver: Option<AutoplayDriver>,
    frames: FrameGate,
    scroll_settle: ScrollSettle,
    /// When the transition currently in flight is over, if any.
    in_flight_until: Option<Instant>,
    animator: SnapAnimator,
    last_reported: Option<usize>,
    on_active_index_change: Option<ActiveIndexCallback>,
    mounted: bool,
}

impl<T> fmt::Debug for Carousel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carousel")
            .field("config", &self.config)
            .field("len", &self.buffer.list().logical_len())
            .field("pad", &self.buffer.list().pad())
            .field("display_index", &self.display_index)
            .field("transition_enabled", &self.transition_enabled)
            .field("is_paused", &self.is_paused)
            .field("viewport_width", &self.viewport_width)
            .field("autoplay", &self.autoplay.state())
            .field("has_driver", &self.driver.is_some())
            .field("in_flight_until", &self.in_flight_until)
            .field("has_callback", &self.on_active_index_change.is_some())
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl<T> Carousel<T> {
    /// Mount a carousel over `items`, seeded at the first logical slide.
    pub fn new(
        items: Arc<[T]>,
        config: CarouselConfig,
        viewport_width: f32,
        now: Instant,
    ) -> Self {
        let buffer = LoopBuffer::new(items, config.effective_window_size());
        let mut carousel = Self {
            scroll_settle: ScrollSettle::new(config.settle_debounce()),
            config,
            buffer,
            display_index: 0,
            transition_enabled: true,
            is_paused: false,
            viewport_width: viewport_width.max(0.0),
            autoplay: AutoplayTimer::new(),
            driver: None,
            frames: FrameGate::new(),
            in_flight_until: None,
            animator: SnapAnimator::new(),
            last_reported: None,
            on_active_index_change: None,
            mounted: true,
        };
        carousel.display_index = carousel.seed_index();
        carousel.animator.jump(carousel.offset().value());
        carousel.last_reported = carousel.logical_index();
        carousel.refresh_autoplay(now);
        carousel
    }

    /// Report every change of the active logical slide to `callback`.
    /// Errors and panics from the callback are logged and swallowed.
    pub fn with_active_index_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize) -> anyhow::Result<()> + Send + 'static,
    {
        self.on_active_index_change = Some(Box::new(callback));
        self
    }

    /// Hand autoplay over to a running [`AutoplayDriver`]. The built-in
    /// countdown stops, and manual interaction and hover pause are forwarded
    /// to the driver from here on. Its `on_advance` should end up in
    /// [`Carousel::auto_advance`]. A previously attached driver is stopped.
    pub fn attach_driver(&mut self, driver: AutoplayDriver) {
        if let Some(mut previous) = self.driver.replace(driver) {
            previous.stop();
        }
        tracing::debug!(target: "carousel::autoplay", "autoplay handed to driver");
        self.autoplay.stop();
        self.sync_driver();
    }

    /// Take the attached driver back. The built-in countdown restarts from
    /// `now` if the configuration asks for autoplay.
    pub fn detach_driver(&mut self, now: Instant) -> Option<AutoplayDriver> {
        let driver = self.driver.take()?;
        self.refresh_autoplay(now);
        Some(driver)
    }

    /// `true` while an [`AutoplayDriver`] owns the countdown.
    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    // ---- state -----------------------------------------------------------

    /// Configuration currently in effect.
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// The list to render, clones included.
    pub fn padded(&self) -> &PaddedList<T> {
        self.buffer.list()
    }

    /// Number of logical slides.
    pub fn len(&self) -> usize {
        self.buffer.list().logical_len()
    }

    /// `true` when there are no slides to show.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `false` once [`Carousel::unmount`] has run.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Index into [`Carousel::padded`] of the slide in view.
    pub fn display_index(&self) -> usize {
        self.display_index
    }

    /// Logical slide in view, `None` for an empty list.
    pub fn logical_index(&self) -> Option<usize> {
        self.buffer.list().logical_index(self.display_index as isize)
    }

    /// `false` from a teleport until the next animation frame.
    pub fn transition_enabled(&self) -> bool {
        self.transition_enabled
    }

    /// Hover pause flag set through [`Carousel::set_paused`].
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// A transition is in flight or a native scroll has not settled yet.
    pub fn is_settling(&self) -> bool {
        self.in_flight_until.is_some() || self.scroll_settle.is_pending()
    }

    /// The built-in countdown polled by [`Carousel::tick`]. Stopped while a
    /// driver is attached.
    pub fn autoplay(&self) -> &AutoplayTimer {
        &self.autoplay
    }

    /// Serializable copy of the observable state.
    pub fn snapshot(&self) -> CarouselSnapshot {
        CarouselSnapshot {
            display_index: self.display_index,
            logical_index: self.logical_index(),
            transition_enabled: self.transition_enabled,
            is_paused: self.is_paused,
        }
    }

    // ---- geometry --------------------------------------------------------

    /// Geometry used by the offset math.
    pub fn layout(&self) -> Layout {
        Layout::new(
            self.config.mode,
            self.config.item_stride,
            self.viewport_width,
        )
    }

    /// Target offset for the current display index.
    pub fn offset(&self) -> Offset {
        compute_offset(self.display_index, self.layout())
    }

    /// Offset interpolated along the current transition, for hosts that
    /// animate the track themselves.
    pub fn animated_offset(&mut self, now: Instant) -> f32 {
        self.animator.sample(now)
    }

    /// Transition timing derived from the configured duration and easing.
    pub fn timing(&self) -> TransitionTiming {
        TransitionTiming::new(
            self.config.transition_duration(),
            self.config.easing,
        )
    }

    /// CSS `transition` value for the track.
    pub fn transition_css(&self) -> String {
        let property = match self.config.mode {
            AddressingMode::CenteredTransform => "transform",
            AddressingMode::NativeScroll => "scroll-left",
        };
        self.timing().css_value(property, self.transition_enabled)
    }

    /// `behavior` for the host's next `scrollTo` call.
    pub fn scroll_behavior(&self) -> ScrollBehavior {
        self.timing().scroll_behavior(self.transition_enabled)
    }

    /// Observe a viewport resize. The offset is recomputed from the new width
    /// and applied without animation.
    pub fn set_viewport_width(&mut self, viewport_width: f32) {
        let width = if viewport_width.is_finite() {
            viewport_width.max(0.0)
        } else {
            0.0
        };
        if (width - self.viewport_width).abs() <= f32::EPSILON {
            return;
        }
        self.viewport_width = width;
        self.animator.jump(self.offset().value());
    }

    // ---- data ------------------------------------------------------------

    /// Supply the slide list for this render. The carousel is re-seeded only
    /// when the list identity changes.
    pub fn set_items(&mut self, items: Arc<[T]>, now: Instant) -> bool {
        let identity = ListIdentity::of(&items);
        self.sync_items(items, identity, now)
    }

    /// Like [`Carousel::set_items`], but identity is decided by a caller data
    /// key rather than the list allocation.
    pub fn set_items_keyed(
        &mut self,
        items: Arc<[T]>,
        data_key: u64,
        now: Instant,
    ) -> bool {
        let identity = ListIdentity::keyed(items.len(), data_key);
        self.sync_items(items, identity, now)
    }

    fn sync_items(
        &mut self,
        items: Arc<[T]>,
        identity: ListIdentity,
        now: Instant,
    ) -> bool {
        if !self.mounted {
            return false;
        }
        let window = self.config.effective_window_size();
        if !self.buffer.sync(items, identity, window) {
            return false;
        }
        tracing::debug!(
            target: "carousel::controller",
            len = self.len(),
            pad = self.padded().pad(),
            "re-seeding carousel for new slide list"
        );
        self.reseed(self.seed_index());
        self.autoplay.stop();
        self.refresh_autoplay(now);
        self.report_active();
        true
    }

    /// Replace the configuration. The active slide is kept.
    pub fn set_config(&mut self, config: CarouselConfig, now: Instant) {
        let logical = self.logical_index();
        self.config = config;
        self.scroll_settle = ScrollSettle::new(config.settle_debounce());
        let items = Arc::clone(self.buffer.list().items());
        let identity = self.buffer.identity();
        self.buffer
            .sync(items, identity, config.effective_window_size());
        let target = logical
            .map(|l| self.padded().canonical_display(l))
            .unwrap_or_else(|| self.seed_index());
        self.reseed(target);
        self.autoplay.stop();
        self.refresh_autoplay(now);
    }

    // ---- controls --------------------------------------------------------

    /// Move one slide in `direction`. Manual interaction: the autoplay
    /// countdown restarts from `now`.
    pub fn advance(&mut self, direction: Direction, now: Instant) -> bool {
        if !self.mounted || self.is_empty() {
            return false;
        }
        self.reset_autoplay(now);
        self.step(direction, now)
    }

    /// Travel to `logical_index`, wrapped into range. Manual interaction:
    /// the autoplay countdown restarts from `now`.
    pub fn jump_to(&mut self, logical_index: isize, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        let list = self.buffer.list();
        let Some(target) = jump_target(
            self.display_index,
            logical_index,
            list.logical_len(),
            list.pad(),
            self.config.jump_policy,
        ) else {
            return false;
        };
        self.reset_autoplay(now);
        if target == self.display_index {
            return false;
        }
        self.move_to(target, now);
        true
    }

    /// Hover pause. Resuming starts a full fresh autoplay interval.
    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        if self.is_paused == paused {
            return;
        }
        self.is_paused = paused;
        if paused {
            self.autoplay.pause();
        } else {
            self.autoplay.resume(now);
        }
        self.sync_driver();
    }

    // ---- host events -----------------------------------------------------

    /// The host's CSS transition finished.
    pub fn on_transition_end(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        self.settle_at(self.display_index)
    }

    /// The host's scroll container reported a new `scrollLeft`.
    pub fn on_scroll(&mut self, scroll_left: f32, now: Instant) {
        if !self.mounted || self.config.mode != AddressingMode::NativeScroll {
            return;
        }
        if self.in_flight_until.is_none() && self.transition_enabled {
            // Not our own animation: the user is scrolling.
            self.reset_autoplay(now);
        }
        self.scroll_settle.record(scroll_left, now);
    }

    /// The host's scroll container reported `scrollend`.
    pub fn on_scroll_end(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        match self.scroll_settle.flush() {
            Some(left) => self.settle_from_scroll(left),
            None => false,
        }
    }

    /// An animation frame was painted. Re-enables transitions one frame
    /// after a teleport.
    pub fn on_animation_frame(&mut self) -> bool {
        if !self.frames.on_frame() {
            return false;
        }
        self.transition_enabled = true;
        true
    }

    /// Drive time-based work: settle fallbacks and autoplay. Returns `true`
    /// when visible state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        let mut changed = false;

        if let Some(until) = self.in_flight_until
            && now >= until
            && !self.scroll_settle.is_pending()
        {
            changed |= self.settle_at(self.display_index);
        }
        if let Some(left) = self.scroll_settle.poll(now) {
            changed |= self.settle_from_scroll(left);
        }

        // Keep the teleport frame free of movement; a due advance fires on
        // the first tick after transitions are back on.
        if !self.ready_for_autoplay() {
            return changed;
        }
        if self.autoplay.poll(now) {
            changed |= self.step(self.config.autoplay_direction, now);
        }
        changed
    }

    /// Advance in the autoplay direction without touching the countdown.
    /// For hosts that run autoplay on an [`AutoplayDriver`] instead of
    /// `tick`. Ignored while paused.
    pub fn auto_advance(&mut self, now: Instant) -> bool {
        if !self.mounted || self.is_paused || !self.ready_for_autoplay() {
            return false;
        }
        self.step(self.config.autoplay_direction, now)
    }

    /// Earliest instant at which [`Carousel::tick`] has work to do.
    pub fn next_wake(&self) -> Option<Instant> {
        if !self.mounted {
            return None;
        }
        let autoplay = self
            .ready_for_autoplay()
            .then(|| self.autoplay.next_deadline())
            .flatten();
        [self.in_flight_until, self.scroll_settle.deadline(), autoplay]
            .into_iter()
            .flatten()
            .min()
    }

    /// Tear down: stop autoplay and drop any deferred work. Idempotent.
    pub fn unmount(&mut self) {
        if self.mounted {
            tracing::debug!(target: "carousel::controller", "unmounting carousel");
        }
        self.mounted = false;
        self.autoplay.stop();
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
        self.frames.cancel();
        self.scroll_settle.clear();
        self.in_flight_until = None;
        self.animator.cancel();
    }

    // ---- internals -------------------------------------------------------

    fn ready_for_autoplay(&self) -> bool {
        !self.frames.is_armed() && !self.is_settling()
    }

    fn seed_index(&self) -> usize {
        self.buffer.list().pad()
    }

    fn step(&mut self, direction: Direction, now: Instant) -> bool {
        let list = self.buffer.list();
        let len = list.logical_len();
        if len == 0 {
            return false;
        }
        let target = if list.is_looping() {
            let next = self.display_index as isize + direction.step();
            if next < 0 || next as usize >= list.len() {
                tracing::debug!(
                    target: "carousel::controller",
                    display_index = self.display_index,
                    "navigation past the clone buffer dropped until settle"
                );
                return false;
            }
            next as usize
        } else {
            (self.display_index as isize + direction.step())
                .rem_euclid(len as isize) as usize
        };
        if target == self.display_index {
            return false;
        }
        self.move_to(target, now);
        true
    }

    fn move_to(&mut self, target: usize, now: Instant) {
        let from = self.animator.sample(now);
        self.display_index = target;
        self.scroll_settle.clear();
        let timing = self.timing();
        let to = self.offset().value();
        if timing.duration.is_zero() || !self.transition_enabled {
            self.animator.jump(to);
            self.in_flight_until = None;
            self.settle_at(target);
        } else {
            self.animator
                .start(from, to, timing.duration, timing.easing, now);
            self.in_flight_until = Some(timing.ends_at(now));
        }
        self.report_active();
    }

    fn settle_from_scroll(&mut self, scroll_left: f32) -> bool {
        let index = index_for_scroll(
            scroll_left,
            self.config.item_stride,
            self.buffer.list().len(),
        );
        let moved = index != self.display_index;
        self.display_index = index;
        if moved {
            self.animator.jump(self.offset().value());
            self.report_active();
        }
        self.settle_at(index) || moved
    }

    fn settle_at(&mut self, display_index: usize) -> bool {
        self.in_flight_until = None;
        let list = self.buffer.list();
        let settle =
            on_index_settled(display_index, list.logical_len(), list.pad());
        self.display_index = settle.display_index;
        if !settle.teleported {
            return false;
        }
        self.transition_enabled = false;
        self.frames.arm();
        self.animator.jump(self.offset().value());
        true
    }

    fn reseed(&mut self, display_index: usize) {
        self.in_flight_until = None;
        self.scroll_settle.clear();
        self.display_index = display_index;
        self.transition_enabled = false;
        self.frames.arm();
        self.animator.jump(self.offset().value());
    }

    fn reset_autoplay(&mut self, now: Instant) {
        self.autoplay.reset(now);
        if let Some(driver) = &self.driver {
            driver.reset();
        }
    }

    /// Hold the attached driver while paused or short of slides, and give
    /// it a fresh interval otherwise.
    fn sync_driver(&self) {
        let Some(driver) = &self.driver else {
            return;
        };
        if self.is_paused || !self.mounted || self.len() <= 1 {
            driver.pause();
        } else {
            driver.restart();
        }
    }

    fn refresh_autoplay(&mut self, now: Instant) {
        if self.driver.is_some() {
            self.autoplay.stop();
            self.sync_driver();
            return;
        }
        let Some(interval) = self.config.autoplay_interval() else {
            self.autoplay.stop();
            return;
        };
        if !self.mounted || self.len() <= 1 {
            if self.len() <= 1 {
                tracing::debug!(
                    target: "carousel::autoplay",
                    len = self.len(),
                    "autoplay disabled: not enough slides"
                );
            }
            self.autoplay.stop();
            return;
        }
        if self.autoplay.is_stopped() {
            self.autoplay.start(interval, now);
            if self.is_paused {
                self.autoplay.pause();
            }
        }
    }

    fn report_active(&mut self) {
        let current = self.logical_index();
        if current == self.last_reported {
            return;
        }
        self.last_reported = current;
        let (Some(index), Some(callback)) =
            (current, self.on_active_index_change.as_mut())
        else {
            return;
        };
        run_guarded("active index change", || callback(index));
    }
}
