//! # Wayfarer Carousel
//!
//! Engine behind the looping carousels on the Wayfarer travel site: the hero
//! slider, the "popular now" cards and the other block variants.
//!
//! ## Overview
//!
//! Every carousel renders its slide list with a few cloned slides on each
//! side. Navigation always animates one slide at a time; when a transition
//! ends inside a clone region the track jumps, without animation, to the
//! matching real slide, so the list appears endless.
//!
//! - [`loop_buffer`]: clone-padded list, memoized on list identity
//! - [`position`]: index-to-offset math for the two addressing modes and the
//!   settle/teleport rule
//! - [`autoplay`]: pausable, resettable countdown driven by an injected clock
//! - [`carousel`]: one carousel instance tying the above together
//! - [`registry`], [`focus`], [`messages`]: page-level state and dispatch
//! - [`driver`]: tokio task that runs an autoplay countdown on real time
//!
//! The engine never paints and never reads a clock on its own: hosts pass
//! `now` in, apply [`Offset`] and [`Carousel::transition_css`] to their track,
//! and report transition ends, scrolls and animation frames back.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Instant;
//! use wayfarer_carousel::{Carousel, CarouselConfig, Direction};
//!
//! let slides: Arc<[&str]> = Arc::from(vec!["A", "B", "C", "D", "E"]);
//! let now = Instant::now();
//! let mut carousel = Carousel::new(
//!     slides,
//!     CarouselConfig::destination_hero_defaults(),
//!     1280.0,
//!     now,
//! );
//!
//! carousel.advance(Direction::Backward, now);
//! carousel.on_transition_end();
//! assert_eq!(carousel.logical_index(), Some(4));
//! assert!(!carousel.transition_enabled());
//! carousel.on_animation_frame();
//! assert!(carousel.transition_enabled());
//! ```

pub mod animator;
pub mod autoplay;
pub mod carousel;
pub mod driver;
pub mod error;
pub mod focus;
pub mod frame;
pub mod loop_buffer;
pub mod messages;
pub mod position;
pub mod registry;
pub mod types;

pub use animator::{Easing, SnapAnimator};
pub use autoplay::{AutoplayState, AutoplayTimer};
pub use carousel::{ActiveIndexCallback, Carousel};
pub use driver::AutoplayDriver;
pub use error::{CarouselError, Result};
pub use focus::{CarouselFocus, FocusSource};
pub use frame::FrameGate;
pub use loop_buffer::{
    ListIdentity, LoopBuffer, PaddedEntry, PaddedKey, PaddedList, Region,
};
pub use messages::{CarouselMessage, update};
pub use position::{
    Layout, Offset, ScrollBehavior, ScrollSettle, Settle, TransitionTiming,
    compute_offset, index_for_scroll, jump_target, on_index_settled,
};
pub use registry::CarouselRegistry;
pub use types::*;
