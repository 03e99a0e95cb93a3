//! Message types for carousel interactions and their dispatch onto a
//! [`CarouselRegistry`].

use std::time::Instant;

use crate::error::{CarouselError, Result};
use crate::registry::CarouselRegistry;
use crate::types::{CarouselKey, Direction};

/// Everything a host can tell a page of carousels.
#[derive(Debug, Clone, PartialEq)]
pub enum CarouselMessage {
    // Navigation
    /// Arrow button: one slide forward.
    Next(CarouselKey),
    /// Arrow button: one slide back.
    Prev(CarouselKey),
    /// Indicator dot: go to a logical slide, wrapped into range.
    JumpTo(CarouselKey, isize),
    // Active-context navigation (keyboard arrows)
    /// Keyboard right arrow on whichever carousel is active.
    NextActive,
    /// Keyboard left arrow on whichever carousel is active.
    PrevActive,

    // Focus
    /// Pointer entered; pauses autoplay.
    PointerEnter(CarouselKey),
    /// Pointer left; resumes autoplay.
    PointerLeave(CarouselKey),
    /// Keyboard focus moved onto the carousel.
    FocusKey(CarouselKey),
    /// Keyboard focus left the carousel.
    BlurKey(CarouselKey),

    // Host reports
    /// The track's CSS transition ended.
    TransitionEnd(CarouselKey),
    /// Native scroll position, `scrollLeft` in pixels.
    Scrolled(CarouselKey, f32),
    /// Native `scrollend`.
    ScrollEnd(CarouselKey),
    /// New viewport width in pixels.
    Resized(CarouselKey, f32),
    /// A frame was painted.
    AnimationFrame,
    /// Clock tick for timers and settle fallbacks.
    Tick,
    /// Autoplay fired on an external driver.
    AutoAdvance(CarouselKey),
    /// The block left the page.
    Unmount(CarouselKey),
}

/// Apply `message` at `now`. Returns `true` when some carousel's visible
/// state changed and the host should re-render.
pub fn update<T>(
    registry: &mut CarouselRegistry<T>,
    message: CarouselMessage,
    now: Instant,
) -> Result<bool> {
    tracing::trace!(target: "carousel::controller", ?message, "carousel message");
    let changed = match message {
        CarouselMessage::Next(key) => {
            registry.focus_mut().set_keyboard_active(Some(key.clone()));
            registry.try_get_mut(&key)?.advance(Direction::Forward, now)
        }
        CarouselMessage::Prev(key) => {
            registry.focus_mut().set_keyboard_active(Some(key.clone()));
            registry.try_get_mut(&key)?.advance(Direction::Backward, now)
        }
        CarouselMessage::JumpTo(key, index) => {
            registry.try_get_mut(&key)?.jump_to(index, now)
        }
        CarouselMessage::NextActive => {
            advance_active(registry, Direction::Forward, now)?
        }
        CarouselMessage::PrevActive => {
            advance_active(registry, Direction::Backward, now)?
        }
        CarouselMessage::PointerEnter(key) => {
            registry.try_get_mut(&key)?;
            registry.set_hovered(Some(key), now);
            false
        }
        CarouselMessage::PointerLeave(key) => {
            if registry.focus().is_hovered(&key) {
                registry.set_hovered(None, now);
            }
            false
        }
        CarouselMessage::FocusKey(key) => {
            registry.try_get_mut(&key)?;
            registry.focus_mut().set_keyboard_active(Some(key));
            false
        }
        CarouselMessage::BlurKey(key) => {
            if registry.focus().keyboard_active_key.as_ref() == Some(&key) {
                registry.focus_mut().set_keyboard_active(None);
            }
            false
        }
        CarouselMessage::TransitionEnd(key) => {
            registry.try_get_mut(&key)?.on_transition_end()
        }
        CarouselMessage::Scrolled(key, left) => {
            registry.try_get_mut(&key)?.on_scroll(left, now);
            false
        }
        CarouselMessage::ScrollEnd(key) => {
            registry.try_get_mut(&key)?.on_scroll_end()
        }
        CarouselMessage::Resized(key, width) => {
            let carousel = registry.try_get_mut(&key)?;
            let before = carousel.offset();
            carousel.set_viewport_width(width);
            carousel.offset() != before
        }
        CarouselMessage::AnimationFrame => registry.frame_all(),
        CarouselMessage::Tick => registry.tick_all(now),
        CarouselMessage::AutoAdvance(key) => {
            registry.try_get_mut(&key)?.auto_advance(now)
        }
        CarouselMessage::Unmount(key) => registry
            .remove(&key)
            .map(|_| true)
            .ok_or(CarouselError::UnknownCarousel(key))?,
    };
    Ok(changed)
}

fn advance_active<T>(
    registry: &mut CarouselRegistry<T>,
    direction: Direction,
    now: Instant,
) -> Result<bool> {
    let Some(key) = registry.focus().active_key().cloned() else {
        return Ok(false);
    };
    Ok(registry.try_get_mut(&key)?.advance(direction, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CarouselConfig;
    use std::sync::Arc;

    fn mounted(keys: &[CarouselKey], now: Instant) -> CarouselRegistry<char> {
        let items: Arc<[char]> = "ABCDE".chars().collect::<Vec<_>>().into();
        let config = CarouselConfig {
            item_stride: 100.0,
            autoplay_ms: Some(1_000),
            ..CarouselConfig::default()
        };
        let mut registry = CarouselRegistry::new();
        for key in keys {
            registry.ensure(key.clone(), Arc::clone(&items), config, 800.0, now);
        }
        registry
    }

    #[test]
    fn unknown_keys_are_reported() {
        let t0 = Instant::now();
        let mut registry = mounted(&[], t0);
        let err = update(&mut registry, CarouselMessage::Next(CarouselKey::PopularNow), t0)
            .unwrap_err();
        assert!(matches!(err, CarouselError::UnknownCarousel(CarouselKey::PopularNow)));
    }

    #[test]
    fn keyboard_arrows_follow_hover_then_last_clicked() {
        let t0 = Instant::now();
        let hero = CarouselKey::DestinationHero;
        let cards = CarouselKey::PopularNow;
        let mut registry = mounted(&[hero.clone(), cards.clone()], t0);

        assert!(!update(&mut registry, CarouselMessage::NextActive, t0).unwrap());

        update(&mut registry, CarouselMessage::Next(cards.clone()), t0).unwrap();
        update(&mut registry, CarouselMessage::PointerEnter(hero.clone()), t0).unwrap();
        assert!(update(&mut registry, CarouselMessage::PrevActive, t0).unwrap());
        assert_eq!(registry.get(&hero).unwrap().logical_index(), Some(4));
        assert!(registry.get(&hero).unwrap().is_paused());

        update(&mut registry, CarouselMessage::PointerLeave(hero.clone()), t0).unwrap();
        assert!(!registry.get(&hero).unwrap().is_paused());
        assert!(update(&mut registry, CarouselMessage::NextActive, t0).unwrap());
        assert_eq!(registry.get(&cards).unwrap().logical_index(), Some(2));
    }

    #[test]
    fn unmount_removes_the_carousel() {
        let t0 = Instant::now();
        let key = CarouselKey::FeatureCarousel;
        let mut registry = mounted(&[key.clone()], t0);
        assert!(update(&mut registry, CarouselMessage::Unmount(key.clone()), t0).unwrap());
        assert!(registry.is_empty());
        assert!(update(&mut registry, CarouselMessage::Unmount(key), t0).is_err());
    }
}
