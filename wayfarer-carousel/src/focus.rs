//! Page-level carousel focus
//!
//! Tracks which carousel the pointer is over (its autoplay is paused) and
//! which one receives keyboard arrows.

use crate::types::CarouselKey;

/// Input that last moved focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusSource {
    /// Nothing has taken focus yet.
    #[default]
    None,
    /// Pointer hover.
    Pointer,
    /// Arrow buttons or explicit keyboard focus.
    Keyboard,
}

/// Resolution order for the keyboard target:
/// 1. `hovered_key`, the carousel under the pointer
/// 2. `keyboard_active_key`, set by arrow buttons or explicit focus
#[derive(Debug, Default, Clone)]
pub struct CarouselFocus {
    /// Carousel under the pointer.
    pub hovered_key: Option<CarouselKey>,
    /// Carousel last targeted by arrows or focus.
    pub keyboard_active_key: Option<CarouselKey>,
    /// Which input changed focus last.
    pub last_source: FocusSource,
}

impl CarouselFocus {
    /// Nothing hovered or focused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer enter (`Some`) or leave (`None`). Returns the key
    /// that lost hover, if it changed.
    pub fn set_hovered(
        &mut self,
        key: Option<CarouselKey>,
    ) -> Option<CarouselKey> {
        if self.hovered_key == key {
            return None;
        }
        if key.is_some() {
            self.last_source = FocusSource::Pointer;
        }
        std::mem::replace(&mut self.hovered_key, key)
    }

    /// Make `key` the keyboard target, or clear it.
    pub fn set_keyboard_active(&mut self, key: Option<CarouselKey>) {
        self.keyboard_active_key = key;
        self.last_source = FocusSource::Keyboard;
    }

    /// Carousel that keyboard navigation goes to.
    pub fn active_key(&self) -> Option<&CarouselKey> {
        self.hovered_key
            .as_ref()
            .or(self.keyboard_active_key.as_ref())
    }

    /// `key` would receive the next arrow key.
    pub fn is_active(&self, key: &CarouselKey) -> bool {
        self.active_key() == Some(key)
    }

    /// `key` is under the pointer.
    pub fn is_hovered(&self, key: &CarouselKey) -> bool {
        self.hovered_key.as_ref() == Some(key)
    }

    /// Forget a carousel that was unmounted.
    pub fn forget(&mut self, key: &CarouselKey) {
        if self.hovered_key.as_ref() == Some(key) {
            self.hovered_key = None;
        }
        if self.keyboard_active_key.as_ref() == Some(key) {
            self.keyboard_active_key = None;
        }
    }

    /// Forget hover and keyboard focus.
    pub fn clear_all(&mut self) {
        self.hovered_key = None;
        self.keyboard_active_key = None;
        self.last_source = FocusSource::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_wins_over_keyboard_focus() {
        let mut focus = CarouselFocus::new();
        focus.set_keyboard_active(Some(CarouselKey::PopularNow));
        assert!(focus.is_active(&CarouselKey::PopularNow));

        focus.set_hovered(Some(CarouselKey::DestinationHero));
        assert!(focus.is_active(&CarouselKey::DestinationHero));
        assert_eq!(focus.last_source, FocusSource::Pointer);

        focus.set_hovered(None);
        assert!(focus.is_active(&CarouselKey::PopularNow));
    }

    #[test]
    fn moving_hover_reports_the_previous_key() {
        let mut focus = CarouselFocus::new();
        assert_eq!(focus.set_hovered(Some(CarouselKey::UpDownCards)), None);
        assert_eq!(
            focus.set_hovered(Some(CarouselKey::EnlargingCards)),
            Some(CarouselKey::UpDownCards)
        );
        assert_eq!(focus.set_hovered(Some(CarouselKey::EnlargingCards)), None);
    }

    #[test]
    fn forget_drops_both_targets() {
        let mut focus = CarouselFocus::new();
        focus.set_keyboard_active(Some(CarouselKey::FeatureCarousel));
        focus.set_hovered(Some(CarouselKey::FeatureCarousel));
        focus.forget(&CarouselKey::FeatureCarousel);
        assert_eq!(focus.active_key(), None);
    }
}
