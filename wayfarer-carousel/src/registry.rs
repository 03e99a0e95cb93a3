//! Registry for the carousels mounted on a page, keyed by [`CarouselKey`]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::carousel::Carousel;
use crate::error::{CarouselError, Result};
use crate::focus::CarouselFocus;
use crate::types::{CarouselConfig, CarouselKey};

/// Every carousel on a page plus the shared hover and keyboard focus.
#[derive(Debug)]
pub struct CarouselRegistry<T> {
    carousels: HashMap<CarouselKey, Carousel<T>>,
    focus: CarouselFocus,
}

impl<T> Default for CarouselRegistry<T> {
    fn default() -> Self {
        Self {
            carousels: HashMap::new(),
            focus: CarouselFocus::new(),
        }
    }
}

impl<T> CarouselRegistry<T> {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a mutable reference, mounting a new carousel with the provided
    /// factory when absent.
    pub fn get_or_insert_with<F>(
        &mut self,
        key: CarouselKey,
        init: F,
    ) -> &mut Carousel<T>
    where
        F: FnOnce() -> Carousel<T>,
    {
        self.carousels.entry(key).or_insert_with(init)
    }

    /// Mount `key` if needed and bring its slide list and viewport up to
    /// date. An existing carousel is only re-seeded when the list identity
    /// changed.
    pub fn ensure(
        &mut self,
        key: CarouselKey,
        items: Arc<[T]>,
        config: CarouselConfig,
        viewport_width: f32,
        now: Instant,
    ) -> &mut Carousel<T> {
        let hovered = self.focus.is_hovered(&key);
        let carousel = self.carousels.entry(key).or_insert_with(|| {
            tracing::debug!(target: "carousel::controller", "mounting carousel");
            Carousel::new(Arc::clone(&items), config, viewport_width, now)
        });

        if *carousel.config() != config {
            carousel.set_config(config, now);
        }
        carousel.set_items(items, now);
        carousel.set_viewport_width(viewport_width);
        if hovered && !carousel.is_paused() {
            carousel.set_paused(true, now);
        }
        carousel
    }

    /// Carousel mounted under `key`.
    pub fn get(&self, key: &CarouselKey) -> Option<&Carousel<T>> {
        self.carousels.get(key)
    }

    /// Mutable carousel mounted under `key`.
    pub fn get_mut(&mut self, key: &CarouselKey) -> Option<&mut Carousel<T>> {
        self.carousels.get_mut(key)
    }

    /// Like [`CarouselRegistry::get_mut`], with an error for unknown keys.
    pub fn try_get_mut(
        &mut self,
        key: &CarouselKey,
    ) -> Result<&mut Carousel<T>> {
        self.carousels
            .get_mut(key)
            .ok_or_else(|| CarouselError::UnknownCarousel(key.clone()))
    }

    /// Unmount and drop a carousel.
    pub fn remove(&mut self, key: &CarouselKey) -> Option<Carousel<T>> {
        self.focus.forget(key);
        let mut carousel = self.carousels.remove(key)?;
        carousel.unmount();
        Some(carousel)
    }

    /// Number of mounted carousels.
    pub fn len(&self) -> usize {
        self.carousels.len()
    }

    /// Nothing mounted.
    pub fn is_empty(&self) -> bool {
        self.carousels.is_empty()
    }

    /// Return a snapshot of all keys currently in the registry.
    pub fn keys(&self) -> Vec<CarouselKey> {
        self.carousels.keys().cloned().collect()
    }

    /// Mounted carousels in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&CarouselKey, &Carousel<T>)> {
        self.carousels.iter()
    }

    /// Hover and keyboard focus.
    pub fn focus(&self) -> &CarouselFocus {
        &self.focus
    }

    /// Mutable focus. Hover changes should go through [`CarouselRegistry::set_hovered`] so autoplay pauses.
    pub fn focus_mut(&mut self) -> &mut CarouselFocus {
        &mut self.focus
    }

    /// Move pointer hover to `key` (or nowhere). The carousel losing hover
    /// resumes autoplay and the one gaining it pauses.
    pub fn set_hovered(&mut self, key: Option<CarouselKey>, now: Instant) {
        if let Some(previous) = self.focus.set_hovered(key.clone())
            && let Some(carousel) = self.carousels.get_mut(&previous)
        {
            carousel.set_paused(false, now);
        }
        if let Some(key) = key
            && let Some(carousel) = self.carousels.get_mut(&key)
        {
            carousel.set_paused(true, now);
        }
    }

    /// Drive every carousel's clock. Returns `true` when any of them changed.
    pub fn tick_all(&mut self, now: Instant) -> bool {
        self.carousels
            .values_mut()
            .fold(false, |changed, carousel| carousel.tick(now) | changed)
    }

    /// Deliver an animation frame to every carousel.
    pub fn frame_all(&mut self) -> bool {
        self.carousels
            .values_mut()
            .fold(false, |changed, carousel| {
                carousel.on_animation_frame() | changed
            })
    }

    /// Earliest instant any carousel needs a tick.
    pub fn next_wake(&self) -> Option<Instant> {
        self.carousels.values().filter_map(Carousel::next_wake).min()
    }

    /// Unmount everything. Used on page teardown.
    pub fn clear(&mut self) {
        for carousel in self.carousels.values_mut() {
            carousel.unmount();
        }
        self.carousels.clear();
        self.focus.clear_all();
    }
}
