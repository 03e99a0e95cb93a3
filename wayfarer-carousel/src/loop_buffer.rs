//! Clone padding for seamless looping.
//!
//! A logical list of `N` slides is extended with `pad` copies of its tail in
//! front and `pad` copies of its head behind, so panning one slide past
//! either edge never reveals empty space. Copies are references into the
//! caller's list; the slides themselves are never cloned.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::types::sanitize_window_size;

/// Below this many slides looping is disabled: cloning would only reduce
/// the usable content.
pub const MIN_LOOP_ITEMS: usize = 3;

/// Number of clones needed on each side for `len` slides and a visible
/// window of `window_size` slides.
pub fn pad_for(len: usize, window_size: f32) -> usize {
    if len < MIN_LOOP_ITEMS {
        return 0;
    }
    let window = sanitize_window_size(window_size).ceil() as usize;
    len.min(window.max(1))
}

/// Build the padded list for `items`. Pure and O(N); callers memoize it via
/// [`LoopBuffer`].
pub fn build<T>(items: Arc<[T]>, window_size: f32) -> PaddedList<T> {
    let len = items.len();
    let pad = pad_for(len, window_size);

    let mut map = Vec::with_capacity(len + 2 * pad);
    map.extend(len - pad..len);
    map.extend(0..len);
    map.extend(0..pad);

    PaddedList { items, pad, map }
}

/// Position of a padded entry relative to the logical run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Clone of the logical tail placed before the first slide.
    Leading,
    /// One of the caller's own slides.
    Logical,
    /// Clone of the logical head placed after the last slide.
    Trailing,
}

/// Render key for a padded entry. Derived from the caller's own per-slide key
/// so that repeated content still yields unique keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaddedKey<K> {
    /// Key the caller gave the underlying slide.
    pub base: K,
    /// Which run the entry sits in.
    pub region: Region,
    /// Index of the entry within its clone run; always 0 for logical entries.
    pub run_index: usize,
}

impl<K: fmt::Display> fmt::Display for PaddedKey<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.region {
            Region::Logical => write!(f, "{}", self.base),
            Region::Leading => {
                write!(f, "{}-lead-{}", self.base, self.run_index)
            }
            Region::Trailing => {
                write!(f, "{}-trail-{}", self.base, self.run_index)
            }
        }
    }
}

/// One entry of a [`PaddedList`].
#[derive(Debug)]
pub struct PaddedEntry<'a, T> {
    /// The slide, borrowed from the caller's list.
    pub item: &'a T,
    /// Position in the padded list.
    pub display_index: usize,
    /// Position of the slide in the caller's list.
    pub logical_index: usize,
    /// Which run the entry sits in.
    pub region: Region,
    /// Index within its clone run; 0 for logical entries.
    pub run_index: usize,
}

impl<T> Clone for PaddedEntry<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PaddedEntry<'_, T> {}

/// Logical slides plus clone padding on both ends.
///
/// Invariant: `get(pad + i)` is the very same slide as `logical()[i]`.
#[derive(Debug)]
pub struct PaddedList<T> {
    items: Arc<[T]>,
    pad: usize,
    map: Vec<usize>,
}

impl<T> Clone for PaddedList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            pad: self.pad,
            map: self.map.clone(),
        }
    }
}

impl<T> PaddedList<T> {
    /// Number of rendered entries, clones included.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// No slides at all.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clones on each side.
    pub fn pad(&self) -> usize {
        self.pad
    }

    /// Number of the caller's slides.
    pub fn logical_len(&self) -> usize {
        self.items.len()
    }

    /// Clones are present; fewer than three slides wrap by rewinding instead.
    pub fn is_looping(&self) -> bool {
        self.pad > 0
    }

    /// The caller's slides, in order.
    pub fn logical(&self) -> &[T] {
        &self.items
    }

    /// The shared list the entries borrow from.
    pub fn items(&self) -> &Arc<[T]> {
        &self.items
    }

    /// Display indices that address the logical run.
    pub fn logical_range(&self) -> Range<usize> {
        self.pad..self.pad + self.items.len()
    }

    /// Display index of a logical slide inside the logical run.
    pub fn canonical_display(&self, logical_index: usize) -> usize {
        self.pad + logical_index
    }

    /// Slide rendered at `display_index`.
    pub fn get(&self, display_index: usize) -> Option<&T> {
        self.map
            .get(display_index)
            .and_then(|logical| self.items.get(*logical))
    }

    /// Slide at `display_index` with its logical position and region.
    pub fn entry(&self, display_index: usize) -> Option<PaddedEntry<'_, T>> {
        let logical_index = *self.map.get(display_index)?;
        let item = self.items.get(logical_index)?;
        let logical_end = self.pad + self.items.len();
        let (region, run_index) = if display_index < self.pad {
            (Region::Leading, display_index)
        } else if display_index >= logical_end {
            (Region::Trailing, display_index - logical_end)
        } else {
            (Region::Logical, 0)
        };
        Some(PaddedEntry {
            item,
            display_index,
            logical_index,
            region,
            run_index,
        })
    }

    /// Every entry in render order.
    pub fn iter(&self) -> impl Iterator<Item = PaddedEntry<'_, T>> + '_ {
        (0..self.map.len()).filter_map(move |i| self.entry(i))
    }

    /// Unique render keys for every entry, derived from `key_of`.
    pub fn keys<K, F>(&self, mut key_of: F) -> Vec<PaddedKey<K>>
    where
        F: FnMut(&T) -> K,
    {
        self.iter()
            .map(|entry| PaddedKey {
                base: key_of(entry.item),
                region: entry.region,
                run_index: entry.run_index,
            })
            .collect()
    }

    /// Logical index for any display index, including the transient values
    /// one step outside the padded list. `None` for an empty list.
    pub fn logical_index(&self, display_index: isize) -> Option<usize> {
        wrap_logical(display_index, self.pad, self.items.len())
    }
}

/// `(display - pad) mod len`, wrapped into `[0, len)`.
pub fn wrap_logical(display_index: isize, pad: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let shifted = display_index - pad as isize;
    Some(shifted.rem_euclid(len as isize) as usize)
}

/// Identity of a caller's slide list. Two lists are the same only when they
/// share an allocation and length, or when the caller supplies matching keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListIdentity {
    ptr: usize,
    len: usize,
    key: Option<u64>,
}

impl ListIdentity {
    /// Identity of an `Arc` allocation.
    pub fn of<T>(items: &Arc<[T]>) -> Self {
        Self {
            ptr: Arc::as_ptr(items).cast::<()>() as usize,
            len: items.len(),
            key: None,
        }
    }

    /// Identity driven by a caller-supplied data key instead of the
    /// allocation, for callers that rebuild an equal list on every render.
    pub fn keyed(len: usize, key: u64) -> Self {
        Self {
            ptr: 0,
            len,
            key: Some(key),
        }
    }
}

/// Memoized padded list: rebuilt only when the list identity or the pad size
/// changes.
#[derive(Debug)]
pub struct LoopBuffer<T> {
    list: PaddedList<T>,
    identity: ListIdentity,
}

impl<T> LoopBuffer<T> {
    /// Build the padded list for `items` right away.
    pub fn new(items: Arc<[T]>, window_size: f32) -> Self {
        let identity = ListIdentity::of(&items);
        Self {
            list: build(items, window_size),
            identity,
        }
    }

    /// Current padded list.
    pub fn list(&self) -> &PaddedList<T> {
        &self.list
    }

    /// Identity the current list was built from.
    pub fn identity(&self) -> ListIdentity {
        self.identity
    }

    /// Bring the buffer in line with `items`. Returns `true` when the padded
    /// list was rebuilt.
    pub fn sync(
        &mut self,
        items: Arc<[T]>,
        identity: ListIdentity,
        window_size: f32,
    ) -> bool {
        let pad = pad_for(items.len(), window_size);
        if identity == self.identity && pad == self.list.pad {
            return false;
        }
        tracing::debug!(
            target: "carousel::loop_buffer",
            len = items.len(),
            pad,
            "rebuilding padded list"
        );
        self.list = build(items, window_size);
        self.identity = identity;
        true
    }
}
