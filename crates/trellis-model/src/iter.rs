//! Opaque row iterators and model identity.
//!
//! A [`TreeIter`] is a cheap, copyable handle to one row of one store at one
//! generation. It pairs the store's generation stamp with an arena key, so a
//! stale handle can never dereference freed row storage: the stamp catches
//! iterators from before the last structural mutation, and the slotmap key's
//! own per-slot generation catches anything that slips past.

use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::new_key_type;
use static_assertions::assert_impl_all;

new_key_type! {
    /// Arena key for one row slot inside a store.
    ///
    /// Keys are generational: once a row is removed and its slot reused, old
    /// keys no longer resolve.
    pub struct RowKey;
}

/// An opaque handle denoting a row at a point in time.
///
/// Iterators are produced by a model and are only meaningful to the model
/// that produced them. An iterator stays valid across value-only edits
/// ([`set_value`](crate::ListStore::set_value)) but is invalidated by any
/// structural mutation (insert, remove, reorder, clear); check with
/// [`TreeModel::iter_is_valid`](crate::TreeModel::iter_is_valid) or simply
/// let the next model call report
/// [`ModelError::InvalidIterator`](crate::ModelError::InvalidIterator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TreeIter {
    stamp: u64,
    key: RowKey,
}

impl TreeIter {
    /// The canonical invalid iterator: stamp 0 matches no live store.
    pub fn invalid() -> Self {
        Self {
            stamp: 0,
            key: RowKey::default(),
        }
    }

    pub(crate) fn new(stamp: u64, key: RowKey) -> Self {
        debug_assert_ne!(stamp, 0, "live stamps are never zero");
        Self { stamp, key }
    }

    pub(crate) fn stamp(&self) -> u64 {
        self.stamp
    }

    pub(crate) fn key(&self) -> RowKey {
        self.key
    }
}

impl Default for TreeIter {
    fn default() -> Self {
        Self::invalid()
    }
}

assert_impl_all!(TreeIter: Send, Sync, Copy);

/// Process-unique identity of one model instance.
///
/// Used to tag row-drag payloads with their source model so a drop target
/// can tell same-model reorders from cross-model drops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelId(u64);

impl ModelId {
    /// Allocates a fresh id.
    pub(crate) fn allocate() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Seeds a store's generation stamp.
///
/// Stamps are per-instance, never zero, and spread by a large odd stride so
/// two stores created back to back do not share stamp ranges. An iterator
/// from one store therefore does not accidentally validate against another.
pub(crate) fn next_stamp_seed() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(0x9E37_79B9_7F4A_7C15);
    let seed = NEXT.fetch_add(0x9E37_79B9, Ordering::Relaxed);
    if seed == 0 { 1 } else { seed }
}

/// Advances a stamp past a structural mutation, skipping 0.
pub(crate) fn bump_stamp(stamp: u64) -> u64 {
    let next = stamp.wrapping_add(1);
    if next == 0 { 1 } else { next }
}
