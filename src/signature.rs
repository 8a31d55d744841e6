//! # Signature
//!
//! A fixed-width bitset over component IDs. Every entity owns one,
//! tracking which component types are currently attached to it; every
//! group owns a few, describing which component types it cares about.

use crate::component::{ComponentId, MAX_COMPONENTS};

/// A 64-bit bitset indexed by [`ComponentId`], one bit per component type.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature(u64);

impl Signature {
    /// An empty signature, no bits set.
    pub const EMPTY: Signature = Signature(0);

    /// Sets or clears the bit for `id`.
    #[inline]
    pub fn set(&mut self, id: ComponentId, value: bool) {
        debug_assert!((id.0 as usize) < MAX_COMPONENTS);
        if value {
            self.0 |= 1u64 << id.0;
        } else {
            self.0 &= !(1u64 << id.0);
        }
    }

    /// Returns a copy of this signature with bit `id` set.
    #[inline]
    #[must_use]
    pub fn with(mut self, id: ComponentId) -> Self {
        self.set(id, true);
        self
    }

    /// Tests whether bit `id` is set.
    #[inline]
    #[must_use]
    pub fn test(&self, id: ComponentId) -> bool {
        (self.0 >> id.0) & 1 != 0
    }

    /// Returns `true` if `self` contains no set bits.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Bitwise AND of two signatures.
    #[inline]
    #[must_use]
    pub fn intersection(&self, other: &Signature) -> Signature {
        Signature(self.0 & other.0)
    }

    /// Subset test: `self.contains(other)` iff every bit set in `other` is
    /// also set in `self`, i.e. `(self & other) == other`.
    #[inline]
    #[must_use]
    pub fn contains(&self, other: &Signature) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitAnd for Signature {
    type Output = Signature;

    fn bitand(self, rhs: Self) -> Self::Output {
        Signature(self.0 & rhs.0)
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({:064b})", self.0)
    }
}
