//! Unordered 2-tuple used to key per-pair state.

use std::hash::{Hash, Hasher};

/// Two values of the same type whose equality and hash ignore order.
///
/// `Pair::new(a, b) == Pair::new(b, a)`, and both hash identically. The
/// construction order is still kept so callers can tell which element came
/// first (a manifold's normal points from `first` to `second`).
#[derive(Debug, Clone, Copy)]
pub struct Pair<T> {
    first: T,
    second: T,
}

impl<T> Pair<T> {
    pub fn new(first: T, second: T) -> Self {
        Self { first, second }
    }

    #[inline]
    pub fn first(&self) -> &T {
        &self.first
    }

    #[inline]
    pub fn second(&self) -> &T {
        &self.second
    }

    /// The same pair with its elements in the opposite order.
    pub fn swapped(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }

    pub fn into_tuple(self) -> (T, T) {
        (self.first, self.second)
    }
}

impl<T: PartialEq> Pair<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.first == *value || self.second == *value
    }

    /// The element paired with `value`, if `value` is part of this pair.
    pub fn other(&self, value: &T) -> Option<&T> {
        if self.first == *value {
            Some(&self.second)
        } else if self.second == *value {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl<T: Ord> Pair<T> {
    /// Both elements, smallest first.
    fn ordered(&self) -> (&T, &T) {
        if self.first <= self.second {
            (&self.first, &self.second)
        } else {
            (&self.second, &self.first)
        }
    }
}

impl<T: PartialEq> PartialEq for Pair<T> {
    fn eq(&self, other: &Self) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }
}

impl<T: Eq> Eq for Pair<T> {}

impl<T: Ord + Hash> Hash for Pair<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (lo, hi) = self.ordered();
        lo.hash(state);
        hi.hash(state);
    }
}

impl<T> From<(T, T)> for Pair<T> {
    fn from((first, second): (T, T)) -> Self {
        Self::new(first, second)
    }
}
