//! Layered configuration merging.

use std::collections::HashMap;
use std::hash::Hash;

/// Combine two layers of configuration, `other` taking precedence.
///
/// Fields left unspecified in `other` must not clobber values set in `self`,
/// which is why config structs keep their fields as `Option`s.
pub trait Merge {
    fn merge(self, other: Self) -> Self;
}

impl<T> Merge for Option<T> {
    fn merge(self, other: Self) -> Self {
        other.or(self)
    }
}

impl<K: Eq + Hash, V> Merge for HashMap<K, V> {
    fn merge(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}
