//! Order-preserving slice helpers.

use fxhash::FxHashSet;
use std::hash::Hash;

/// Removes duplicate elements, keeping the first occurrence of each.
#[must_use]
pub fn dedup<T: Eq + Hash + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = FxHashSet::default();
    items.iter().filter(|item| seen.insert((*item).clone())).cloned().collect()
}

/// Removes every occurrence of `element`.
#[must_use]
pub fn remove<T: PartialEq + Clone>(items: &[T], element: &T) -> Vec<T> {
    items.iter().filter(|item| *item != element).cloned().collect()
}

/// Whether the slice contains `element`.
#[must_use]
pub fn contains<T: PartialEq>(items: &[T], element: &T) -> bool {
    items.iter().any(|item| item == element)
}

/// Elements of `a` that do not appear in `b`, in `a`'s order.
#[must_use]
pub fn difference<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    a.iter().filter(|item| !contains(b, item)).cloned().collect()
}

/// Elements of `a` that also appear in `b`, in `a`'s order.
#[must_use]
pub fn intersection<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    a.iter().filter(|item| contains(b, item)).cloned().collect()
}

/// All elements of `a` and `b` without duplicates, first occurrence wins.
#[must_use]
pub fn union_of<T: Eq + Hash + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut seen = FxHashSet::default();
    a.iter().chain(b.iter()).filter(|item| seen.insert((*item).clone())).cloned().collect()
}
