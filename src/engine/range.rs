//! Key ranges for scans and compaction.

use std::ops::Bound;

/// A contiguous range of keys in bytewise order.
///
/// [`KeyRange::new`] follows compact-range conventions: a missing begin sorts
/// before every key, a missing end after every key, and both given ends are
/// inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    begin: Bound<Vec<u8>>,
    end: Bound<Vec<u8>>,
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::all()
    }
}

impl KeyRange {
    /// The whole key space.
    pub const fn all() -> Self {
        Self {
            begin: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Range from `begin` to `end`, both inclusive; `None` is unbounded.
    pub fn new(begin: Option<&[u8]>, end: Option<&[u8]>) -> Self {
        Self {
            begin: begin.map_or(Bound::Unbounded, |b| Bound::Included(b.to_vec())),
            end: end.map_or(Bound::Unbounded, |e| Bound::Included(e.to_vec())),
        }
    }

    /// Every key starting with `prefix`.
    pub fn prefix(prefix: &[u8]) -> Self {
        let end = prefix_successor(prefix).map_or(Bound::Unbounded, Bound::Excluded);
        Self {
            begin: Bound::Included(prefix.to_vec()),
            end,
        }
    }

    /// Borrowed bounds, usable with ordered maps and redb ranges.
    pub fn bounds(&self) -> (Bound<&[u8]>, Bound<&[u8]>) {
        (
            self.begin.as_ref().map(Vec::as_slice),
            self.end.as_ref().map(Vec::as_slice),
        )
    }

    /// Returns true if both ends are unbounded.
    pub fn is_unbounded(&self) -> bool {
        matches!(
            (&self.begin, &self.end),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }

    /// Returns true if no key can fall inside the range.
    pub fn is_empty(&self) -> bool {
        match (&self.begin, &self.end) {
            (Bound::Included(b), Bound::Included(e)) => b > e,
            (Bound::Included(b) | Bound::Excluded(b), Bound::Excluded(e))
            | (Bound::Excluded(b), Bound::Included(e)) => b >= e,
            _ => false,
        }
    }

    /// Returns true if `key` falls inside the range.
    pub fn contains(&self, key: &[u8]) -> bool {
        let above = match &self.begin {
            Bound::Included(b) => key >= b.as_slice(),
            Bound::Excluded(b) => key > b.as_slice(),
            Bound::Unbounded => true,
        };
        let below = match &self.end {
            Bound::Included(e) => key <= e.as_slice(),
            Bound::Excluded(e) => key < e.as_slice(),
            Bound::Unbounded => true,
        };
        above && below
    }
}

/// Smallest key greater than every key starting with `prefix`.
///
/// `None` when no such key exists (empty prefix or all `0xff`).
fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}
