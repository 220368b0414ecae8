//! String interner for name deduplication.
//!
//! Field names, attached-function names, package paths and map keys are
//! interned into a shared pool and passed around as u32 indices (Atoms).
//! Record field lookup and map-key comparison become integer comparisons
//! instead of string comparisons.

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `ShardedInterner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

const SHARD_BITS: u32 = 6;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

#[derive(Default)]
struct ShardState {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

struct InternerShard {
    state: RwLock<ShardState>,
}

impl InternerShard {
    fn new() -> Self {
        InternerShard {
            state: RwLock::new(ShardState::default()),
        }
    }
}

/// Sharded string interner for concurrent use.
///
/// Uses fixed buckets to reduce lock contention while keeping Atom lookups O(1).
/// A poisoned shard lock is recovered rather than propagated: the shard state
/// is append-only, so a panic mid-insert can at worst leave an unreachable
/// string behind.
pub struct ShardedInterner {
    shards: [InternerShard; SHARD_COUNT],
}

impl ShardedInterner {
    /// Create a new sharded interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let shards: [InternerShard; SHARD_COUNT] = std::array::from_fn(|_| InternerShard::new());
        {
            let mut state = shards[0]
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let empty: Arc<str> = Arc::from("");
            state.strings.push(empty.clone());
            state.map.insert(empty, Atom::NONE);
        }
        ShardedInterner { shards }
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        let shard_idx = Self::shard_for(s);
        let shard = &self.shards[shard_idx];
        if let Some(&atom) = shard
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .get(s)
        {
            return atom;
        }

        let mut state = shard.state.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race between the read and write locks.
        if let Some(&atom) = state.map.get(s) {
            return atom;
        }

        let local_index = state.strings.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) {
            return Atom::NONE;
        }

        let atom = Self::make_atom(local_index, shard_idx as u32);
        let owned: Arc<str> = Arc::from(s);
        state.strings.push(owned.clone());
        state.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Returns empty string if atom is out of bounds.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    /// Try to resolve an Atom, returning None if invalid.
    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let (shard_idx, local_index) = Self::split_atom(atom);
        let shard = self.shards.get(shard_idx)?;
        let state = shard.state.read().unwrap_or_else(PoisonError::into_inner);
        state.strings.get(local_index).cloned()
    }

    /// Get the number of interned strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .state
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .strings
                    .len()
            })
            .sum()
    }

    /// Check if the interner is empty (only has the empty string).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }

    #[inline]
    fn make_atom(local_index: u32, shard_idx: u32) -> Atom {
        Atom((local_index << SHARD_BITS) | (shard_idx & SHARD_MASK))
    }

    #[inline]
    fn split_atom(atom: Atom) -> (usize, usize) {
        if atom == Atom::NONE {
            return (0, 0);
        }

        let raw = atom.0;
        let shard_idx = (raw & SHARD_MASK) as usize;
        let local_index = (raw >> SHARD_BITS) as usize;
        (shard_idx, local_index)
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_atom() {
        let interner = ShardedInterner::new();
        let a = interner.intern("label");
        let b = interner.intern("label");
        assert_eq!(a, b);
        assert_eq!(&*interner.resolve(a), "label");
    }

    #[test]
    fn empty_string_is_none_atom() {
        let interner = ShardedInterner::new();
        assert_eq!(interner.intern(""), Atom::NONE);
        assert!(interner.intern("").is_none());
        assert_eq!(&*interner.resolve(Atom::NONE), "");
        assert!(interner.is_empty());
    }

    #[test]
    fn distinct_strings_distinct_atoms() {
        let interner = ShardedInterner::new();
        let x = interner.intern("x");
        let y = interner.intern("y");
        assert_ne!(x, y);
        assert_eq!(&*interner.resolve(y), "y");
        assert_eq!(interner.len(), 3);
    }

    #[test]
    fn unknown_atom_resolves_to_empty() {
        let interner = ShardedInterner::new();
        assert!(interner.try_resolve(Atom(12_345 << SHARD_BITS)).is_none());
        assert_eq!(&*interner.resolve(Atom(12_345 << SHARD_BITS)), "");
    }
}
