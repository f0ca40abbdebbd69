//! Computed table for memoizing BDD operations.
//!
//! Keyed by the normalized operands of an operation. Backed by [`HashMap`],
//! so there are no collisions and the table grows as needed.

use std::collections::HashMap;
use std::hash::Hash;

use crate::reference::Ref;

/// Key of a memoized operation result.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpKey {
    Ite(Ref, Ref, Ref),
}

pub struct Cache<K, V> {
    map: HashMap<K, V>,
    hits: usize,
    misses: usize,
}

impl<K, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self::new(14)
    }
}

impl<K, V> Cache<K, V> {
    /// Creates a cache with room for `2^bits` entries before rehashing.
    pub fn new(bits: usize) -> Self {
        Self {
            map: HashMap::with_capacity(1 << bits),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq,
    V: Copy,
{
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.map.get(key) {
            Some(&v) => {
                self.hits += 1;
                Some(v)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }
}
