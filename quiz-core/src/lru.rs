//! Byte-budgeted LRU index.
//!
//! Entries carry a caller-supplied byte cost. After every insert the
//! least-recently-used entries are evicted until the total cost fits the
//! budget again. Recency is tracked with a logical clock: each access takes
//! the next tick, and the oldest tick is the eviction candidate.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    cost: usize,
    tick: u64,
}

/// LRU map bounded by the total byte cost of its values.
#[derive(Debug, Clone)]
pub struct ByteLru<K, V> {
    budget: usize,
    total: usize,
    clock: u64,
    entries: HashMap<K, Entry<V>>,
    /// Access order: tick -> key, oldest first.
    order: BTreeMap<u64, K>,
}

impl<K, V> ByteLru<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty index holding at most `budget` bytes.
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            total: 0,
            clock: 0,
            entries: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    /// Insert or replace an entry, returning whatever was evicted.
    ///
    /// An entry whose cost alone exceeds the budget is not held; any
    /// previous entry under the same key is dropped instead.
    pub fn insert(&mut self, key: K, value: V, cost: usize) -> Vec<(K, V)> {
        self.remove(&key);

        if cost > self.budget {
            return Vec::new();
        }

        let tick = self.tick();
        self.order.insert(tick, key.clone());
        self.entries.insert(key, Entry { value, cost, tick });
        self.total += cost;

        let mut evicted = Vec::new();
        while self.total > self.budget {
            match self.pop_oldest() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    /// Look up an entry and mark it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let tick = self.tick();
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.tick);
        self.order.insert(tick, key.clone());
        entry.tick = tick;
        Some(&entry.value)
    }

    /// Look up an entry without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.tick);
        self.total -= entry.cost;
        Some(entry.value)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.total = 0;
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the costs of all held entries.
    pub fn total_bytes(&self) -> usize {
        self.total
    }

    /// The byte budget.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.order.values()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn pop_oldest(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let entry = self.entries.remove(&key)?;
        self.total -= entry.cost;
        Some((key, entry.value))
    }
}
