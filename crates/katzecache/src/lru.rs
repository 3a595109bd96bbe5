//! LRU (Least Recently Used) cache bounded by entry count and total cost
//!
//! Uses an index-linked list over a slab of nodes for O(1) promotion and eviction.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use ahash::RandomState;

/// Node in the LRU doubly-linked list
struct Node<K, V> {
    key: K,
    value: V,
    cost: usize,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU cache with a maximum entry count and a maximum total cost
pub struct LruCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    max_entries: usize,
    max_cost: usize,
    total_cost: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given limits
    pub fn new(max_entries: usize, max_cost: usize) -> Self {
        assert!(max_entries > 0, "Entry limit must be greater than 0");
        assert!(max_cost > 0, "Cost limit must be greater than 0");

        Self {
            map: HashMap::with_hasher(RandomState::new()),
            nodes: Vec::new(),
            head: None,
            tail: None,
            free_list: Vec::new(),
            max_entries,
            max_cost,
            total_cost: 0,
        }
    }

    /// Get a value from the cache, marking it most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(&idx) = self.map.get(key) {
            self.move_to_front(idx);
            self.nodes[idx].as_ref().map(|node| &node.value)
        } else {
            None
        }
    }

    /// Check for a key without touching recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Insert a key-value pair carrying `cost`
    ///
    /// Returns the number of entries evicted to make room. A value whose cost
    /// alone exceeds the cost limit is not stored; any previous value under
    /// the same key is dropped.
    pub fn put(&mut self, key: K, value: V, cost: usize) -> usize {
        if cost > self.max_cost {
            self.remove(&key);
            return 0;
        }

        if let Some(&idx) = self.map.get(&key) {
            // Update existing
            if let Some(node) = &mut self.nodes[idx] {
                self.total_cost = self.total_cost - node.cost + cost;
                node.value = value;
                node.cost = cost;
            }
            self.move_to_front(idx);
            return self.evict_over_limits(Some(idx));
        }

        // Make room first so the new entry is never its own victim
        let mut evicted = 0;
        while !self.map.is_empty()
            && (self.map.len() >= self.max_entries || self.total_cost + cost > self.max_cost)
        {
            self.evict();
            evicted += 1;
        }

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            cost,
            prev: None,
            next: self.head,
        });

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }

        self.map.insert(key, idx);
        self.total_cost += cost;

        evicted
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(idx) = self.map.remove(key) {
            self.unlink(idx);
            self.free_node(idx);
            self.nodes[idx].take().map(|node| {
                self.total_cost -= node.cost;
                node.value
            })
        } else {
            None
        }
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Sum of the costs of all entries
    pub fn total_cost(&self) -> usize {
        self.total_cost
    }

    /// Entry count limit
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Total cost limit
    pub fn max_cost(&self) -> usize {
        self.max_cost
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.total_cost = 0;
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return; // Already at front
        }

        self.unlink(idx);

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = if let Some(node) = &self.nodes[idx] {
            (node.prev, node.next)
        } else {
            return;
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    /// Evict from the tail until the cost limit holds, sparing `keep`
    fn evict_over_limits(&mut self, keep: Option<usize>) -> usize {
        let mut evicted = 0;
        while self.total_cost > self.max_cost && self.tail.is_some() && self.tail != keep {
            self.evict();
            evicted += 1;
        }
        evicted
    }

    fn evict(&mut self) {
        if let Some(tail_idx) = self.tail {
            self.unlink(tail_idx);
            if let Some(node) = self.nodes[tail_idx].take() {
                self.map.remove(&node.key);
                self.total_cost -= node.cost;
                self.free_node(tail_idx);
            }
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }
}
