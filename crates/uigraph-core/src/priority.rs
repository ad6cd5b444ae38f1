//! Priority ordering for scheduling.
//!
//! A scheduler keeps candidate actions in a [`PriorityQueue`] and pops the
//! most important one. Equal priorities pop in insertion order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Capability of anything a scheduler can rank.
pub trait PriorityNode {
    /// Current priority. Higher is more important.
    fn priority(&self) -> i32 {
        0
    }
}

impl<T: PriorityNode + ?Sized> PriorityNode for &T {
    fn priority(&self) -> i32 {
        (**self).priority()
    }
}

impl<T: PriorityNode + ?Sized> PriorityNode for std::sync::Arc<T> {
    fn priority(&self) -> i32 {
        (**self).priority()
    }
}

/// Adapter ordering values solely by [`PriorityNode::priority`].
#[derive(Debug, Clone, Copy)]
pub struct ByPriority<T>(pub T);

impl<T: PriorityNode> PartialEq for ByPriority<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.priority() == other.0.priority()
    }
}

impl<T: PriorityNode> Eq for ByPriority<T> {}

impl<T: PriorityNode> PartialOrd for ByPriority<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: PriorityNode> Ord for ByPriority<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.priority().cmp(&other.0.priority())
    }
}

#[derive(Debug)]
struct Entry<T> {
    priority: i32,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Max-heap: higher priority first, then lower sequence number first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Max-priority queue with FIFO tie-break.
///
/// The priority is read once, when an item is pushed. Re-push an item after
/// its priority changes.
#[derive(Debug)]
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T: PriorityNode> PriorityQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        let priority = item.priority();
        self.heap.push(Entry {
            priority,
            seq: self.next_seq,
            item,
        });
        self.next_seq += 1;
    }

    /// Remove and return the highest-priority item.
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.heap.peek().map(|entry| &entry.item)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Drain every item, highest priority first.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut items = Vec::with_capacity(self.heap.len());
        while let Some(item) = self.pop() {
            items.push(item);
        }
        items
    }
}

impl<T: PriorityNode> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PriorityNode> Extend<T> for PriorityQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T: PriorityNode> FromIterator<T> for PriorityQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}
