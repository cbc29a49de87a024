use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A scored item; greater means better.
///
/// Ordering: higher score first, then the case-folded tie-break key in
/// ascending order, then insertion order.
#[derive(Debug, Clone)]
pub struct Scored<T> {
    pub score: i64,
    key: String,
    seq: usize,
    pub item: T,
}

impl<T> PartialEq for Scored<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Scored<T> {}

impl<T> Ord for Scored<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.key.cmp(&self.key))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Scored<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the `capacity` best items seen so far.
///
/// The heap is a min-heap over [`Scored`], so the root is always the worst
/// retained item. Once full, a new item replaces the root only when it
/// compares strictly greater; otherwise it is dropped.
pub struct TopK<T> {
    capacity: usize,
    heap: BinaryHeap<Reverse<Scored<T>>>,
    seen: usize,
}

impl<T> TopK<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(1024)),
            seen: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of items offered, retained or not.
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn push(&mut self, score: i64, key: &str, item: T) {
        let candidate = Scored {
            score,
            key: key.to_lowercase(),
            seq: self.seen,
            item,
        };
        self.seen += 1;

        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(candidate));
            return;
        }
        if let Some(mut worst) = self.heap.peek_mut() {
            if candidate > worst.0 {
                *worst = Reverse(candidate);
            }
        }
    }

    /// Retained items, best first.
    pub fn into_sorted_vec(self) -> Vec<Scored<T>> {
        // Ascending over Reverse is descending over Scored.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(scored)| scored)
            .collect()
    }
}
