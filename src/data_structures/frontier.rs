use std::cmp::min;
use std::fmt::Debug;

use crate::heap_primitives::arg_min;

const HEAP_ARITY: usize = 4usize;
#[inline(always)]
#[must_use]
fn up(i: usize) -> usize {
    crate::heap_primitives::index_parent::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_left(i: usize) -> usize {
    crate::heap_primitives::index_first_child::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_right(i: usize) -> usize {
    crate::heap_primitives::index_last_child::<HEAP_ARITY>(i)
}

/// Open list of a best-first search.
///
/// A 4-ary min-heap, `pop` returns the smallest element. Elements comparing
/// equal come out in no particular order, so ranks that need a stable order
/// must carry their own tie-breaker.
///
/// Duplicates are welcome, nothing is ever looked up or re-ranked.
#[derive(Debug)]
pub struct Frontier<T>
where
    T: Debug + Ord,
{
    heap: Vec<T>,
    /// Largest `len()` seen so far.
    peak: usize,
}

impl<T> Frontier<T>
where
    T: Debug + Ord,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: vec![],
            peak: 0,
        }
    }
    #[must_use]
    pub fn with_capacity(s: usize) -> Self {
        Self {
            heap: Vec::with_capacity(s),
            peak: 0,
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    #[inline(always)]
    pub fn peak_len(&self) -> usize {
        self.peak
    }

    #[cfg(test)]
    pub(crate) fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    pub fn push(&mut self, n: T) {
        #[cfg(feature = "coz_profile")]
        coz::scope!("Push");

        let heap_index = self.heap.len();
        self.heap.push(n);
        self.sift_up(heap_index);
        self.peak = self.peak.max(self.heap.len());

        self.verify_heap();
    }

    pub fn pop(&mut self) -> Option<T> {
        #[cfg(feature = "coz_profile")]
        coz::scope!("Pop");

        let last = self.heap.pop()?;
        if self.heap.is_empty() {
            return Some(last);
        }

        let top = std::mem::replace(&mut self.heap[0], last);
        self.sift_down(0);

        self.verify_heap();
        Some(top)
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify_heap(&self) {
        // All good... (hopefully)
    }

    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify_heap(&self) {
        // Every node goes after its parent node, if any.
        for i in 1..self.heap.len() {
            let p = up(i);
            debug_assert!(
                self.heap[p] <= self.heap[i],
                "Node[{p}]={:?} !<= child [{i}]={:?}. Out of heap of len={}",
                self.heap[p],
                self.heap[i],
                self.heap.len(),
            );
        }
    }

    /// Raises a node
    /// Returns its new index
    #[inline(always)]
    fn sift_up(&mut self, mut pos: usize) -> usize {
        debug_assert!(pos < self.heap.len(), "Index out of bounds...");

        while pos > 0 {
            let parent = up(pos);
            if self.heap[parent] <= self.heap[pos] {
                break;
            }
            self.heap.swap(parent, pos);
            pos = parent;
        }
        pos
    }

    /// Lowers a node
    /// Returns its new index
    #[inline(always)]
    fn sift_down(&mut self, mut pos: usize) -> usize {
        let len = self.heap.len();
        debug_assert!(pos < len, "Index out of bounds...");

        loop {
            // Find the best child
            let first = down_left(pos);
            if first >= len {
                break;
            }
            debug_assert_eq!(first + HEAP_ARITY, down_right(pos) + 1);
            let child = first + arg_min(&self.heap[first..min(first + HEAP_ARITY, len)]);

            if self.heap[pos] <= self.heap[child] {
                break;
            }
            self.heap.swap(pos, child);
            pos = child;
        }
        pos
    }
}

impl<T> Default for Frontier<T>
where
    T: Debug + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}
