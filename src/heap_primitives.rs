// Index arithmetic for d-ary heaps stored in a flat array.
//
// With arity `A` every node `i` has children `A*i + 1 ..= A*(i + 1)`, so a
// 4-ary heap is laid out as,
//
// ```text
//                            0
//        1             2             3             4
//   5 6 7 8      9 10 11 12   13 14 15 16   17 18 19 20
// ```
//
// The last level will often be incomplete.

/// The parent node
///
/// ```
/// use eight_puzzle::heap_primitives::index_parent;
/// assert_eq!(index_parent::<4>(1), 0);
/// assert_eq!(index_parent::<4>(4), 0);
/// assert_eq!(index_parent::<4>(5), 1);
/// assert_eq!(index_parent::<4>(8), 1);
/// assert_eq!(index_parent::<4>(9), 2);
/// assert_eq!(index_parent::<4>(20), 4);
/// assert_eq!(index_parent::<2>(6), 2);
/// ```
#[inline(always)]
#[must_use]
pub fn index_parent<const A: usize>(i: usize) -> usize {
    debug_assert!(i > 0, "The root has no parent");
    (i - 1) / A
}

/// The first (left-most) child
///
/// ```
/// use eight_puzzle::heap_primitives::index_first_child;
/// assert_eq!(index_first_child::<4>(0), 1);
/// assert_eq!(index_first_child::<4>(1), 5);
/// assert_eq!(index_first_child::<4>(4), 17);
/// assert_eq!(index_first_child::<2>(3), 7);
/// ```
#[inline(always)]
#[must_use]
pub fn index_first_child<const A: usize>(i: usize) -> usize {
    (A * i) + 1
}

/// The last (right-most) child
///
/// ```
/// use eight_puzzle::heap_primitives::index_last_child;
/// assert_eq!(index_last_child::<4>(0), 4);
/// assert_eq!(index_last_child::<4>(1), 8);
/// assert_eq!(index_last_child::<4>(4), 20);
/// assert_eq!(index_last_child::<2>(6), 14);
/// ```
#[inline(always)]
#[must_use]
pub fn index_last_child<const A: usize>(i: usize) -> usize {
    A * (i + 1)
}

/// Position of the smallest element, the left-most one on ties.
///
/// ```
/// use eight_puzzle::heap_primitives::arg_min;
/// assert_eq!(arg_min(&[3, 1, 2, 1]), 1);
/// assert_eq!(arg_min(&[7]), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn arg_min<T: Ord>(a: &[T]) -> usize {
    debug_assert!(!a.is_empty());
    let mut best = 0;
    for i in 1..a.len() {
        if a[i] < a[best] {
            best = i;
        }
    }
    best
}
