//! Stable in-place sort tuned for nearly ordered input.
//!
//! The key index is usually a long sorted run followed by a handful of
//! appended entries. That shape is handled without a merge buffer: each
//! trailing element is binary-inserted into the run. Anything else goes to
//! the std stable sort, which detects and merges natural runs on its own.

use std::cmp::Ordering;

/// Trailing out-of-order elements handled by binary insertion.
const MAX_TAIL_INSERTIONS: usize = 8;

/// Sorts `v` stably under the strict weak order `less`.
pub(crate) fn sort_by<T, F>(v: &mut [T], mut less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    let run = sorted_prefix_len(v, &mut less);
    if run == v.len() {
        return;
    }

    if v.len() - run <= MAX_TAIL_INSERTIONS {
        for i in run..v.len() {
            let (head, tail) = v.split_at(i);
            // Upper bound: lands after every equal element, keeping stability.
            let pos = head.partition_point(|x| !less(&tail[0], x));
            v[pos..=i].rotate_right(1);
        }
        return;
    }

    v.sort_by(|a, b| {
        if less(a, b) {
            Ordering::Less
        } else if less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });
}

fn sorted_prefix_len<T, F>(v: &[T], less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    if v.is_empty() {
        return 0;
    }
    let mut i = 1;
    while i < v.len() && !less(&v[i], &v[i - 1]) {
        i += 1;
    }
    i
}
