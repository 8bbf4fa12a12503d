//! # split-map
//!
//! A cache-friendly ordered map for large values.
//!
//! Keys live in one contiguous index together with the slot of their value;
//! the values themselves live in a second contiguous buffer. Searching and
//! sorting only ever touch the small key index, so more of it stays in cache,
//! while the bulky values are read only on a hit.
//!
//! Inserts keep the index sorted. Appends are O(1) and leave sorting for
//! later, which suits bulk loads of nearly ordered data:
//!
//! ```rust
//! use split_map::SplitMap;
//!
//! let mut map = SplitMap::new();
//! map.append(4, "d");
//! map.append(3, "c");
//! map.batch_insert([(1, "a"), (2, "b")]);
//!
//! assert_eq!(map.get(&3), Some(&"c"));
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
//!
//! // Reorder the value buffer to match key order for sequential scans.
//! map.deep_sort();
//! assert_eq!(map.values().copied().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
//! ```
//!
//! The map is single-threaded; wrap it in a lock to share it.

#![forbid(unsafe_code)]

mod config;
mod error;
mod iter;
mod keys;
mod map;
mod sort;
mod values;

pub use config::MapConfig;
pub use error::{Error, Result};
pub use iter::{Iter, Keys};
pub use map::SplitMap;

#[cfg(test)]
mod proptests;
