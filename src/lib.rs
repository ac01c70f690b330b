//! petek: a lock-free concurrent hash map with transparent dynamic resizing.
//!
//! Every operation runs through `&self` and is safe to call from any number
//! of threads at once. No operation ever takes a mutex; progress relies
//! exclusively on compare-and-swap over bucket slots, chain links, per-entry
//! deletion flags, the size counter, and a single resize flag.
//!
//! # Design
//!
//! - **Buckets**: a power-of-two array of atomic pointers to entry chains.
//! - **Entries**: immutable `(hash, key, value)` nodes linked through an
//!   atomic `next` pointer, removed logically by a monotone `deleted` flag
//!   and unlinked opportunistically during later traversals.
//! - **Resizing**: once the configured load factor is reached, exactly one
//!   writer doubles the table and migrates live entries while readers and
//!   writers keep operating; the transition is transparent to callers.
//! - **Reclamation**: epoch-based via `crossbeam-epoch`; readers pin an
//!   epoch guard, unlinked entries and superseded tables are retired and
//!   freed once no guard can still observe them.
//!
//! # Example
//!
//! ```
//! use petek::HashMap;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let map = Arc::new(HashMap::with_capacity(1024));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let map = Arc::clone(&map);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 map.insert(t * 100 + i, i);
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(map.len(), 400);
//! assert_eq!(map.get(&0), Some(0));
//! ```

#![warn(missing_docs)]

mod hashmap;
mod iter;

pub use hashmap::{
    HashMap, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, LARGE_INITIAL_CAPACITY,
    MINIMAL_CAPACITY, MINIMAL_LOAD_FACTOR,
};
pub use iter::{EntriesView, Iter, IterRemoveError, Keys, KeysView, Values, ValuesView};
