#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "tracing")] {
        macro_rules! capacity_event {
            ($level:ident, $($arg:tt)+) => {
                tracing::$level!(target: "slim_hash", $($arg)+)
            };
        }
    } else {
        macro_rules! capacity_event {
            ($level:ident, $($arg:tt)+) => {};
        }
    }
}

/// Error type for fallible table operations.
pub mod error;

pub mod hash_table;

/// Iterators and the removal cursor over a [`HashTable`].
pub mod iter;

pub mod key;

/// 32-bit Murmur3 hashing of byte blocks.
pub mod murmur;

#[cfg(any(test, feature = "stats"))]
mod stats;

pub use error::Failure;
pub use hash_table::Entry;
pub use hash_table::HashTable;
pub use hash_table::MIN_CAPACITY;
pub use key::DefaultHashBuilder;
pub use key::HashedKeys;
pub use key::KeyOps;
pub use key::StrKeys;
pub use key::ValueKeys;
pub use murmur::BuildMurmur3;
pub use murmur::Murmur3Hasher;
pub use murmur::murmur3_32;
#[cfg(any(test, feature = "stats"))]
pub use stats::DebugStats;
#[cfg(any(test, feature = "stats"))]
pub use stats::ProbeHistogram;

/// A table keyed by fixed-size copyable values such as integers.
pub type IntMap<K, V> = HashTable<ValueKeys<K>, V>;

/// A table keyed by strings. Keys are duplicated on insert and freed on
/// removal.
pub type StrMap<V> = HashTable<StrKeys, V>;

/// A table keyed by any `Hash + Eq + Clone` type through a [`BuildHasher`].
///
/// [`BuildHasher`]: core::hash::BuildHasher
pub type HashMap<K, V, S = DefaultHashBuilder> = HashTable<HashedKeys<K, S>, V>;
