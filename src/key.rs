//! Key capabilities.
//!
//! A [`HashTable`](crate::HashTable) never looks at its keys directly; it goes
//! through a [`KeyOps`] value that knows how to hash a key, compare a stored key
//! against a probe, take ownership of a new key, and give that ownership back
//! up when the key leaves the table.

use alloc::boxed::Box;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::marker::PhantomData;

use crate::murmur::Murmur3Hasher;
use crate::murmur::murmur3_32;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used by [`HashedKeys`] when none is given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hasher builder used by [`HashedKeys`] when none is given.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Hasher builder used by [`HashedKeys`] when none is given.
        pub type DefaultHashBuilder = crate::murmur::BuildMurmur3;
    }
}

/// The capability set a table needs from its key type.
///
/// Lookups take a borrowed [`Query`](KeyOps::Query); the table keeps an owned
/// [`Stored`](KeyOps::Stored) produced by [`adopt`](KeyOps::adopt) and hands it
/// back through [`release`](KeyOps::release) when the entry is deleted,
/// cleared, or dropped with the table.
///
/// # Examples
///
/// Case-insensitive ASCII keys:
///
/// ```rust
/// use slim_hash::HashTable;
/// use slim_hash::KeyOps;
/// use slim_hash::murmur3_32;
///
/// #[derive(Default)]
/// struct AsciiNoCase;
///
/// impl KeyOps for AsciiNoCase {
///     type Query = str;
///     type Stored = String;
///
///     fn hash(&self, key: &str) -> u32 {
///         murmur3_32(key.to_ascii_lowercase().as_bytes())
///     }
///
///     fn equals(&self, stored: &String, key: &str) -> bool {
///         stored.eq_ignore_ascii_case(key)
///     }
///
///     fn adopt(&self, key: &str) -> String {
///         key.to_ascii_lowercase()
///     }
/// }
///
/// let mut table: HashTable<AsciiNoCase, u32> = HashTable::new();
/// table.put("Content-Type", 1);
/// assert_eq!(table.get("content-type"), Some(&1));
/// ```
pub trait KeyOps {
    /// Borrowed form used for lookups.
    type Query: ?Sized;
    /// Owned form kept in a filled slot.
    type Stored: Borrow<Self::Query>;

    /// Hashes a key. Only the low 31 bits are kept by the table.
    fn hash(&self, key: &Self::Query) -> u32;

    /// Returns `true` when `stored` and `key` denote the same key.
    fn equals(&self, stored: &Self::Stored, key: &Self::Query) -> bool;

    /// Takes ownership of a key that is about to be inserted.
    fn adopt(&self, key: &Self::Query) -> Self::Stored;

    /// Gives up ownership of a key leaving the table.
    fn release(&self, key: Self::Stored) {
        drop(key);
    }
}

/// Keys stored by value: integers, small tuples, and other `Copy` types.
///
/// The hash is Murmur3 over the bytes the key feeds to [`Hash`], which for
/// primitive integers is their native-endian representation.
pub struct ValueKeys<K> {
    _keys: PhantomData<fn() -> K>,
}

impl<K> ValueKeys<K> {
    /// Creates the value-key capability.
    pub const fn new() -> Self {
        Self { _keys: PhantomData }
    }
}

impl<K> Default for ValueKeys<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for ValueKeys<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for ValueKeys<K> {}

impl<K> Debug for ValueKeys<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ValueKeys")
    }
}

impl<K> KeyOps for ValueKeys<K>
where
    K: Copy + Eq + Hash,
{
    type Query = K;
    type Stored = K;

    #[inline]
    fn hash(&self, key: &K) -> u32 {
        let mut hasher = Murmur3Hasher::new();
        key.hash(&mut hasher);
        hasher.finish_u32()
    }

    #[inline]
    fn equals(&self, stored: &K, key: &K) -> bool {
        stored == key
    }

    #[inline]
    fn adopt(&self, key: &K) -> K {
        *key
    }
}

/// String keys. The table keeps its own boxed copy of every key.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrKeys;

impl KeyOps for StrKeys {
    type Query = str;
    type Stored = Box<str>;

    #[inline]
    fn hash(&self, key: &str) -> u32 {
        murmur3_32(key.as_bytes())
    }

    #[inline]
    fn equals(&self, stored: &Box<str>, key: &str) -> bool {
        stored.as_bytes() == key.as_bytes()
    }

    #[inline]
    fn adopt(&self, key: &str) -> Box<str> {
        Box::from(key)
    }
}

/// Keys hashed through a [`BuildHasher`], for any `Hash + Eq + Clone` type.
///
/// # Examples
///
/// ```rust
/// use slim_hash::HashMap;
///
/// let mut map: HashMap<(u8, char), &str> = HashMap::new();
/// map.put(&(1, 'a'), "first");
/// assert_eq!(map.get(&(1, 'a')), Some(&"first"));
/// ```
pub struct HashedKeys<K, S = DefaultHashBuilder> {
    hash_builder: S,
    _keys: PhantomData<fn() -> K>,
}

impl<K, S: Default> Default for HashedKeys<K, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, S: Clone> Clone for HashedKeys<K, S> {
    fn clone(&self) -> Self {
        Self::with_hasher(self.hash_builder.clone())
    }
}

impl<K, S: Debug> Debug for HashedKeys<K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashedKeys")
            .field("hash_builder", &self.hash_builder)
            .finish()
    }
}

impl<K, S> HashedKeys<K, S> {
    /// Uses `hash_builder` to hash keys.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            hash_builder,
            _keys: PhantomData,
        }
    }

    /// Returns the hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<K, S> KeyOps for HashedKeys<K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    type Query = K;
    type Stored = K;

    #[inline]
    fn hash(&self, key: &K) -> u32 {
        let hash = self.hash_builder.hash_one(key);
        (hash ^ (hash >> 32)) as u32
    }

    #[inline]
    fn equals(&self, stored: &K, key: &K) -> bool {
        stored == key
    }

    #[inline]
    fn adopt(&self, key: &K) -> K {
        key.clone()
    }
}
