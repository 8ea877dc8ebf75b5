//! The open-addressing table.
//!
//! Slots live in one contiguous array whose length is a power of two. A key's
//! home slot is its cached hash masked by `capacity - 1`; collisions walk
//! forward one slot at a time, wrapping at the end. Deleting leaves a
//! tombstone so later keys on the same walk stay reachable. Tombstones only
//! disappear when the whole array is rehashed.

use alloc::vec::Vec;
use core::alloc::Layout;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::mem;

use crate::error::Failure;
use crate::iter::CursorMut;
use crate::iter::Drain;
use crate::iter::Iter;
use crate::iter::IterMut;
use crate::iter::Keys;
use crate::iter::Values;
use crate::iter::ValuesMut;
use crate::key::KeyOps;

/// Smallest slot count a table ever has, and the count a new table starts
/// with.
pub const MIN_CAPACITY: usize = 8;

/// Set on every cached hash so a filled slot's hash is never zero.
const FILLED_BIT: u32 = 0x8000_0000;

pub(crate) enum Slot<K, V> {
    Free,
    Deleted,
    Filled { hash: u32, key: K, value: V },
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub(crate) fn is_filled(&self) -> bool {
        matches!(self, Slot::Filled { .. })
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Filled { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Filled { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }
}

/// Outcome of walking a probe chain for a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    /// The key is stored at this index.
    Found(usize),
    /// The key is absent; this is the first free or deleted slot on its walk.
    Vacant(usize),
    /// The key is absent and every slot is filled.
    Exhausted,
}

#[inline]
pub(crate) fn query<O: KeyOps>(stored: &O::Stored) -> &O::Query {
    <O::Stored as Borrow<O::Query>>::borrow(stored)
}

/// Smallest valid capacity that holds `entries` at no more than half load.
fn capacity_for(entries: usize) -> Result<usize, Failure> {
    entries
        .checked_mul(2)
        .and_then(|slots| slots.max(MIN_CAPACITY).checked_next_power_of_two())
        .ok_or(Failure::CapacityOverflow)
}

fn allocate_slots<K, V>(capacity: usize) -> Result<Vec<Slot<K, V>>, Failure> {
    let layout = Layout::array::<Slot<K, V>>(capacity).map_err(|_| Failure::CapacityOverflow)?;

    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| Failure::OutOfMemory { layout })?;
    slots.resize_with(capacity, || Slot::Free);
    Ok(slots)
}

/// An open-addressing hash table with linear probing.
///
/// `HashTable<O, V>` maps keys described by the [`KeyOps`] capability `O` to
/// values of type `V`. The aliases [`IntMap`](crate::IntMap),
/// [`StrMap`](crate::StrMap) and [`HashMap`](crate::HashMap) cover the common
/// key kinds.
///
/// ## Capacity
///
/// The slot array is a power of two no smaller than [`MIN_CAPACITY`]. Before a
/// new key goes in, the table rehashes if filled plus deleted slots would pass
/// half the capacity: into an array twice as large, or into one of the same
/// size when the live entries alone sit at a quarter load or less. After a
/// removal the array is halved once live entries drop below a fifth of it.
/// Every rehash clears all tombstones.
///
/// ## Example
///
/// ```rust
/// use slim_hash::StrMap;
///
/// let mut table: StrMap<i32> = StrMap::new();
/// table.put("a", 1);
/// table.put("b", 2);
/// table.put("c", 3);
///
/// assert!(table.delete("b"));
/// assert_eq!(table.get_or("a", 0), 1);
/// assert_eq!(table.get_or("b", 0), 0);
/// assert_eq!(table.get_or("c", 0), 3);
/// ```
pub struct HashTable<O: KeyOps, V> {
    pub(crate) slots: Vec<Slot<O::Stored, V>>,
    pub(crate) length: usize,
    pub(crate) deleted: usize,
    max_capacity: usize,
    pub(crate) ops: O,
}

impl<O, V> Debug for HashTable<O, V>
where
    O: KeyOps,
    O::Query: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Every key in the copy is adopted again through the cloned capability, so
/// each table releases only keys it adopted itself.
impl<O, V> Clone for HashTable<O, V>
where
    O: KeyOps + Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        let ops = self.ops.clone();
        let slots = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Free => Slot::Free,
                Slot::Deleted => Slot::Deleted,
                Slot::Filled { hash, key, value } => Slot::Filled {
                    hash: *hash,
                    key: ops.adopt(query::<O>(key)),
                    value: value.clone(),
                },
            })
            .collect();

        Self {
            slots,
            length: self.length,
            deleted: self.deleted,
            max_capacity: self.max_capacity,
            ops,
        }
    }
}

impl<O: KeyOps, V> Drop for HashTable<O, V> {
    fn drop(&mut self) {
        for slot in self.slots.drain(..) {
            if let Slot::Filled { key, .. } = slot {
                self.ops.release(key);
            }
        }
    }
}

impl<O: KeyOps + Default, V> Default for HashTable<O, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: KeyOps + Default, V> HashTable<O, V> {
    /// Creates an empty table with [`MIN_CAPACITY`] slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::IntMap;
    /// use slim_hash::MIN_CAPACITY;
    ///
    /// let table: IntMap<i64, i32> = IntMap::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), MIN_CAPACITY);
    /// ```
    pub fn new() -> Self {
        Self::with_ops(O::default())
    }

    /// Creates an empty table that holds `capacity` entries without
    /// rehashing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::IntMap;
    ///
    /// let table: IntMap<u32, u32> = IntMap::with_capacity(100);
    /// assert!(table.capacity() >= 200);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_ops(capacity, O::default())
    }

    /// Fallible form of [`with_capacity`](Self::with_capacity).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::Failure;
    /// use slim_hash::IntMap;
    ///
    /// let result: Result<IntMap<u32, u32>, _> = IntMap::try_with_capacity(usize::MAX);
    /// assert_eq!(result.err(), Some(Failure::CapacityOverflow));
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Failure> {
        Self::try_with_capacity_and_ops(capacity, O::default())
    }
}

impl<O: KeyOps, V> HashTable<O, V> {
    /// Creates an empty table using `ops` for its keys.
    pub fn with_ops(ops: O) -> Self {
        Self::with_capacity_and_ops(0, ops)
    }

    /// Creates an empty table using `ops` that holds `capacity` entries
    /// without rehashing.
    pub fn with_capacity_and_ops(capacity: usize, ops: O) -> Self {
        Self::try_with_capacity_and_ops(capacity, ops).unwrap_or_else(|failure| failure.raise())
    }

    /// Creates an empty table using `ops`, reporting allocation failure
    /// instead of aborting.
    pub fn try_with_capacity_and_ops(capacity: usize, ops: O) -> Result<Self, Failure> {
        let slots = allocate_slots(capacity_for(capacity)?)?;
        Ok(Self {
            slots,
            length: 0,
            deleted: 0,
            max_capacity: usize::MAX,
            ops,
        })
    }

    /// Returns the key capability.
    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of tombstones left by removals since the last
    /// rehash.
    pub fn deleted(&self) -> usize {
        self.deleted
    }

    /// Returns the growth ceiling set by
    /// [`set_max_capacity`](Self::set_max_capacity).
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Stops the slot array from growing past `limit` slots.
    ///
    /// A table already larger than `limit` keeps its size. Once growth is
    /// refused, inserts keep using whatever free or deleted slots remain and
    /// then fail with [`Failure::CapacityLimit`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::Failure;
    /// use slim_hash::IntMap;
    ///
    /// let mut table: IntMap<u32, u32> = IntMap::new();
    /// table.set_max_capacity(8);
    /// for k in 0..8 {
    ///     table.try_put(&k, k).unwrap();
    /// }
    /// assert!(matches!(table.try_put(&8, 8), Err(Failure::CapacityLimit { .. })));
    /// assert_eq!(table.len(), 8);
    /// ```
    pub fn set_max_capacity(&mut self, limit: usize) {
        self.max_capacity = limit;
    }

    #[inline]
    fn hash_of(&self, key: &O::Query) -> u32 {
        self.ops.hash(key) | FILLED_BIT
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    /// Walks the chain for `key`, remembering the first reusable slot but
    /// only settling on it once the key is known to be absent.
    fn probe(&self, hash: u32, key: &O::Query) -> Probe {
        let mask = self.mask();
        let mut index = hash as usize & mask;
        let mut reusable = None;

        for _ in 0..self.slots.len() {
            match &self.slots[index] {
                Slot::Free => return Probe::Vacant(reusable.unwrap_or(index)),
                Slot::Deleted => {
                    if reusable.is_none() {
                        reusable = Some(index);
                    }
                }
                Slot::Filled {
                    hash: cached,
                    key: stored,
                    ..
                } => {
                    if *cached == hash && self.ops.equals(stored, key) {
                        return Probe::Found(index);
                    }
                }
            }
            index = (index + 1) & mask;
        }

        reusable.map_or(Probe::Exhausted, Probe::Vacant)
    }

    #[inline]
    fn find(&self, key: &O::Query) -> Option<usize> {
        match self.probe(self.hash_of(key), key) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    /// First free or deleted slot on the walk for `hash`. Only valid for a key
    /// known to be absent.
    fn vacant_slot(&self, hash: u32) -> Option<usize> {
        let mask = self.mask();
        let mut index = hash as usize & mask;
        for _ in 0..self.slots.len() {
            if !self.slots[index].is_filled() {
                return Some(index);
            }
            index = (index + 1) & mask;
        }
        None
    }

    pub(crate) fn next_filled(&self, from: usize) -> usize {
        self.slots
            .get(from..)
            .and_then(|rest| rest.iter().position(Slot::is_filled))
            .map_or(self.slots.len(), |offset| from + offset)
    }

    fn filled_mut(&mut self, index: usize) -> (&O::Stored, &mut V) {
        match self.slots[index].entry_mut() {
            Some(entry) => entry,
            None => unreachable!("slot {index} is not filled"),
        }
    }

    #[inline]
    fn needs_growth(&self) -> bool {
        (self.length + self.deleted + 1).saturating_mul(2) > self.capacity()
    }

    #[cold]
    fn grow(&mut self) -> Result<(), Failure> {
        let capacity = self.capacity();
        let target = if (self.length + 1).saturating_mul(4) <= capacity {
            capacity
        } else {
            capacity.checked_mul(2).ok_or(Failure::CapacityOverflow)?
        };
        self.resize(target)
    }

    fn shrink_after_remove(&mut self) {
        let capacity = self.capacity();
        if capacity > MIN_CAPACITY && self.length.saturating_mul(5) < capacity {
            match self.resize(capacity / 2) {
                Ok(()) => {}
                Err(_failure) => {
                    capacity_event!(
                        warn,
                        error = %_failure,
                        capacity,
                        "shrink failed; keeping current slot array"
                    );
                }
            }
        }
    }

    /// Moves every entry into a fresh array of `capacity` slots.
    ///
    /// The new array is allocated before anything is touched, so on failure
    /// the table is unchanged.
    fn resize(&mut self, capacity: usize) -> Result<(), Failure> {
        debug_assert!(capacity.is_power_of_two() && capacity >= MIN_CAPACITY);
        debug_assert!(self.length <= capacity);

        let old_capacity = self.capacity();
        if capacity > old_capacity && capacity > self.max_capacity {
            return Err(Failure::CapacityLimit {
                requested: capacity,
                limit: self.max_capacity,
            });
        }

        let mut slots = allocate_slots(capacity)?;
        let mask = capacity - 1;
        for slot in mem::take(&mut self.slots) {
            if let Slot::Filled { hash, .. } = slot {
                let mut index = hash as usize & mask;
                while slots[index].is_filled() {
                    index = (index + 1) & mask;
                }
                slots[index] = slot;
            }
        }

        capacity_event!(
            debug,
            from = old_capacity,
            to = capacity,
            len = self.length,
            tombstones = self.deleted,
            "rehashed slot array"
        );

        self.slots = slots;
        self.deleted = 0;
        Ok(())
    }

    /// Tombstones the slot at `index` and releases its key. Never resizes.
    pub(crate) fn take_at(&mut self, index: usize) -> Option<V> {
        match mem::replace(&mut self.slots[index], Slot::Deleted) {
            Slot::Filled { key, value, .. } => {
                self.length -= 1;
                self.deleted += 1;
                self.ops.release(key);
                Some(value)
            }
            other => {
                self.slots[index] = other;
                None
            }
        }
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::IntMap;
    ///
    /// let mut table: IntMap<i64, i32> = IntMap::new();
    /// table.put(&174, 1);
    /// assert_eq!(table.get(&174), Some(&1));
    /// assert_eq!(table.get(&175), None);
    /// ```
    pub fn get(&self, key: &O::Query) -> Option<&V> {
        let index = self.find(key)?;
        self.slots[index].entry().map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &O::Query) -> Option<&mut V> {
        let index = self.find(key)?;
        self.slots[index].entry_mut().map(|(_, value)| value)
    }

    /// Returns the stored key and the value for `key`.
    pub fn get_key_value(&self, key: &O::Query) -> Option<(&O::Query, &V)> {
        let index = self.find(key)?;
        self.slots[index]
            .entry()
            .map(|(stored, value)| (query::<O>(stored), value))
    }

    /// Returns a copy of the value for `key`, or `default` if it is absent.
    pub fn get_or(&self, key: &O::Query, default: V) -> V
    where
        V: Clone,
    {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &O::Query) -> bool {
        self.find(key).is_some()
    }

    /// Gets the entry for `key`, growing the table first if a new key would
    /// push it past half load.
    ///
    /// A vacant entry already owns an adopted copy of the key; dropping it
    /// without inserting releases that copy. Any growth has already happened
    /// by then, so the table keeps its new capacity even though nothing was
    /// added.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::StrMap;
    ///
    /// let mut counts: StrMap<u32> = StrMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word).or_default() += 1;
    /// }
    /// assert_eq!(counts.get("a"), Some(&2));
    /// assert_eq!(counts.get("b"), Some(&1));
    /// ```
    pub fn entry(&mut self, key: &O::Query) -> Entry<'_, O, V> {
        self.try_entry(key).unwrap_or_else(|failure| failure.raise())
    }

    /// Fallible form of [`entry`](Self::entry).
    ///
    /// If growth fails and the key's walk passed a free or deleted slot, the
    /// vacant entry uses that slot in the current array. Otherwise the growth
    /// failure is returned and the table is unchanged.
    pub fn try_entry(&mut self, key: &O::Query) -> Result<Entry<'_, O, V>, Failure> {
        let hash = self.hash_of(key);
        let probe = self.probe(hash, key);
        if let Probe::Found(index) = probe {
            return Ok(Entry::Occupied(OccupiedEntry { table: self, index }));
        }

        let index = if self.needs_growth() {
            match self.grow() {
                Ok(()) => self.vacant_slot(hash).ok_or(Failure::Full)?,
                Err(failure) => match probe {
                    Probe::Vacant(index) => {
                        capacity_event!(
                            warn,
                            error = %failure,
                            len = self.length,
                            capacity = self.capacity(),
                            "growth failed; inserting into current slot array"
                        );
                        index
                    }
                    Probe::Found(_) | Probe::Exhausted => return Err(failure),
                },
            }
        } else {
            match probe {
                Probe::Vacant(index) => index,
                Probe::Found(_) | Probe::Exhausted => return Err(Failure::Full),
            }
        };

        let key = self.ops.adopt(key);
        Ok(Entry::Vacant(VacantEntry {
            reserved: Some(Reserved {
                table: self,
                index,
                hash,
                key,
            }),
        }))
    }

    /// Inserts or overwrites the value for `key`, returning the previous
    /// value.
    ///
    /// Overwriting keeps the key the table already owns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::StrMap;
    ///
    /// let mut table: StrMap<i32> = StrMap::new();
    /// assert_eq!(table.put("a", 1), None);
    /// assert_eq!(table.put("a", 2), Some(1));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn put(&mut self, key: &O::Query, value: V) -> Option<V> {
        self.try_put(key, value)
            .unwrap_or_else(|failure| failure.raise())
    }

    /// Fallible form of [`put`](Self::put).
    pub fn try_put(&mut self, key: &O::Query, value: V) -> Result<Option<V>, Failure> {
        match self.try_entry(key)? {
            Entry::Occupied(mut entry) => Ok(Some(entry.insert(value))),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(None)
            }
        }
    }

    /// Removes `key`, returning its value.
    ///
    /// The removed key is released and its slot becomes a tombstone. The
    /// table may then shrink.
    pub fn remove(&mut self, key: &O::Query) -> Option<V> {
        let index = self.find(key)?;
        let value = self.take_at(index);
        self.shrink_after_remove();
        value
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::IntMap;
    ///
    /// let mut table: IntMap<i64, i32> = IntMap::new();
    /// table.put(&174, 0);
    /// assert!(table.delete(&174));
    /// assert!(!table.delete(&174));
    /// ```
    pub fn delete(&mut self, key: &O::Query) -> bool {
        self.remove(key).is_some()
    }

    /// Removes every entry, releasing all keys, and keeps the capacity.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Slot::Filled { key, .. } = mem::replace(slot, Slot::Free) {
                self.ops.release(key);
            }
        }
        self.length = 0;
        self.deleted = 0;
    }

    /// Rehashes in place, clearing every tombstone without changing the
    /// capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::IntMap;
    ///
    /// let mut table: IntMap<u64, u64> = IntMap::new();
    /// for i in 0..100 {
    ///     table.put(&i, i * 2);
    /// }
    /// for i in 0..30 {
    ///     table.delete(&i);
    /// }
    /// assert_eq!(table.deleted(), 30);
    ///
    /// table.optimize().unwrap();
    /// assert_eq!(table.deleted(), 0);
    /// assert_eq!(table.len(), 70);
    /// ```
    pub fn optimize(&mut self) -> Result<(), Failure> {
        self.resize(self.capacity())
    }

    /// Halves the capacity until live entries fill at least a fifth of it or
    /// it reaches [`MIN_CAPACITY`]. Returns whether the table shrank.
    ///
    /// Removals through a [`CursorMut`] never resize, so this is the check to
    /// run after a pass that removed many entries.
    pub fn shrink_if_sparse(&mut self) -> Result<bool, Failure> {
        let capacity = self.capacity();
        let mut target = capacity;
        while target > MIN_CAPACITY && self.length.saturating_mul(5) < target {
            target /= 2;
        }

        if target == capacity {
            return Ok(false);
        }
        self.resize(target)?;
        Ok(true)
    }

    /// Shrinks to the smallest capacity that holds the current entries at no
    /// more than half load.
    pub fn shrink_to_fit(&mut self) -> Result<(), Failure> {
        let target = capacity_for(self.length)?;
        if target < self.capacity() {
            self.resize(target)?;
        }
        Ok(())
    }

    /// Makes room for `additional` more keys without rehashing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::IntMap;
    ///
    /// let mut table: IntMap<u32, ()> = IntMap::new();
    /// table.reserve(50);
    /// let capacity = table.capacity();
    /// for k in 0..50 {
    ///     table.put(&k, ());
    /// }
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.try_reserve(additional)
            .unwrap_or_else(|failure| failure.raise());
    }

    /// Fallible form of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Failure> {
        let needed = self
            .length
            .checked_add(additional)
            .ok_or(Failure::CapacityOverflow)?;
        let capacity = self.capacity();
        if needed.saturating_add(self.deleted).saturating_mul(2) <= capacity {
            return Ok(());
        }
        self.resize(capacity_for(needed)?.max(capacity))
    }

    /// Keeps only the entries for which `keep` returns `true`, then shrinks
    /// if the table became sparse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::IntMap;
    ///
    /// let mut table: IntMap<u32, u32> = IntMap::new();
    /// for k in 0..10 {
    ///     table.put(&k, k);
    /// }
    /// table.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(table.len(), 5);
    /// assert!(!table.contains(&3));
    /// ```
    pub fn retain(&mut self, mut keep: impl FnMut(&O::Query, &mut V) -> bool) {
        let mut cursor = self.cursor_mut();
        while let Some((key, value)) = cursor.current() {
            if keep(key, value) {
                cursor.move_next();
            } else {
                cursor.remove_current();
            }
        }

        if let Err(_failure) = self.shrink_if_sparse() {
            capacity_event!(warn, error = %_failure, "shrink after retain failed");
        }
    }

    /// Returns an iterator over `(key, value)` pairs in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::IntMap;
    ///
    /// let mut table: IntMap<u8, u32> = IntMap::new();
    /// table.put(&0, 10);
    /// table.put(&1, 20);
    /// table.put(&2, 30);
    ///
    /// let mut total = 0;
    /// for (&key, &value) in table.iter() {
    ///     assert_eq!(value, (u32::from(key) + 1) * 10);
    ///     total += value;
    /// }
    /// assert_eq!(total, 60);
    /// ```
    pub fn iter(&self) -> Iter<'_, O, V> {
        Iter::new(&self.slots, self.length)
    }

    /// Returns an iterator over `(key, &mut value)` pairs in slot order.
    pub fn iter_mut(&mut self) -> IterMut<'_, O, V> {
        IterMut::new(&mut self.slots, self.length)
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, O, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, O, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, O, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns a cursor on the first entry, able to remove entries while
    /// walking the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slim_hash::IntMap;
    ///
    /// let mut table: IntMap<i64, i32> = IntMap::new();
    /// table.put(&0, 10);
    /// table.put(&1, 20);
    /// table.put(&2, 30);
    ///
    /// let mut cursor = table.cursor_mut();
    /// while let Some(&key) = cursor.key() {
    ///     if key == 1 {
    ///         cursor.remove_current();
    ///     } else {
    ///         cursor.move_next();
    ///     }
    /// }
    ///
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.get_or(&1, -1), -1);
    /// ```
    pub fn cursor_mut(&mut self) -> CursorMut<'_, O, V> {
        let index = self.next_filled(0);
        CursorMut::new(self, index)
    }

    /// Removes every entry, yielding owned keys and values. The capacity is
    /// kept.
    ///
    /// Entries the iterator does not reach are released when it is dropped.
    pub fn drain(&mut self) -> Drain<'_, O, V> {
        Drain::new(self)
    }
}

impl<'k, O, V> Extend<(&'k O::Query, V)> for HashTable<O, V>
where
    O: KeyOps,
    O::Query: 'k,
{
    fn extend<I: IntoIterator<Item = (&'k O::Query, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<'k, O, V> FromIterator<(&'k O::Query, V)> for HashTable<O, V>
where
    O: KeyOps + Default,
    O::Query: 'k,
{
    fn from_iter<I: IntoIterator<Item = (&'k O::Query, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<'a, O: KeyOps, V> IntoIterator for &'a HashTable<O, V> {
    type Item = (&'a O::Query, &'a V);
    type IntoIter = Iter<'a, O, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, O: KeyOps, V> IntoIterator for &'a mut HashTable<O, V> {
    type Item = (&'a O::Query, &'a mut V);
    type IntoIter = IterMut<'a, O, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry of a [`HashTable`], vacant or occupied.
///
/// Created by [`HashTable::entry`] and [`HashTable::try_entry`].
pub enum Entry<'a, O: KeyOps, V> {
    /// The key is present.
    Occupied(OccupiedEntry<'a, O, V>),
    /// The key is absent and a slot has been chosen for it.
    Vacant(VacantEntry<'a, O, V>),
}

impl<'a, O: KeyOps, V> Entry<'a, O, V> {
    /// Returns the entry's key.
    pub fn key(&self) -> &O::Query {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }

    /// Inserts `default` if vacant, then returns the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if vacant, then returns the value.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Inserts `V::default()` if vacant, then returns the value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }

    /// Applies `f` to an occupied value. A vacant entry is left alone and
    /// `None` is returned.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }
}

/// A present key in a [`HashTable`].
pub struct OccupiedEntry<'a, O: KeyOps, V> {
    table: &'a mut HashTable<O, V>,
    index: usize,
}

impl<'a, O: KeyOps, V> OccupiedEntry<'a, O, V> {
    /// Returns the stored key.
    pub fn key(&self) -> &O::Query {
        match self.table.slots[self.index].entry() {
            Some((key, _)) => query::<O>(key),
            None => unreachable!("occupied entry on an unfilled slot"),
        }
    }

    /// Returns the value.
    pub fn get(&self) -> &V {
        match self.table.slots[self.index].entry() {
            Some((_, value)) => value,
            None => unreachable!("occupied entry on an unfilled slot"),
        }
    }

    /// Returns the value mutably.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.filled_mut(self.index).1
    }

    /// Converts the entry into a mutable reference with the entry's lifetime.
    pub fn into_mut(self) -> &'a mut V {
        self.table.filled_mut(self.index).1
    }

    /// Replaces the value, returning the old one. The stored key is kept.
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Removes the entry like [`HashTable::remove`], shrinking if the table
    /// became sparse.
    pub fn remove(self) -> V {
        let Some(value) = self.table.take_at(self.index) else {
            unreachable!("occupied entry on an unfilled slot")
        };
        self.table.shrink_after_remove();
        value
    }
}

/// An absent key in a [`HashTable`], holding the adopted key and the slot it
/// will occupy.
///
/// Dropping the entry without inserting releases the adopted key.
pub struct VacantEntry<'a, O: KeyOps, V> {
    reserved: Option<Reserved<'a, O, V>>,
}

struct Reserved<'a, O: KeyOps, V> {
    table: &'a mut HashTable<O, V>,
    index: usize,
    hash: u32,
    key: O::Stored,
}

impl<O: KeyOps, V> Drop for VacantEntry<'_, O, V> {
    fn drop(&mut self) {
        if let Some(Reserved { table, key, .. }) = self.reserved.take() {
            table.ops.release(key);
        }
    }
}

impl<'a, O: KeyOps, V> VacantEntry<'a, O, V> {
    fn take(&mut self) -> Reserved<'a, O, V> {
        match self.reserved.take() {
            Some(reserved) => reserved,
            None => unreachable!("vacant entry already consumed"),
        }
    }

    /// Returns the key that will be inserted.
    pub fn key(&self) -> &O::Query {
        match &self.reserved {
            Some(reserved) => query::<O>(&reserved.key),
            None => unreachable!("vacant entry already consumed"),
        }
    }

    /// Takes back the adopted key without inserting anything. The caller now
    /// owns it and the table will not release it.
    pub fn into_key(mut self) -> O::Stored {
        self.take().key
    }

    /// Fills the chosen slot and returns the value.
    pub fn insert(mut self, value: V) -> &'a mut V {
        let Reserved {
            table,
            index,
            hash,
            key,
        } = self.take();

        match table.slots[index] {
            Slot::Free => {}
            Slot::Deleted => table.deleted -= 1,
            Slot::Filled { .. } => unreachable!("vacant entry on a filled slot"),
        }
        table.length += 1;
        table.slots[index] = Slot::Filled { hash, key, value };

        table.filled_mut(index).1
    }
}
