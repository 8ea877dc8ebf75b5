use core::iter::FusedIterator;
use core::mem;
use core::slice;

use crate::hash_table::HashTable;
use crate::hash_table::Slot;
use crate::hash_table::query;
use crate::key::KeyOps;

/// Iterator over `(key, &value)` pairs, returned by [`HashTable::iter`].
pub struct Iter<'a, O: KeyOps, V> {
    slots: slice::Iter<'a, Slot<O::Stored, V>>,
    remaining: usize,
}

impl<'a, O: KeyOps, V> Iter<'a, O, V> {
    pub(crate) fn new(slots: &'a [Slot<O::Stored, V>], remaining: usize) -> Self {
        Self {
            slots: slots.iter(),
            remaining,
        }
    }
}

impl<O: KeyOps, V> Clone for Iter<'_, O, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, O: KeyOps, V> Iterator for Iter<'a, O, V>
where
    O::Query: 'a,
{
    type Item = (&'a O::Query, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Filled { key, value, .. } = slot {
                self.remaining -= 1;
                return Some((query::<O>(key), value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, O: KeyOps, V> ExactSizeIterator for Iter<'a, O, V> where O::Query: 'a {}

impl<'a, O: KeyOps, V> FusedIterator for Iter<'a, O, V> where O::Query: 'a {}

/// Iterator over `(key, &mut value)` pairs, returned by
/// [`HashTable::iter_mut`].
pub struct IterMut<'a, O: KeyOps, V> {
    slots: slice::IterMut<'a, Slot<O::Stored, V>>,
    remaining: usize,
}

impl<'a, O: KeyOps, V> IterMut<'a, O, V> {
    pub(crate) fn new(slots: &'a mut [Slot<O::Stored, V>], remaining: usize) -> Self {
        Self {
            slots: slots.iter_mut(),
            remaining,
        }
    }
}

impl<'a, O: KeyOps, V> Iterator for IterMut<'a, O, V>
where
    O::Query: 'a,
{
    type Item = (&'a O::Query, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Filled { key, value, .. } = slot {
                self.remaining -= 1;
                return Some((query::<O>(key), value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, O: KeyOps, V> ExactSizeIterator for IterMut<'a, O, V> where O::Query: 'a {}

impl<'a, O: KeyOps, V> FusedIterator for IterMut<'a, O, V> where O::Query: 'a {}

/// Iterator over keys, returned by [`HashTable::keys`].
pub struct Keys<'a, O: KeyOps, V> {
    pub(crate) inner: Iter<'a, O, V>,
}

impl<'a, O: KeyOps, V> Iterator for Keys<'a, O, V>
where
    O::Query: 'a,
{
    type Item = &'a O::Query;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, O: KeyOps, V> ExactSizeIterator for Keys<'a, O, V> where O::Query: 'a {}

/// Iterator over values, returned by [`HashTable::values`].
pub struct Values<'a, O: KeyOps, V> {
    pub(crate) inner: Iter<'a, O, V>,
}

impl<'a, O: KeyOps, V> Iterator for Values<'a, O, V>
where
    O::Query: 'a,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, O: KeyOps, V> ExactSizeIterator for Values<'a, O, V> where O::Query: 'a {}

/// Iterator over mutable values, returned by [`HashTable::values_mut`].
pub struct ValuesMut<'a, O: KeyOps, V> {
    pub(crate) inner: IterMut<'a, O, V>,
}

impl<'a, O: KeyOps, V> Iterator for ValuesMut<'a, O, V>
where
    O::Query: 'a,
{
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, O: KeyOps, V> ExactSizeIterator for ValuesMut<'a, O, V> where O::Query: 'a {}

/// Draining iterator returned by [`HashTable::drain`].
///
/// Ownership of each yielded key passes to the caller, so drained keys are
/// never released by the table. Whatever is left when the iterator is dropped
/// is released as usual.
pub struct Drain<'a, O: KeyOps, V> {
    table: &'a mut HashTable<O, V>,
    index: usize,
}

impl<'a, O: KeyOps, V> Drain<'a, O, V> {
    pub(crate) fn new(table: &'a mut HashTable<O, V>) -> Self {
        Self { table, index: 0 }
    }
}

impl<O: KeyOps, V> Drop for Drain<'_, O, V> {
    fn drop(&mut self) {
        while let Some((key, _)) = self.next() {
            self.table.ops.release(key);
        }

        for slot in &mut self.table.slots {
            *slot = Slot::Free;
        }
        self.table.deleted = 0;
    }
}

impl<O: KeyOps, V> Iterator for Drain<'_, O, V> {
    type Item = (O::Stored, V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.table.length > 0 && self.index < self.table.slots.len() {
            let slot = mem::replace(&mut self.table.slots[self.index], Slot::Free);
            self.index += 1;
            if let Slot::Filled { key, value, .. } = slot {
                self.table.length -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.length, Some(self.table.length))
    }
}

impl<O: KeyOps, V> ExactSizeIterator for Drain<'_, O, V> {}

/// A position in a [`HashTable`] that can remove the entry under it.
///
/// The cursor visits filled slots in slot order. [`remove_current`] tombstones
/// the current entry and moves on without resizing, so the rest of the walk
/// sees every entry that was not removed exactly once. The table stays
/// borrowed for the cursor's lifetime; call
/// [`HashTable::shrink_if_sparse`] afterwards to reclaim space.
///
/// [`remove_current`]: CursorMut::remove_current
pub struct CursorMut<'a, O: KeyOps, V> {
    table: &'a mut HashTable<O, V>,
    index: usize,
}

impl<'a, O: KeyOps, V> CursorMut<'a, O, V> {
    pub(crate) fn new(table: &'a mut HashTable<O, V>, index: usize) -> Self {
        Self { table, index }
    }

    /// Returns the current key, or `None` once the walk is finished.
    pub fn key(&self) -> Option<&O::Query> {
        let (key, _) = self.table.slots.get(self.index)?.entry()?;
        Some(query::<O>(key))
    }

    /// Returns the current value.
    pub fn value(&self) -> Option<&V> {
        let (_, value) = self.table.slots.get(self.index)?.entry()?;
        Some(value)
    }

    /// Returns the current value mutably.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        let (_, value) = self.table.slots.get_mut(self.index)?.entry_mut()?;
        Some(value)
    }

    /// Returns the current key and a mutable reference to its value.
    pub fn current(&mut self) -> Option<(&O::Query, &mut V)> {
        let (key, value) = self.table.slots.get_mut(self.index)?.entry_mut()?;
        Some((query::<O>(key), value))
    }

    /// Moves to the next filled slot.
    pub fn move_next(&mut self) {
        if self.index < self.table.slots.len() {
            self.index = self.table.next_filled(self.index + 1);
        }
    }

    /// Removes the current entry, releasing its key, and moves to the next
    /// one. Returns `None` if the walk is already finished.
    pub fn remove_current(&mut self) -> Option<V> {
        if self.index >= self.table.slots.len() {
            return None;
        }
        let value = self.table.take_at(self.index);
        self.move_next();
        value
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use hashbrown::HashSet;

    use crate::IntMap;
    use crate::StrMap;

    #[test]
    fn iter_reports_exact_len() {
        let mut table: IntMap<u32, u32> = IntMap::new();
        for k in 0..37 {
            table.put(&k, k);
        }
        for k in 0..7 {
            table.delete(&k);
        }

        let iter = table.iter();
        assert_eq!(iter.len(), 30);
        assert_eq!(iter.count(), 30);
        assert_eq!(table.keys().len(), 30);
    }

    #[test]
    fn iter_mut_updates_values() {
        let mut table: StrMap<u32> = StrMap::new();
        table.put("one", 1);
        table.put("two", 2);

        for (_, value) in table.iter_mut() {
            *value *= 10;
        }
        for value in table.values_mut() {
            *value += 1;
        }
        assert_eq!(table.get("one"), Some(&11));
        assert_eq!(table.get("two"), Some(&21));
    }

    #[test]
    fn cursor_removes_visited_key() {
        let mut table: IntMap<i64, i32> = IntMap::new();
        for k in 0..3 {
            table.put(&k, k as i32);
        }

        let mut cursor = table.cursor_mut();
        let mut seen = Vec::new();
        while let Some(&key) = cursor.key() {
            seen.push(key);
            if key == 1 {
                cursor.remove_current();
            } else {
                cursor.move_next();
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, [0, 1, 2]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get_or(&1, -1), -1);
        assert_eq!(table.get_or(&2, -1), 2);
    }

    #[test]
    fn cursor_removes_every_other_entry() {
        let mut table: IntMap<u32, u32> = IntMap::new();
        for k in 0..200 {
            table.put(&k, k * 3);
        }
        let capacity = table.capacity();

        let mut visited = HashSet::new();
        let mut cursor = table.cursor_mut();
        while let Some(&key) = cursor.key() {
            assert!(visited.insert(key), "key {key} visited twice");
            assert_eq!(cursor.value(), Some(&(key * 3)));
            if key % 2 == 0 {
                assert_eq!(cursor.remove_current(), Some(key * 3));
            } else {
                cursor.move_next();
            }
        }
        assert_eq!(visited.len(), 200);

        assert_eq!(table.len(), 100);
        assert_eq!(table.deleted(), 100);
        assert_eq!(table.capacity(), capacity);
        for k in 0..200 {
            assert_eq!(table.contains(&k), k % 2 == 1);
        }
    }

    #[test]
    fn cursor_removes_everything_then_shrinks() {
        let mut table: IntMap<u32, u32> = IntMap::new();
        for k in 0..100 {
            table.put(&k, k);
        }

        let mut cursor = table.cursor_mut();
        let mut removed = 0;
        while cursor.remove_current().is_some() {
            removed += 1;
        }
        assert_eq!(removed, 100);
        assert!(cursor.key().is_none());
        assert!(cursor.remove_current().is_none());
        cursor.move_next();

        assert!(table.is_empty());
        assert_eq!(table.shrink_if_sparse(), Ok(true));
        assert_eq!(table.capacity(), crate::MIN_CAPACITY);
        assert_eq!(table.deleted(), 0);
    }

    #[test]
    fn cursor_edits_values_in_place() {
        let mut table: StrMap<Vec<u8>> = StrMap::new();
        table.put("a", Vec::new());
        table.put("b", Vec::new());

        let mut cursor = table.cursor_mut();
        while let Some((key, value)) = cursor.current() {
            value.extend_from_slice(key.as_bytes());
            cursor.move_next();
        }
        let mut cursor = table.cursor_mut();
        if let Some(value) = cursor.value_mut() {
            value.push(b'!');
        }

        let total: usize = table.values().map(Vec::len).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn drain_empties_and_keeps_capacity() {
        let mut table: StrMap<u32> = StrMap::new();
        for k in 0..20u32 {
            table.put(&alloc::format!("k{k}"), k);
        }
        table.delete("k0");
        let capacity = table.capacity();

        let mut drained: Vec<u32> = table.drain().map(|(_, value)| value).collect();
        drained.sort_unstable();
        assert_eq!(drained, (1..20).collect::<Vec<_>>());

        assert!(table.is_empty());
        assert_eq!(table.deleted(), 0);
        assert_eq!(table.capacity(), capacity);
        table.put("k0", 0);
        assert_eq!(table.get("k0"), Some(&0));
    }

    #[test]
    fn partial_drain_clears_the_rest() {
        let mut table: IntMap<u32, u32> = IntMap::new();
        for k in 0..10 {
            table.put(&k, k);
        }

        let mut drain = table.drain();
        assert_eq!(drain.len(), 10);
        assert!(drain.next().is_some());
        drop(drain);

        assert!(table.is_empty());
        assert!(table.iter().next().is_none());
    }
}
