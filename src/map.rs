// MIT License
//
// Copyright (c) 2020 Gregory Meyer
//
// Permission is hereby granted, free of charge, to any person
// obtaining a copy of this software and associated documentation files
// (the "Software"), to deal in the Software without restriction,
// including without limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of the Software,
// and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
// BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
// ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! An array hash table for byte-string keys.

mod bin;
mod record;

#[cfg(test)]
mod tests;

use bin::Bin;

use crate::{
    error::{Error, Result},
    hash::{ByteHasher, SuperFast},
    key::KeyBytes,
};

use std::{
    fmt::{self, Debug, Formatter},
    iter::FusedIterator,
    mem, slice,
};

/// Number of bins used by [`ArrayHash::new`] and [`ArrayHash::with_hasher`].
pub const DEFAULT_BIN_COUNT: usize = 16384;

/// Default hasher for `ArrayHash`.
///
/// This is [`SuperFast`], Paul Hsieh's SuperFastHash, which mixes short string
/// keys well and is cheap to compute.
pub type DefaultHasher = SuperFast;

/// A hash table specialized for byte-string keys, as described by Askitis and
/// Zobel.
///
/// Keys are hashed to one of a fixed number of bins. Instead of a linked list
/// of nodes, every bin is a single contiguous buffer in which keys and values
/// are stored back to back, each key prefixed by its length and every field
/// padded to 8 bytes. A lookup hashes the key once and then scans one buffer
/// linearly, which keeps probes within a few cache lines and avoids a heap
/// allocation per key.
///
/// The number of bins is chosen at construction and never changes. Each bin
/// grows by exactly one record per new key, so inserting into a bin costs a
/// reallocation proportional to the bin's size; pick a bin count close to the
/// expected number of keys.
///
/// Keys are anything implementing [`KeyBytes`]: byte slices and strings use
/// their full length and may contain zero bytes, while [`CStr`] keys end at
/// their terminator. Values must implement [`Default`] for insertion, since
/// a new key's value is constructed in place before it is assigned, and must
/// not require more than 8-byte alignment.
///
/// References returned by [`get_or_insert`] and friends point into a bin's
/// buffer and are invalidated by the next mutation, which the borrow checker
/// enforces.
///
/// [`CStr`]: std::ffi::CStr
/// [`get_or_insert`]: #method.get_or_insert
pub struct ArrayHash<V, H = DefaultHasher> {
    bins: Box<[Option<Bin<V>>]>,
    hasher: H,
    len: usize,
}

impl<V> ArrayHash<V, DefaultHasher> {
    /// Creates an empty `ArrayHash` with [`DEFAULT_BIN_COUNT`] bins.
    ///
    /// Only the bin slots are allocated; each bin allocates its buffer on its
    /// first insertion.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHasher::default())
    }

    /// Creates an empty `ArrayHash` with `bins` bins.
    ///
    /// Fails with [`Error::Config`] if `bins` is zero.
    pub fn with_bins(bins: usize) -> Result<Self> {
        Self::with_bins_and_hasher(bins, DefaultHasher::default())
    }
}

impl<V, H: ByteHasher> ArrayHash<V, H> {
    /// Creates an empty `ArrayHash` with [`DEFAULT_BIN_COUNT`] bins that will
    /// use `hasher` to route keys.
    pub fn with_hasher(hasher: H) -> Self {
        let bins = (0..DEFAULT_BIN_COUNT).map(|_| None).collect();

        Self::from_parts(bins, hasher)
    }

    /// Creates an empty `ArrayHash` with `bins` bins that will use `hasher` to
    /// route keys.
    ///
    /// Fails with [`Error::Config`] if `bins` is zero, or with
    /// [`Error::OutOfMemory`] if the bin slots cannot be allocated.
    pub fn with_bins_and_hasher(bins: usize, hasher: H) -> Result<Self> {
        if bins == 0 {
            return Err(Error::Config { bins });
        }

        let mut slots = Vec::new();
        slots.try_reserve_exact(bins)?;
        slots.resize_with(bins, || None);

        Ok(Self::from_parts(slots.into_boxed_slice(), hasher))
    }

    fn from_parts(bins: Box<[Option<Bin<V>>]>, hasher: H) -> Self {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(bins = bins.len(), "array hash created");
        }

        Self {
            bins,
            hasher,
            len: 0,
        }
    }

    /// Returns the number of keys in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table contains no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of bins, which is fixed for the table's lifetime.
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Returns a reference to the table's hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns the total size in bytes of all allocated bin buffers.
    pub fn bin_bytes(&self) -> usize {
        self.bins.iter().flatten().map(Bin::size).sum()
    }

    /// Returns true if the table contains a value for `key`.
    pub fn contains_key<Q: KeyBytes + ?Sized>(&self, key: &Q) -> bool {
        self.get(key).is_some()
    }

    /// Returns a reference to the value corresponding to `key`.
    pub fn get<Q: KeyBytes + ?Sized>(&self, key: &Q) -> Option<&V> {
        let key = key.key_bytes();

        self.bins[self.bin_index(key)].as_ref()?.get(key)
    }

    /// Returns a mutable reference to the value corresponding to `key`.
    pub fn get_mut<Q: KeyBytes + ?Sized>(&mut self, key: &Q) -> Option<&mut V> {
        let key = key.key_bytes();
        let index = self.bin_index(key);

        self.bins[index].as_mut()?.get_mut(key)
    }

    /// Returns a mutable reference to the value corresponding to `key`,
    /// inserting [`V::default()`] first if the key is not present.
    ///
    /// If the bin of `key` cannot grow, [`Error::OutOfMemory`] is returned and
    /// the table is unchanged.
    ///
    /// [`V::default()`]: Default::default
    pub fn get_or_insert<Q: KeyBytes + ?Sized>(&mut self, key: &Q) -> Result<&mut V>
    where
        V: Default,
    {
        self.entry(key.key_bytes()).map(|(value, _)| value)
    }

    /// Associates `value` with `key`, returning the previous value if the key
    /// was already present.
    ///
    /// Re-inserting an existing key overwrites its value in place.
    pub fn insert<Q: KeyBytes + ?Sized>(&mut self, key: &Q, value: V) -> Result<Option<V>>
    where
        V: Default,
    {
        let (slot, inserted) = self.entry(key.key_bytes())?;
        let previous = mem::replace(slot, value);

        Ok(if inserted { None } else { Some(previous) })
    }

    /// Removes `key` from the table, returning true if it was present.
    pub fn remove<Q: KeyBytes + ?Sized>(&mut self, key: &Q) -> bool {
        self.take(key).is_some()
    }

    /// Removes `key` from the table, returning its value if it was present.
    ///
    /// A bin whose last key is removed releases its buffer.
    pub fn take<Q: KeyBytes + ?Sized>(&mut self, key: &Q) -> Option<V> {
        let key = key.key_bytes();
        let index = self.bin_index(key);
        let slot = &mut self.bins[index];

        let value = slot.as_mut()?.remove(key)?;

        if slot.as_ref().map_or(false, Bin::is_empty) {
            *slot = None;

            tracing::trace!(bin = index, "bin released");
        }

        self.len -= 1;

        Some(value)
    }

    /// Removes every key, releasing all bin buffers. The bin count is kept.
    pub fn clear(&mut self) {
        for slot in self.bins.iter_mut() {
            *slot = None;
        }

        self.len = 0;
    }

    /// Returns an iterator over keys and values in unspecified order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            bins: self.bins.iter(),
            current: None,
            remaining: self.len,
        }
    }

    /// Returns an iterator over keys in unspecified order.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    fn bin_index(&self, key: &[u8]) -> usize {
        self.hasher.hash_bytes(key) as usize % self.bins.len()
    }

    fn entry(&mut self, key: &[u8]) -> Result<(&mut V, bool)>
    where
        V: Default,
    {
        let index = self.bin_index(key);

        let result = match self.bins[index] {
            Some(ref mut bin) => bin.get_or_insert(key),
            ref mut empty @ None => {
                Bin::with_key(key).map(|bin| (empty.insert(bin).first_mut(), true))
            }
        };

        match result {
            Ok((value, inserted)) => {
                if inserted {
                    self.len += 1;
                }

                Ok((value, inserted))
            }
            Err(err) => {
                if tracing::enabled!(tracing::Level::WARN) {
                    tracing::warn!(bin = index, key_len = key.len(), error = %err, "bin allocation failed");
                }

                Err(err)
            }
        }
    }
}

impl<V, H: ByteHasher + Default> Default for ArrayHash<V, H> {
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

/// Inserts every key-value pair, overwriting the values of keys already
/// present.
///
/// # Panics
///
/// Panics if a bin cannot grow, as std collections do when allocation fails.
/// Use [`ArrayHash::insert`] to handle [`Error::OutOfMemory`] instead.
impl<K: KeyBytes, V: Default, H: ByteHasher> Extend<(K, V)> for ArrayHash<V, H> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            if let Err(err) = self.insert(&key, value) {
                panic!("failed to extend array hash: {err}");
            }
        }
    }
}

impl<V: Debug, H: ByteHasher> Debug for ArrayHash<V, H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value)| (ByteStr(key), value)))
            .finish()
    }
}

impl<'a, V, H: ByteHasher> IntoIterator for &'a ArrayHash<V, H> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

// prints keys as escaped byte strings
struct ByteStr<'a>(&'a [u8]);

impl Debug for ByteStr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "b\"{}\"", self.0.escape_ascii())
    }
}

/// Iterator over the entries of an [`ArrayHash`].
///
/// Created by [`ArrayHash::iter`].
pub struct Iter<'a, V> {
    bins: slice::Iter<'a, Option<Bin<V>>>,
    current: Option<bin::Iter<'a, V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;

                return Some(entry);
            }

            self.current = Some(self.bins.by_ref().flatten().next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// Iterator over the keys of an [`ArrayHash`].
///
/// Created by [`ArrayHash::keys`].
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}

impl<V> FusedIterator for Keys<'_, V> {}
