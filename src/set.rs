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

use crate::{
    error::Result,
    hash::ByteHasher,
    key::KeyBytes,
    map::{ArrayHash, DefaultHasher, Keys},
};

/// A set of byte-string keys backed by an [`ArrayHash`] with no values.
///
/// Records in a set are a length header and the padded key bytes only.
pub struct ArrayHashSet<H = DefaultHasher> {
    map: ArrayHash<(), H>,
}

impl ArrayHashSet<DefaultHasher> {
    pub fn new() -> Self {
        Self {
            map: ArrayHash::new(),
        }
    }

    pub fn with_bins(bins: usize) -> Result<Self> {
        Ok(Self {
            map: ArrayHash::with_bins(bins)?,
        })
    }
}

impl<H: ByteHasher + Default> Default for ArrayHashSet<H> {
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

/// # Panics
///
/// Panics if a bin cannot grow. Use [`ArrayHashSet::insert`] to handle
/// [`Error::OutOfMemory`](crate::Error::OutOfMemory) instead.
impl<K: KeyBytes, H: ByteHasher> Extend<K> for ArrayHashSet<H> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.map.extend(iter.into_iter().map(|key| (key, ())));
    }
}

impl<H: ByteHasher> ArrayHashSet<H> {
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            map: ArrayHash::with_hasher(hasher),
        }
    }

    pub fn with_bins_and_hasher(bins: usize, hasher: H) -> Result<Self> {
        Ok(Self {
            map: ArrayHash::with_bins_and_hasher(bins, hasher)?,
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn bin_count(&self) -> usize {
        self.map.bin_count()
    }

    pub fn contains<Q: KeyBytes + ?Sized>(&self, key: &Q) -> bool {
        self.map.contains_key(key)
    }

    /// Adds `key` to the set, returning true if it was not already present.
    pub fn insert<Q: KeyBytes + ?Sized>(&mut self, key: &Q) -> Result<bool> {
        Ok(self.map.insert(key, ())?.is_none())
    }

    /// Removes `key` from the set, returning true if it was present.
    pub fn remove<Q: KeyBytes + ?Sized>(&mut self, key: &Q) -> bool {
        self.map.remove(key)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns an iterator over the keys in unspecified order.
    pub fn iter(&self) -> Keys<'_, ()> {
        self.map.keys()
    }
}
