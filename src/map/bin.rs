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

use super::record::{self, FIRST_RECORD};
use crate::error::Result;

use std::{marker::PhantomData, mem, ptr};

/// A single bucket of an [`ArrayHash`]: one contiguous buffer of packed
/// records.
///
/// The buffer is always sized exactly to its contents. Adding a key grows it
/// by one record and removing a key shrinks it by one record, so there is no
/// spare capacity to amortize growth.
///
/// [`ArrayHash`]: crate::ArrayHash
pub(crate) struct Bin<V> {
    words: Vec<u64>,
    marker: PhantomData<V>,
}

impl<V> Bin<V> {
    const VALUE_FITS_ALIGNMENT: () = assert!(
        mem::align_of::<V>() <= record::ALIGNMENT,
        "values must not require more than 8-byte alignment"
    );

    /// Allocates a bin holding a single record for `key` with a default value.
    pub(crate) fn with_key(key: &[u8]) -> Result<Self>
    where
        V: Default,
    {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALUE_FITS_ALIGNMENT;

        let value = V::default();
        let len = record::words(record::COUNT_WIDTH + record::record_size::<V>(key.len()));

        let mut words = Vec::new();
        words.try_reserve_exact(len)?;
        words.resize(len, 0);

        record::encode_record(&mut words, FIRST_RECORD, key, value);
        record::set_record_count(&mut words, 1);

        Ok(Self {
            words,
            marker: PhantomData,
        })
    }

    pub(crate) fn len(&self) -> usize {
        record::record_count(&self.words)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the bin's buffer in bytes.
    pub(crate) fn size(&self) -> usize {
        self.words.len() * record::ALIGNMENT
    }

    pub(crate) fn get(&self, key: &[u8]) -> Option<&V> {
        let record = record::scan_bin::<V>(&self.words, key)?;

        Some(self.value(record))
    }

    pub(crate) fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let record = record::scan_bin::<V>(&self.words, key)?;

        Some(self.value_mut(record))
    }

    /// Returns the value of the first record.
    pub(crate) fn first_mut(&mut self) -> &mut V {
        assert!(!self.is_empty());

        self.value_mut(FIRST_RECORD)
    }

    /// Returns the value associated with `key`, appending a record with a
    /// default value if there is none. The flag is true if a record was
    /// appended.
    ///
    /// If the buffer cannot grow, the bin is left unmodified.
    pub(crate) fn get_or_insert(&mut self, key: &[u8]) -> Result<(&mut V, bool)>
    where
        V: Default,
    {
        if let Some(record) = record::scan_bin::<V>(&self.words, key) {
            return Ok((self.value_mut(record), false));
        }

        let value = V::default();
        let old_len = self.words.len();
        let additional = record::words(record::record_size::<V>(key.len()));

        self.words.try_reserve_exact(additional)?;
        self.words.resize(old_len + additional, 0);

        let record = old_len * record::ALIGNMENT;
        record::encode_record(&mut self.words, record, key, value);

        let count = record::record_count(&self.words);
        record::set_record_count(&mut self.words, count + 1);

        Ok((self.value_mut(record), true))
    }

    /// Removes the record for `key`, closing the gap it leaves and shrinking
    /// the buffer. Returns the removed value.
    pub(crate) fn remove(&mut self, key: &[u8]) -> Option<V> {
        let record = record::scan_bin::<V>(&self.words, key)?;
        let value_offset = record::value_offset(&self.words, record);

        // SAFETY: every record holds an initialized value, and the record is
        // discarded below without dropping it again
        let value = unsafe { record::value_slot::<V>(self.words.as_ptr(), value_offset).read() };

        let start = record::words(record);
        let len = record::words(record::record_size::<V>(key.len()));
        self.words.drain(start..start + len);
        self.words.shrink_to_fit();

        let count = record::record_count(&self.words);
        record::set_record_count(&mut self.words, count - 1);

        Some(value)
    }

    pub(crate) fn iter(&self) -> Iter<'_, V> {
        Iter {
            bin: self,
            next: FIRST_RECORD,
            remaining: self.len(),
        }
    }

    fn value(&self, record: usize) -> &V {
        let offset = record::value_offset(&self.words, record);

        // SAFETY: `record` came from scanning this bin, so its slot is in
        // bounds and holds an initialized value
        unsafe { &*record::value_slot::<V>(self.words.as_ptr(), offset) }
    }

    fn value_mut(&mut self, record: usize) -> &mut V {
        let offset = record::value_offset(&self.words, record);

        // SAFETY: see `value`
        unsafe { &mut *record::value_slot_mut::<V>(self.words.as_mut_ptr(), offset) }
    }
}

impl<V> Drop for Bin<V> {
    fn drop(&mut self) {
        if !mem::needs_drop::<V>() {
            return;
        }

        let mut record = FIRST_RECORD;

        for _ in 0..self.len() {
            let next = record::next_record::<V>(&self.words, record);
            let offset = record::value_offset(&self.words, record);

            unsafe { ptr::drop_in_place(record::value_slot_mut::<V>(self.words.as_mut_ptr(), offset)) };

            record = next;
        }
    }
}

/// Iterator over the keys and values of a bin, in insertion order.
///
/// The buffer is borrowed from the bin afresh on every step rather than held
/// as a slice, since values already yielded may be written through a `Cell`.
pub(crate) struct Iter<'a, V: 'a> {
    bin: &'a Bin<V>,
    next: usize,
    remaining: usize,
}

impl<'a, V: 'a> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let bin = self.bin;
        let record = self.next;

        self.next = record::next_record::<V>(&bin.words, record);
        self.remaining -= 1;

        Some((record::key(&bin.words, record), bin.value(record)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V: 'a> ExactSizeIterator for Iter<'a, V> {}
