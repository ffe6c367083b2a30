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

//! Packed record layout for bin buffers.
//!
//! A bin is a buffer of 8-byte words addressed by byte offsets. It starts with
//! the record count, followed by that many records laid out back to back:
//!
//! ```text
//! | count | key_len | key bytes + pad | value + pad | key_len | ...
//! ```
//!
//! Every field starts at a multiple of [`ALIGNMENT`], so all offsets handled
//! here are multiples of 8 and convert to word indices by division.

use std::{marker::PhantomData, mem};

pub(crate) const ALIGNMENT: usize = 8;

/// Width of the record count at the start of every bin.
pub(crate) const COUNT_WIDTH: usize = mem::size_of::<u64>();

/// Width of the key length at the start of every record.
pub(crate) const HEADER_WIDTH: usize = mem::size_of::<u64>();

/// Offset of the first record in a bin.
pub(crate) const FIRST_RECORD: usize = COUNT_WIDTH;

pub(crate) fn aligned_size(len: usize) -> usize {
    aligned_size_to(len, ALIGNMENT)
}

pub(crate) fn aligned_size_to(len: usize, multiple: usize) -> usize {
    match len % multiple {
        0 => len,
        remainder => len + multiple - remainder,
    }
}

pub(crate) fn value_size<V>() -> usize {
    aligned_size(mem::size_of::<V>())
}

/// Bytes occupied by a record holding a `key_len` byte key and a `V`.
pub(crate) fn record_size<V>(key_len: usize) -> usize {
    HEADER_WIDTH + aligned_size(key_len) + value_size::<V>()
}

pub(crate) fn words(bytes: usize) -> usize {
    debug_assert_eq!(bytes % ALIGNMENT, 0);

    bytes / ALIGNMENT
}

pub(crate) fn record_count(buf: &[u64]) -> usize {
    buf[0] as usize
}

pub(crate) fn set_record_count(buf: &mut [u64], count: usize) {
    buf[0] = count as u64;
}

pub(crate) fn key_len(buf: &[u64], record: usize) -> usize {
    buf[words(record)] as usize
}

pub(crate) fn key(buf: &[u64], record: usize) -> &[u8] {
    let len = key_len(buf, record);
    let start = words(record + HEADER_WIDTH);
    let padded: &[u8] = bytemuck::cast_slice(&buf[start..start + words(aligned_size(len))]);

    &padded[..len]
}

pub(crate) fn value_offset(buf: &[u64], record: usize) -> usize {
    record + HEADER_WIDTH + aligned_size(key_len(buf, record))
}

pub(crate) fn next_record<V>(buf: &[u64], record: usize) -> usize {
    record + record_size::<V>(key_len(buf, record))
}

/// Writes a record for `key` at `record`, moving `value` into its value slot.
/// Returns the offset of the value slot.
///
/// The words covered by the record must not hold a live value; whatever they
/// contain is overwritten without being dropped.
pub(crate) fn encode_record<V>(buf: &mut [u64], record: usize, key: &[u8], value: V) -> usize {
    let start = words(record);
    let key_words = words(aligned_size(key.len()));

    buf[start] = key.len() as u64;

    let padded: &mut [u8] = bytemuck::cast_slice_mut(&mut buf[start + 1..start + 1 + key_words]);
    padded[..key.len()].copy_from_slice(key);
    padded[key.len()..].fill(0);

    let value_offset = record + HEADER_WIDTH + key_words * ALIGNMENT;
    assert!(value_offset + value_size::<V>() <= buf.len() * ALIGNMENT);

    // SAFETY: the slot is in bounds, 8-byte aligned and holds no live value
    unsafe { value_slot_mut::<V>(buf.as_mut_ptr(), value_offset).write(value) };

    value_offset
}

/// Returns the offset of the record whose key is exactly `key`.
///
/// Key lengths are compared before key bytes, so a key never matches a stored
/// key that it is only a prefix of.
pub(crate) fn scan_bin<V>(buf: &[u64], key: &[u8]) -> Option<usize> {
    Records::<V>::new(buf).find(|&record| {
        key_len(buf, record) == key.len() && self::key(buf, record) == key
    })
}

/// Returns a pointer to the value slot at `value_offset` in the buffer that
/// starts at `base`.
///
/// `base` must be the buffer pointer of the owning `Vec` (`Vec::as_ptr`), not
/// a pointer taken from a reference to a subslice: values may contain a
/// `Cell` or other interior mutability and get written through `&V`.
///
/// # Safety
///
/// `value_offset` must be at most the length of the buffer in bytes.
pub(crate) unsafe fn value_slot<V>(base: *const u64, value_offset: usize) -> *const V {
    base.add(words(value_offset)).cast()
}

/// Mutable counterpart of [`value_slot`].
///
/// # Safety
///
/// See [`value_slot`].
pub(crate) unsafe fn value_slot_mut<V>(base: *mut u64, value_offset: usize) -> *mut V {
    base.add(words(value_offset)).cast()
}

/// Iterator over the record offsets of a bin.
pub(crate) struct Records<'a, V> {
    buf: &'a [u64],
    next: usize,
    remaining: usize,
    marker: PhantomData<fn() -> V>,
}

impl<'a, V> Records<'a, V> {
    pub(crate) fn new(buf: &'a [u64]) -> Self {
        Self {
            buf,
            next: FIRST_RECORD,
            remaining: record_count(buf),
            marker: PhantomData,
        }
    }
}

impl<V> Iterator for Records<'_, V> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }

        let record = self.next;
        self.next = next_record::<V>(self.buf, record);
        self.remaining -= 1;

        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Records<'_, V> {}
