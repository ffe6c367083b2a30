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

//! Byte-string hash functions used to route keys to bins.
//!
//! Every hasher maps a byte slice to a 32-bit value and must be deterministic:
//! an [`ArrayHash`] computes the bin of a key from this value on every
//! operation, so a hasher that returned different results for the same input
//! would lose entries.
//!
//! [`ArrayHash`]: crate::ArrayHash

use std::ffi::CStr;

/// A deterministic hash function over raw bytes.
///
/// Implemented by [`SuperFast`] (the default), [`CrapWow`], [`FxHash`], and by
/// any `Fn(&[u8]) -> u32` closure.
pub trait ByteHasher {
    /// Hashes `data`. The slice length is the key length.
    fn hash_bytes(&self, data: &[u8]) -> u32;

    /// Hashes the bytes of `data` up to, but not including, the first zero
    /// byte. If `data` contains no zero byte, all of it is hashed.
    fn hash_nul_terminated(&self, data: &[u8]) -> u32 {
        self.hash_bytes(nul_terminated(data))
    }

    /// Hashes the contents of a C string, excluding its terminator.
    fn hash_cstr(&self, data: &CStr) -> u32 {
        self.hash_bytes(data.to_bytes())
    }
}

impl<F: Fn(&[u8]) -> u32> ByteHasher for F {
    fn hash_bytes(&self, data: &[u8]) -> u32 {
        self(data)
    }
}

/// Returns the prefix of `data` that precedes the first zero byte.
pub fn nul_terminated(data: &[u8]) -> &[u8] {
    match memchr::memchr(0, data) {
        Some(end) => &data[..end],
        None => data,
    }
}

/// Paul Hsieh's SuperFastHash.
///
/// Consumes input four bytes at a time as pairs of little-endian 16-bit words,
/// then runs a fixed shift/xor/add avalanche over the accumulator. Empty input
/// always hashes to 0.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SuperFast;

impl ByteHasher for SuperFast {
    fn hash_bytes(&self, data: &[u8]) -> u32 {
        if data.is_empty() {
            return 0;
        }

        let mut hash = data.len() as u32;
        let mut chunks = data.chunks_exact(4);

        for chunk in &mut chunks {
            hash = hash.wrapping_add(get16(&chunk[..2]));
            let tmp = (get16(&chunk[2..]) << 11) ^ hash;
            hash = (hash << 16) ^ tmp;
            hash = hash.wrapping_add(hash >> 11);
        }

        // remainder bytes are sign extended
        match *chunks.remainder() {
            [a, b, c] => {
                hash = hash.wrapping_add(get16(&[a, b]));
                hash ^= hash << 16;
                hash ^= ((c as i8 as i32) << 18) as u32;
                hash = hash.wrapping_add(hash >> 11);
            }
            [a, b] => {
                hash = hash.wrapping_add(get16(&[a, b]));
                hash ^= hash << 11;
                hash = hash.wrapping_add(hash >> 17);
            }
            [a] => {
                hash = hash.wrapping_add(a as i8 as i32 as u32);
                hash ^= hash << 10;
                hash = hash.wrapping_add(hash >> 1);
            }
            _ => (),
        }

        hash ^= hash << 3;
        hash = hash.wrapping_add(hash >> 5);
        hash ^= hash << 4;
        hash = hash.wrapping_add(hash >> 17);
        hash ^= hash << 25;
        hash = hash.wrapping_add(hash >> 6);

        hash
    }
}

fn get16(bytes: &[u8]) -> u32 {
    u16::from_le_bytes([bytes[0], bytes[1]]) as u32
}

const CRAPWOW_M: u32 = 0x5755_9429;
const CRAPWOW_N: u32 = 0x5052_acdb;

/// Andrew Rollings' CrapWow, portable multiply-and-fold variant.
///
/// Input is consumed as little-endian 32-bit words, eight bytes per round, so
/// results are identical on every target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CrapWow {
    seed: u32,
}

impl CrapWow {
    /// Creates a CrapWow hasher with a seed of 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a CrapWow hasher that mixes `seed` into every hash.
    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl ByteHasher for CrapWow {
    fn hash_bytes(&self, data: &[u8]) -> u32 {
        let len = data.len() as u32;
        let mut h = len;
        let mut k = len.wrapping_add(self.seed).wrapping_add(CRAPWOW_N);

        let mut chunks = data.chunks_exact(8);

        for chunk in &mut chunks {
            fold(get32(&chunk[..4]), CRAPWOW_N, &mut h, &mut k);
            fold(get32(&chunk[4..]), CRAPWOW_M, &mut k, &mut h);
        }

        let mut rest = chunks.remainder();

        if rest.len() >= 4 {
            fold(get32(&rest[..4]), CRAPWOW_N, &mut h, &mut k);
            rest = &rest[4..];
        }

        if !rest.is_empty() {
            fold(get32(rest), CRAPWOW_M, &mut k, &mut h);
        }

        let last = h ^ k.wrapping_add(CRAPWOW_N);
        fold(last, CRAPWOW_N, &mut h, &mut k);

        k ^ h
    }
}

fn fold(a: u32, b: u32, lo: &mut u32, hi: &mut u32) {
    let product = a as u64 * b as u64;

    *lo ^= product as u32;
    *hi ^= (product >> 32) as u32;
}

// reads up to four bytes, zero filling the missing high bytes
fn get32(bytes: &[u8]) -> u32 {
    let mut word = [0; 4];
    let len = bytes.len().min(4);
    word[..len].copy_from_slice(&bytes[..len]);

    u32::from_le_bytes(word)
}

/// The Firefox hash, truncated to 32 bits.
///
/// Fast for short keys but with weaker mixing than [`SuperFast`]; mostly
/// useful as a baseline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FxHash;

impl ByteHasher for FxHash {
    fn hash_bytes(&self, data: &[u8]) -> u32 {
        fxhash::hash32(data)
    }
}
