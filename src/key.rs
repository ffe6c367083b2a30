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

//! Conversion of key types to the bytes that are hashed and stored.

use std::ffi::{CStr, CString};

/// Types that can be used as keys of an [`ArrayHash`].
///
/// Byte slices, strings and byte vectors use their full length, so keys may
/// contain zero bytes. [`CStr`] and [`CString`] use the bytes before their
/// terminator.
///
/// [`ArrayHash`]: crate::ArrayHash
pub trait KeyBytes {
    /// Returns the bytes of the key, excluding any terminator.
    fn key_bytes(&self) -> &[u8];
}

impl KeyBytes for [u8] {
    fn key_bytes(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> KeyBytes for [u8; N] {
    fn key_bytes(&self) -> &[u8] {
        self
    }
}

impl KeyBytes for Vec<u8> {
    fn key_bytes(&self) -> &[u8] {
        self
    }
}

impl KeyBytes for str {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl KeyBytes for String {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl KeyBytes for CStr {
    fn key_bytes(&self) -> &[u8] {
        self.to_bytes()
    }
}

impl KeyBytes for CString {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<K: KeyBytes + ?Sized> KeyBytes for &K {
    fn key_bytes(&self) -> &[u8] {
        (**self).key_bytes()
    }
}
