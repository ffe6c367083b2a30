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

//! Array hash tables for byte-string keys.
//!
//! [`ArrayHash`] stores every bucket as one contiguous buffer of
//! length-prefixed keys and their values, rather than as a chain of
//! individually allocated nodes. Lookups touch a single buffer per key and
//! insertions never allocate a node, which makes it well suited to string-keyed
//! workloads with many small keys.
//!
//! ```
//! use arrayhash::ArrayHash;
//!
//! let mut counts = ArrayHash::<u32>::new();
//!
//! for word in "the quick brown fox jumps over the lazy dog".split(' ') {
//!     *counts.get_or_insert(word)? += 1;
//! }
//!
//! assert_eq!(counts.get("the"), Some(&2));
//! assert_eq!(counts.get("cat"), None);
//! # Ok::<(), arrayhash::Error>(())
//! ```

pub mod error;
pub mod hash;
pub mod key;
pub mod map;
pub mod set;

pub use error::{Error, Result};
pub use hash::{nul_terminated, ByteHasher, CrapWow, FxHash, SuperFast};
pub use key::KeyBytes;
pub use map::{ArrayHash, DEFAULT_BIN_COUNT};
pub use set::ArrayHashSet;
