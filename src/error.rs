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

//! Errors returned by fallible table operations.

use std::collections::TryReserveError;

/// Errors returned by [`ArrayHash`] and [`ArrayHashSet`].
///
/// A missing key is never an error; lookups report absence through [`Option`]
/// and [`bool`].
///
/// [`ArrayHash`]: crate::ArrayHash
/// [`ArrayHashSet`]: crate::ArrayHashSet
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The table was configured with an unusable bin count.
    #[error("invalid bin count: {bins} (must be positive)")]
    Config {
        /// Requested number of bins.
        bins: usize,
    },
    /// The allocator could not satisfy a bin allocation or growth.
    ///
    /// The table is left exactly as it was before the failed call.
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

/// Result type for fallible table operations.
pub type Result<T> = std::result::Result<T, Error>;
