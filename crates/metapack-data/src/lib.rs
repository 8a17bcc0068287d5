// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Metapack Data
//!
//! The storage substrate the packager writes into: an append-only
//! [`ByteStream`] of opcodes, an [`ArrayStore`] of shared typed arrays, and the
//! finished [`Metafile`] that bundles both for replay.

#![warn(missing_docs)]

pub mod arrays;
pub mod metafile;
pub mod stream;

pub use arrays::{ArrayData, ArrayElement, ArrayStore};
pub use metafile::Metafile;
pub use stream::{ByteStream, Scalar, StreamReader};
