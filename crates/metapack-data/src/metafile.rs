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

//! The finished product of a recording session.

use crate::arrays::ArrayStore;
use crate::stream::StreamReader;
use metapack_core::error::StreamError;
use metapack_core::math::Aabb;
use metapack_core::metafile::{Command, PackStats};

/// A recorded command stream together with the arrays its draw records reference.
///
/// A metafile is immutable once returned by the packager. Replaying it any number
/// of times yields the same sequence of commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Metafile {
    stream: Vec<u8>,
    arrays: ArrayStore,
    extents: Option<Aabb>,
    stats: PackStats,
    word_size: u32,
}

impl Metafile {
    /// Assembles a metafile from its parts.
    pub fn new(
        stream: Vec<u8>,
        arrays: ArrayStore,
        extents: Option<Aabb>,
        stats: PackStats,
        word_size: u32,
    ) -> Self {
        Self {
            stream,
            arrays,
            extents,
            stats,
            word_size,
        }
    }

    /// The raw command stream.
    pub fn stream(&self) -> &[u8] {
        &self.stream
    }

    /// The arrays referenced by the stream.
    pub fn arrays(&self) -> &ArrayStore {
        &self.arrays
    }

    /// The bounding box of all packed positions, if extents were tracked and
    /// any geometry was packed.
    pub fn extents(&self) -> Option<Aabb> {
        self.extents
    }

    /// Counters gathered while recording.
    pub fn stats(&self) -> &PackStats {
        &self.stats
    }

    /// The alignment, in bytes, of aligned records in the stream.
    pub fn word_size(&self) -> u32 {
        self.word_size
    }

    /// Returns an iterator that decodes the stream lazily.
    pub fn reader(&self) -> StreamReader<'_> {
        StreamReader::new(&self.stream)
    }

    /// Decodes the whole stream.
    pub fn commands(&self) -> Result<Vec<Command>, StreamError> {
        self.reader().collect()
    }

    /// Splits the metafile into its stream and arrays.
    pub fn into_parts(self) -> (Vec<u8>, ArrayStore) {
        (self.stream, self.arrays)
    }
}
