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

//! Defines the hierarchy of error types for metafile decoding and replay.
//!
//! Packing itself has no recoverable error path: contract violations in the hot
//! loop are debug assertions. The types here cover the fallible boundaries,
//! namely reading a byte stream back, resolving array handles, and loading settings.

use crate::metafile::{ArrayId, OpcodeTag};
use std::fmt;

/// An error raised while decoding a recorded byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The stream ended in the middle of a record.
    Truncated {
        /// Byte offset of the record that could not be completed.
        offset: usize,
        /// Number of bytes the record still needed.
        needed: usize,
    },
    /// A tag byte does not name any known opcode.
    UnknownOpcode {
        /// Byte offset of the tag.
        offset: usize,
        /// The offending tag value.
        tag: u8,
    },
    /// An operand holds a value outside the domain of its type.
    InvalidOperand {
        /// Byte offset of the record.
        offset: usize,
        /// The opcode whose operand is invalid.
        opcode: OpcodeTag,
        /// The raw operand value.
        value: u64,
    },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Truncated { offset, needed } => {
                write!(
                    f,
                    "Stream truncated in record at offset {offset}: {needed} more bytes needed"
                )
            }
            StreamError::UnknownOpcode { offset, tag } => {
                write!(f, "Unknown opcode tag {tag:#04x} at offset {offset}")
            }
            StreamError::InvalidOperand {
                offset,
                opcode,
                value,
            } => {
                write!(
                    f,
                    "Invalid operand {value:#x} for {opcode:?} at offset {offset}"
                )
            }
        }
    }
}

impl std::error::Error for StreamError {}

/// An error raised while resolving an array handle against an array store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    /// No array is registered under the handle.
    UnknownArray(ArrayId),
    /// The array exists but holds a different element type.
    TypeMismatch {
        /// The handle that was resolved.
        id: ArrayId,
        /// The element type the caller asked for.
        expected: &'static str,
        /// The element type the array actually holds.
        found: &'static str,
    },
    /// An element range lies outside the array.
    OutOfBounds {
        /// The handle that was resolved.
        id: ArrayId,
        /// One past the last element requested.
        end: usize,
        /// The length of the array.
        len: usize,
    },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayError::UnknownArray(id) => write!(f, "No array registered for {id:?}"),
            ArrayError::TypeMismatch {
                id,
                expected,
                found,
            } => {
                write!(f, "Array {id:?} holds {found}, expected {expected}")
            }
            ArrayError::OutOfBounds { id, end, len } => {
                write!(
                    f,
                    "Range ending at {end} is out of bounds for array {id:?} of length {len}"
                )
            }
        }
    }
}

impl std::error::Error for ArrayError {}

/// A high-level error raised while replaying a metafile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetafileError {
    /// The byte stream could not be decoded.
    Stream(StreamError),
    /// A command referenced an array that could not be resolved.
    Array(ArrayError),
    /// A draw command was recorded while no arrays were bound.
    DrawWithoutArrays,
}

impl fmt::Display for MetafileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetafileError::Stream(err) => write!(f, "Metafile stream error: {err}"),
            MetafileError::Array(err) => write!(f, "Metafile array error: {err}"),
            MetafileError::DrawWithoutArrays => {
                write!(f, "Draw command recorded without bound arrays")
            }
        }
    }
}

impl std::error::Error for MetafileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MetafileError::Stream(err) => Some(err),
            MetafileError::Array(err) => Some(err),
            MetafileError::DrawWithoutArrays => None,
        }
    }
}

impl From<StreamError> for MetafileError {
    fn from(err: StreamError) -> Self {
        MetafileError::Stream(err)
    }
}

impl From<ArrayError> for MetafileError {
    fn from(err: ArrayError) -> Self {
        MetafileError::Array(err)
    }
}

/// An error raised while loading packager settings.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// The settings document could not be parsed.
    Parse(String),
    /// The word size is zero or not a power of two.
    InvalidWordSize(u32),
    /// The point-fold tolerance is negative or NaN.
    InvalidTolerance(f32),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Parse(msg) => write!(f, "Failed to parse packager settings: {msg}"),
            SettingsError::InvalidWordSize(size) => {
                write!(f, "Word size {size} is not a power of two")
            }
            SettingsError::InvalidTolerance(tolerance) => {
                write!(f, "Point fold tolerance {tolerance} must be non-negative")
            }
        }
    }
}

impl std::error::Error for SettingsError {}
