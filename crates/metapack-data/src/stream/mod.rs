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

//! The opcode byte stream: an append-only sink and a decoding reader.
//!
//! # Record layout
//!
//! ```text
//! [padding 0x00 ...] [tag u8] [operands, little-endian ...]
//! ```
//!
//! Records whose tag [is aligned](metapack_core::metafile::OpcodeTag::is_aligned)
//! are preceded by enough `0x00` padding bytes that their operand block starts
//! on a multiple of the configured word size.

mod reader;
mod sink;

pub use reader::StreamReader;
pub use sink::{ByteStream, Scalar};
