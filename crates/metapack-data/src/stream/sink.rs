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

use metapack_core::metafile::{ArrayId, Command, LineWeight, OpcodeTag};

/// A fixed-size value that can be written to the stream in little-endian order.
pub trait Scalar: Copy {
    /// Appends the little-endian encoding of `self` to `out`.
    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_scalar!(u8, u16, u32, u64, f32);

/// An append-only, growable byte buffer that metafile records are written into.
///
/// The sink never fails: it grows as needed, and allocation failure aborts the
/// process like any other `Vec` growth. There is no rewind; a record, once
/// written, stays.
#[derive(Debug, Default, Clone)]
pub struct ByteStream {
    bytes: Vec<u8>,
}

impl ByteStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Creates an empty stream with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the stream, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Takes the written bytes, leaving the stream empty.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }

    /// Writes a record tag.
    #[inline]
    pub fn write_chunk(&mut self, tag: OpcodeTag) {
        self.bytes.push(tag as u8);
    }

    /// Writes a scalar operand.
    #[inline]
    pub fn write_scalar<S: Scalar>(&mut self, value: S) {
        value.write_le(&mut self.bytes);
    }

    /// Writes a reference to an array in the array store.
    #[inline]
    pub fn write_array_ref(&mut self, id: ArrayId) {
        self.write_scalar(id.0);
    }

    /// Pads with `0x00` so that, once `prefix_bytes` more bytes are written,
    /// the stream length is a multiple of `n`. Returns the number of padding bytes.
    pub fn align(&mut self, n: usize, prefix_bytes: usize) -> usize {
        debug_assert!(n > 0, "alignment must be non-zero");
        let misalignment = (self.bytes.len() + prefix_bytes) % n;
        if misalignment == 0 {
            return 0;
        }
        let padding = n - misalignment;
        self.bytes.resize(self.bytes.len() + padding, OpcodeTag::Padding as u8);
        padding
    }

    /// Encodes a full command record, aligning it to `word_size` when its tag
    /// requires. Returns the number of bytes written, padding included.
    pub fn write_command(&mut self, command: &Command, word_size: usize) -> usize {
        let start = self.bytes.len();
        let tag = command.tag();
        if tag.is_aligned() {
            self.align(word_size, 1);
        }
        self.write_chunk(tag);

        match command {
            Command::SetColor(color) => self.write_scalar(color.to_u32()),
            Command::SetLineWeight(weight) => match *weight {
                LineWeight::Pixels(px) => {
                    self.write_scalar(0u8);
                    self.write_scalar(u32::from(px));
                }
                LineWeight::Model(width) => {
                    self.write_scalar(1u8);
                    self.write_scalar(width);
                }
            },
            Command::SetLineStyle(style) => self.write_scalar(style.to_u8()),
            Command::SetCullMode(mode) => self.write_scalar(mode.to_u8()),
            Command::SetAttribute { attribute, on } => {
                self.write_scalar(attribute.bits());
                self.write_scalar(u8::from(*on));
            }
            Command::SetShading { flags, on } => {
                self.write_scalar(flags.bits());
                self.write_scalar(u8::from(*on));
            }
            Command::SetHlr(on) => self.write_scalar(u8::from(*on)),
            Command::SetSelectionFlags(flags) => self.write_scalar(flags.bits()),
            Command::SelectionMarks(marks) => {
                self.write_scalar(marks.len() as u32);
                for mark in marks {
                    self.write_scalar(mark.marker.0);
                    self.write_scalar(mark.offset);
                }
            }
            Command::EnableArrays(binding) => {
                self.write_scalar(binding.layout().to_u8());
                self.write_array_ref(binding.vertices);
                for id in [binding.colors, binding.normals, binding.texcoords]
                    .into_iter()
                    .flatten()
                {
                    self.write_array_ref(id);
                }
            }
            Command::DisableArrays | Command::End => {}
            Command::DrawArrays {
                class,
                first,
                count,
            } => {
                self.write_scalar(class.to_u8());
                self.write_scalar(*first);
                self.write_scalar(*count);
            }
            Command::DrawIndexed {
                class,
                indices,
                first,
                count,
            } => {
                self.write_scalar(class.to_u8());
                self.write_array_ref(*indices);
                self.write_scalar(*first);
                self.write_scalar(*count);
            }
        }

        self.bytes.len() - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metapack_core::math::Rgba8;
    use metapack_core::metafile::PrimitiveClass;

    #[test]
    fn test_scalars_are_little_endian() {
        let mut stream = ByteStream::new();
        stream.write_scalar(0x0102_0304u32);
        stream.write_scalar(0xABu8);
        assert_eq!(stream.as_bytes(), &[0x04, 0x03, 0x02, 0x01, 0xAB]);
    }

    #[test]
    fn test_align_accounts_for_prefix() {
        let mut stream = ByteStream::new();
        stream.write_scalar(1u8);
        stream.write_scalar(2u8);
        // 2 bytes written; one tag byte will follow, so pad to 7 bytes.
        assert_eq!(stream.align(8, 1), 5);
        assert_eq!(stream.len(), 7);
        assert_eq!(stream.align(8, 1), 0);
        assert_eq!(stream.align(1, 1), 0);
    }

    #[test]
    fn test_aligned_record_operands_start_on_word_boundary() {
        let mut stream = ByteStream::new();
        stream.write_command(&Command::SetColor(Rgba8::RED), 8);
        assert_eq!(stream.len(), 5);

        let written = stream.write_command(
            &Command::DrawArrays {
                class: PrimitiveClass::Lines,
                first: 0,
                count: 2,
            },
            8,
        );
        // 2 padding bytes, then the tag at offset 7, then 9 operand bytes.
        assert_eq!(written, 2 + 1 + 9);
        assert_eq!(stream.as_bytes()[7], OpcodeTag::DrawArrays as u8);
        assert_eq!((7 + 1) % 8, 0);
    }

    #[test]
    fn test_unaligned_record_writes_no_padding() {
        let mut stream = ByteStream::new();
        stream.write_scalar(9u8);
        let written = stream.write_command(&Command::SetHlr(true), 8);
        assert_eq!(written, 2);
    }

    #[test]
    fn test_take_bytes_empties_the_stream() {
        let mut stream = ByteStream::with_capacity(16);
        stream.write_chunk(OpcodeTag::End);
        assert_eq!(stream.take_bytes(), vec![OpcodeTag::End as u8]);
        assert!(stream.is_empty());
    }
}
