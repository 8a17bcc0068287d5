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

use metapack_core::error::StreamError;
use metapack_core::math::Rgba8;
use metapack_core::metafile::{
    ArrayBinding, ArrayId, Attribute, Command, CullMode, LineStyle, LineWeight, OpcodeTag,
    PrimitiveClass, SelectionFlags, SelectionMark, SelectionMarker, ShadingFlags, VertexLayout,
};

/// Decodes a recorded byte stream into [`Command`]s.
///
/// Padding bytes are skipped. Iteration stops after the first error.
#[derive(Debug, Clone)]
pub struct StreamReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    record_start: usize,
}

impl<'a> StreamReader<'a> {
    /// Creates a reader over `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            record_start: 0,
        }
    }

    /// Returns the byte offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the byte offset of the tag of the most recently decoded record.
    pub fn last_record_offset(&self) -> usize {
        self.record_start
    }

    /// Decodes the next command, or returns `Ok(None)` at the end of the stream.
    pub fn read_command(&mut self) -> Result<Option<Command>, StreamError> {
        while self.bytes.get(self.pos) == Some(&(OpcodeTag::Padding as u8)) {
            self.pos += 1;
        }
        self.record_start = self.pos;
        let Some(&raw_tag) = self.bytes.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;
        let tag = OpcodeTag::from_u8(raw_tag).ok_or(StreamError::UnknownOpcode {
            offset: self.record_start,
            tag: raw_tag,
        })?;

        let command = match tag {
            OpcodeTag::Padding => unreachable!("padding is skipped above"),
            OpcodeTag::SetColor => Command::SetColor(Rgba8::from_u32(self.read_u32()?)),
            OpcodeTag::SetLineWeight => {
                let kind = self.read_u8()?;
                let payload = self.read_u32()?;
                match kind {
                    0 => {
                        let px = u16::try_from(payload)
                            .map_err(|_| self.invalid(tag, u64::from(payload)))?;
                        Command::SetLineWeight(LineWeight::Pixels(px))
                    }
                    1 => Command::SetLineWeight(LineWeight::Model(f32::from_bits(payload))),
                    other => return Err(self.invalid(tag, u64::from(other))),
                }
            }
            OpcodeTag::SetLineStyle => {
                let raw = self.read_u8()?;
                Command::SetLineStyle(
                    LineStyle::from_u8(raw).ok_or_else(|| self.invalid(tag, u64::from(raw)))?,
                )
            }
            OpcodeTag::SetCullMode => {
                let raw = self.read_u8()?;
                Command::SetCullMode(
                    CullMode::from_u8(raw).ok_or_else(|| self.invalid(tag, u64::from(raw)))?,
                )
            }
            OpcodeTag::SetAttribute => {
                let raw = self.read_u16()?;
                let attribute =
                    Attribute::from_bits(raw).ok_or_else(|| self.invalid(tag, u64::from(raw)))?;
                let on = self.read_bool(tag)?;
                Command::SetAttribute { attribute, on }
            }
            OpcodeTag::SetShading => {
                let raw = self.read_u8()?;
                let flags =
                    ShadingFlags::from_bits(raw).ok_or_else(|| self.invalid(tag, u64::from(raw)))?;
                let on = self.read_bool(tag)?;
                Command::SetShading { flags, on }
            }
            OpcodeTag::SetHlr => Command::SetHlr(self.read_bool(tag)?),
            OpcodeTag::SetSelectionFlags => {
                let raw = self.read_u8()?;
                Command::SetSelectionFlags(
                    SelectionFlags::from_bits(raw)
                        .ok_or_else(|| self.invalid(tag, u64::from(raw)))?,
                )
            }
            OpcodeTag::SelectionMarks => {
                let count = self.read_u32()? as usize;
                // 12 bytes per mark.
                self.need(count.saturating_mul(12))?;
                let mut marks = Vec::with_capacity(count);
                for _ in 0..count {
                    let marker = SelectionMarker(self.read_u64()?);
                    let offset = self.read_u32()?;
                    marks.push(SelectionMark::new(marker, offset));
                }
                Command::SelectionMarks(marks)
            }
            OpcodeTag::EnableArrays => {
                let raw = self.read_u8()?;
                let layout =
                    VertexLayout::from_u8(raw).ok_or_else(|| self.invalid(tag, u64::from(raw)))?;
                let vertices = self.read_array_ref()?;
                let colors = self.read_optional_ref(layout.colors)?;
                let normals = self.read_optional_ref(layout.normals)?;
                let texcoords = self.read_optional_ref(layout.texcoords)?;
                Command::EnableArrays(ArrayBinding {
                    vertices,
                    colors,
                    normals,
                    texcoords,
                })
            }
            OpcodeTag::DisableArrays => Command::DisableArrays,
            OpcodeTag::DrawArrays => {
                let class = self.read_class(tag)?;
                let first = self.read_u32()?;
                let count = self.read_u32()?;
                Command::DrawArrays {
                    class,
                    first,
                    count,
                }
            }
            OpcodeTag::DrawIndexed => {
                let class = self.read_class(tag)?;
                let indices = self.read_array_ref()?;
                let first = self.read_u32()?;
                let count = self.read_u32()?;
                Command::DrawIndexed {
                    class,
                    indices,
                    first,
                    count,
                }
            }
            OpcodeTag::End => Command::End,
        };
        Ok(Some(command))
    }

    fn invalid(&self, opcode: OpcodeTag, value: u64) -> StreamError {
        StreamError::InvalidOperand {
            offset: self.record_start,
            opcode,
            value,
        }
    }

    fn need(&self, n: usize) -> Result<(), StreamError> {
        let available = self.bytes.len() - self.pos;
        if available < n {
            return Err(StreamError::Truncated {
                offset: self.record_start,
                needed: n - available,
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], StreamError> {
        self.need(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, StreamError> {
        Ok(self.take::<1>()?[0])
    }

    fn read_u16(&mut self) -> Result<u16, StreamError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn read_u32(&mut self) -> Result<u32, StreamError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn read_u64(&mut self) -> Result<u64, StreamError> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    fn read_bool(&mut self, tag: OpcodeTag) -> Result<bool, StreamError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.invalid(tag, u64::from(other))),
        }
    }

    fn read_class(&mut self, tag: OpcodeTag) -> Result<PrimitiveClass, StreamError> {
        let raw = self.read_u8()?;
        PrimitiveClass::from_u8(raw).ok_or_else(|| self.invalid(tag, u64::from(raw)))
    }

    fn read_array_ref(&mut self) -> Result<ArrayId, StreamError> {
        Ok(ArrayId(self.read_u32()?))
    }

    fn read_optional_ref(&mut self, present: bool) -> Result<Option<ArrayId>, StreamError> {
        if present {
            self.read_array_ref().map(Some)
        } else {
            Ok(None)
        }
    }
}

impl Iterator for StreamReader<'_> {
    type Item = Result<Command, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_command() {
            Ok(command) => command.map(Ok),
            Err(err) => {
                self.pos = self.bytes.len();
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::ByteStream;

    fn encode(commands: &[Command], word_size: usize) -> Vec<u8> {
        let mut stream = ByteStream::new();
        for command in commands {
            stream.write_command(command, word_size);
        }
        stream.into_bytes()
    }

    #[test]
    fn test_decodes_mixed_stream_with_padding() {
        let commands = vec![
            Command::SetColor(Rgba8::new(10, 20, 30, 128)),
            Command::SetLineWeight(LineWeight::Model(0.25)),
            Command::SetAttribute {
                attribute: Attribute::BLENDING,
                on: true,
            },
            Command::SelectionMarks(vec![
                SelectionMark::new(SelectionMarker(1), 0),
                SelectionMark::new(SelectionMarker(u64::MAX), 6),
            ]),
            Command::EnableArrays(ArrayBinding {
                colors: Some(ArrayId(3)),
                texcoords: Some(ArrayId(4)),
                ..ArrayBinding::positions(ArrayId(2))
            }),
            Command::DrawIndexed {
                class: PrimitiveClass::Triangles,
                indices: ArrayId(9),
                first: 3,
                count: 6,
            },
            Command::DisableArrays,
            Command::End,
        ];
        let bytes = encode(&commands, 8);
        let decoded: Result<Vec<_>, _> = StreamReader::new(&bytes).collect();
        assert_eq!(decoded.unwrap(), commands);
    }

    #[test]
    fn test_unknown_tag_is_reported_once() {
        let bytes = [OpcodeTag::SetHlr as u8, 1, 0xEE, OpcodeTag::End as u8];
        let mut reader = StreamReader::new(&bytes);
        assert_eq!(reader.next(), Some(Ok(Command::SetHlr(true))));
        assert_eq!(
            reader.next(),
            Some(Err(StreamError::UnknownOpcode {
                offset: 2,
                tag: 0xEE
            }))
        );
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_truncated_record() {
        let bytes = [OpcodeTag::SetColor as u8, 1, 2];
        let err = StreamReader::new(&bytes).next().unwrap().unwrap_err();
        assert_eq!(
            err,
            StreamError::Truncated {
                offset: 0,
                needed: 2
            }
        );
    }

    #[test]
    fn test_invalid_enum_operand() {
        let bytes = [OpcodeTag::SetCullMode as u8, 7];
        let err = StreamReader::new(&bytes).next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            StreamError::InvalidOperand {
                opcode: OpcodeTag::SetCullMode,
                value: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_corrupt_mark_count_does_not_allocate() {
        let mut bytes = vec![OpcodeTag::SelectionMarks as u8];
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        let err = StreamReader::new(&bytes).next().unwrap().unwrap_err();
        assert!(matches!(err, StreamError::Truncated { .. }));
    }
}
