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

//! The recorded command model: what a metafile contains once decoded.
//!
//! A metafile is an ordered sequence of [`Command`]s. Each one is either a
//! state change carrying its own operands, an array-lifecycle command that
//! binds or releases vertex arrays held in the metafile's array store, or a
//! draw command that consumes the currently bound arrays.

use super::kind::{PrimitiveClass, VertexLayout};
use super::state::{
    Attribute, CullMode, LineStyle, LineWeight, SelectionFlags, SelectionMark, ShadingFlags,
};
use crate::math::Rgba8;

/// A handle to a typed array held in a metafile's array store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayId(pub u32);

/// The set of arrays bound as the vertex source for the draws that follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayBinding {
    /// Vertex positions.
    pub vertices: ArrayId,
    /// Per-vertex colors, if any.
    pub colors: Option<ArrayId>,
    /// Per-vertex normals, if any.
    pub normals: Option<ArrayId>,
    /// Per-vertex texture coordinates, if any.
    pub texcoords: Option<ArrayId>,
}

impl ArrayBinding {
    /// Creates a binding with positions only.
    pub const fn positions(vertices: ArrayId) -> Self {
        Self {
            vertices,
            colors: None,
            normals: None,
            texcoords: None,
        }
    }

    /// Returns the vertex layout described by the bound arrays.
    pub const fn layout(&self) -> VertexLayout {
        VertexLayout {
            colors: self.colors.is_some(),
            normals: self.normals.is_some(),
            texcoords: self.texcoords.is_some(),
        }
    }
}

/// The one-byte tag that starts every record in the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpcodeTag {
    /// Alignment filler; carries no operands and is skipped by readers.
    Padding = 0,
    /// See [`Command::SetColor`].
    SetColor = 1,
    /// See [`Command::SetLineWeight`].
    SetLineWeight = 2,
    /// See [`Command::SetLineStyle`].
    SetLineStyle = 3,
    /// See [`Command::SetCullMode`].
    SetCullMode = 4,
    /// See [`Command::SetAttribute`].
    SetAttribute = 5,
    /// See [`Command::SetShading`].
    SetShading = 6,
    /// See [`Command::SetHlr`].
    SetHlr = 7,
    /// See [`Command::SetSelectionFlags`].
    SetSelectionFlags = 8,
    /// See [`Command::SelectionMarks`].
    SelectionMarks = 9,
    /// See [`Command::EnableArrays`].
    EnableArrays = 10,
    /// See [`Command::DisableArrays`].
    DisableArrays = 11,
    /// See [`Command::DrawArrays`].
    DrawArrays = 12,
    /// See [`Command::DrawIndexed`].
    DrawIndexed = 13,
    /// See [`Command::End`].
    End = 14,
}

impl OpcodeTag {
    /// Decodes a tag byte.
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => OpcodeTag::Padding,
            1 => OpcodeTag::SetColor,
            2 => OpcodeTag::SetLineWeight,
            3 => OpcodeTag::SetLineStyle,
            4 => OpcodeTag::SetCullMode,
            5 => OpcodeTag::SetAttribute,
            6 => OpcodeTag::SetShading,
            7 => OpcodeTag::SetHlr,
            8 => OpcodeTag::SetSelectionFlags,
            9 => OpcodeTag::SelectionMarks,
            10 => OpcodeTag::EnableArrays,
            11 => OpcodeTag::DisableArrays,
            12 => OpcodeTag::DrawArrays,
            13 => OpcodeTag::DrawIndexed,
            14 => OpcodeTag::End,
            _ => return None,
        })
    }

    /// Returns `true` if the operand block of this record is aligned to the platform word size.
    pub const fn is_aligned(self) -> bool {
        matches!(
            self,
            OpcodeTag::SelectionMarks
                | OpcodeTag::EnableArrays
                | OpcodeTag::DisableArrays
                | OpcodeTag::DrawArrays
                | OpcodeTag::DrawIndexed
        )
    }
}

/// A single decoded metafile command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Sets the active color.
    SetColor(Rgba8),
    /// Sets the line weight.
    SetLineWeight(LineWeight),
    /// Sets the line style.
    SetLineStyle(LineStyle),
    /// Sets the face culling mode.
    SetCullMode(CullMode),
    /// Turns renderer attributes on or off.
    SetAttribute {
        /// The attribute(s) affected.
        attribute: Attribute,
        /// The new value.
        on: bool,
    },
    /// Turns shading flags on or off.
    SetShading {
        /// The flag(s) affected.
        flags: ShadingFlags,
        /// The new value.
        on: bool,
    },
    /// Turns hidden-line removal on or off.
    SetHlr(bool),
    /// Sets the selection flags applied to subsequent geometry.
    SetSelectionFlags(SelectionFlags),
    /// Selection marks for the draws that follow, relative to the bound arrays.
    SelectionMarks(Vec<SelectionMark>),
    /// Binds arrays as the vertex source for the draws that follow.
    EnableArrays(ArrayBinding),
    /// Releases the arrays bound by the last `EnableArrays`.
    DisableArrays,
    /// Draws a contiguous range of the bound vertices.
    DrawArrays {
        /// The topology to draw.
        class: PrimitiveClass,
        /// The first vertex.
        first: u32,
        /// The number of vertices.
        count: u32,
    },
    /// Draws a contiguous range of an index array against the bound vertices.
    DrawIndexed {
        /// The topology to draw.
        class: PrimitiveClass,
        /// The index array.
        indices: ArrayId,
        /// The first index.
        first: u32,
        /// The number of indices.
        count: u32,
    },
    /// Marks the end of the recorded session.
    End,
}

impl Command {
    /// Returns the tag this command is recorded under.
    pub fn tag(&self) -> OpcodeTag {
        match self {
            Command::SetColor(_) => OpcodeTag::SetColor,
            Command::SetLineWeight(_) => OpcodeTag::SetLineWeight,
            Command::SetLineStyle(_) => OpcodeTag::SetLineStyle,
            Command::SetCullMode(_) => OpcodeTag::SetCullMode,
            Command::SetAttribute { .. } => OpcodeTag::SetAttribute,
            Command::SetShading { .. } => OpcodeTag::SetShading,
            Command::SetHlr(_) => OpcodeTag::SetHlr,
            Command::SetSelectionFlags(_) => OpcodeTag::SetSelectionFlags,
            Command::SelectionMarks(_) => OpcodeTag::SelectionMarks,
            Command::EnableArrays(_) => OpcodeTag::EnableArrays,
            Command::DisableArrays => OpcodeTag::DisableArrays,
            Command::DrawArrays { .. } => OpcodeTag::DrawArrays,
            Command::DrawIndexed { .. } => OpcodeTag::DrawIndexed,
            Command::End => OpcodeTag::End,
        }
    }

    /// Returns `true` for commands that change renderer state.
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            Command::SetColor(_)
                | Command::SetLineWeight(_)
                | Command::SetLineStyle(_)
                | Command::SetCullMode(_)
                | Command::SetAttribute { .. }
                | Command::SetShading { .. }
                | Command::SetHlr(_)
                | Command::SetSelectionFlags(_)
        )
    }

    /// Returns `true` for draw commands.
    pub fn is_draw(&self) -> bool {
        matches!(self, Command::DrawArrays { .. } | Command::DrawIndexed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip_for_every_value() {
        for value in 0u8..=14 {
            let tag = OpcodeTag::from_u8(value).unwrap();
            assert_eq!(tag as u8, value);
        }
        assert_eq!(OpcodeTag::from_u8(15), None);
    }

    #[test]
    fn test_command_classification() {
        assert!(Command::SetHlr(true).is_state_change());
        assert!(!Command::SetHlr(true).is_draw());
        let draw = Command::DrawArrays {
            class: PrimitiveClass::Lines,
            first: 0,
            count: 2,
        };
        assert!(draw.is_draw());
        assert!(draw.tag().is_aligned());
        assert!(!Command::SetColor(Rgba8::RED).tag().is_aligned());
    }

    #[test]
    fn test_binding_layout() {
        let binding = ArrayBinding {
            colors: Some(ArrayId(2)),
            ..ArrayBinding::positions(ArrayId(1))
        };
        assert_eq!(binding.layout(), VertexLayout::COLORED);
    }
}
