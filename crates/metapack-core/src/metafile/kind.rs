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

//! Classification of staged geometry: what is drawn, which per-vertex
//! attributes travel with it, and how its vertices are addressed.

use std::fmt;

/// The primitive topology a batch is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveClass {
    /// Independent points.
    Points,
    /// Independent line segments (two vertices each).
    Lines,
    /// Independent triangles (three vertices each).
    Triangles,
}

impl PrimitiveClass {
    /// Returns the number of vertices (or indices) one primitive of this class consumes.
    pub const fn vertices_per_primitive(self) -> u32 {
        match self {
            PrimitiveClass::Points => 1,
            PrimitiveClass::Lines => 2,
            PrimitiveClass::Triangles => 3,
        }
    }

    /// Returns the wire encoding of this class.
    pub const fn to_u8(self) -> u8 {
        match self {
            PrimitiveClass::Points => 0,
            PrimitiveClass::Lines => 1,
            PrimitiveClass::Triangles => 2,
        }
    }

    /// Decodes a wire value produced by [`PrimitiveClass::to_u8`].
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PrimitiveClass::Points),
            1 => Some(PrimitiveClass::Lines),
            2 => Some(PrimitiveClass::Triangles),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveClass::Points => "points",
            PrimitiveClass::Lines => "lines",
            PrimitiveClass::Triangles => "triangles",
        };
        f.write_str(name)
    }
}

/// Which optional per-vertex attribute arrays accompany the positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexLayout {
    /// One [`Rgba8`](crate::math::Rgba8) per vertex.
    pub colors: bool,
    /// One normal per vertex.
    pub normals: bool,
    /// One texture coordinate per vertex.
    pub texcoords: bool,
}

impl VertexLayout {
    /// Positions only.
    pub const PLAIN: Self = Self {
        colors: false,
        normals: false,
        texcoords: false,
    };
    /// Positions and per-vertex colors.
    pub const COLORED: Self = Self {
        colors: true,
        normals: false,
        texcoords: false,
    };

    /// Returns the wire encoding of this layout (one bit per attribute).
    pub const fn to_u8(self) -> u8 {
        (self.colors as u8) | ((self.normals as u8) << 1) | ((self.texcoords as u8) << 2)
    }

    /// Decodes a wire value produced by [`VertexLayout::to_u8`].
    pub const fn from_u8(value: u8) -> Option<Self> {
        if value & !0b111 != 0 {
            return None;
        }
        Some(Self {
            colors: value & 0b001 != 0,
            normals: value & 0b010 != 0,
            texcoords: value & 0b100 != 0,
        })
    }
}

/// How the primitives of a batch reference their vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Addressing {
    /// Every primitive carries its own, fully expanded vertices.
    #[default]
    Array,
    /// Primitives reference a shared vertex pool through indices.
    Indexed,
}

/// The kind of geometry a staging slot currently holds.
///
/// Exactly one kind is active per slot. Every array held by the slot has the
/// cardinality implied by the kind: positions (or indices) always, colors,
/// normals and texture coordinates only when the layout says so, and in the
/// latter case exactly one per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackageKind {
    /// Nothing is staged.
    #[default]
    Empty,
    /// A batch is open.
    Active {
        /// The topology of the batch.
        class: PrimitiveClass,
        /// The per-vertex attributes of the batch.
        layout: VertexLayout,
        /// How the batch addresses its vertices.
        addressing: Addressing,
    },
}

impl PackageKind {
    /// Creates an active kind.
    pub const fn active(class: PrimitiveClass, layout: VertexLayout, addressing: Addressing) -> Self {
        PackageKind::Active {
            class,
            layout,
            addressing,
        }
    }

    /// Returns `true` if nothing is staged.
    pub const fn is_empty(&self) -> bool {
        matches!(self, PackageKind::Empty)
    }

    /// Returns the primitive class, if a batch is open.
    pub const fn class(&self) -> Option<PrimitiveClass> {
        match self {
            PackageKind::Empty => None,
            PackageKind::Active { class, .. } => Some(*class),
        }
    }

    /// Returns the vertex layout, if a batch is open.
    pub const fn layout(&self) -> Option<VertexLayout> {
        match self {
            PackageKind::Empty => None,
            PackageKind::Active { layout, .. } => Some(*layout),
        }
    }

    /// Returns the addressing mode, if a batch is open.
    pub const fn addressing(&self) -> Option<Addressing> {
        match self {
            PackageKind::Empty => None,
            PackageKind::Active { addressing, .. } => Some(*addressing),
        }
    }

    /// Returns `true` if a primitive of the given shape can be appended without a flush.
    pub fn accepts(&self, class: PrimitiveClass, layout: VertexLayout, addressing: Addressing) -> bool {
        match self {
            PackageKind::Empty => true,
            PackageKind::Active {
                class: c,
                layout: l,
                addressing: a,
            } => *c == class && *l == layout && *a == addressing,
        }
    }
}
