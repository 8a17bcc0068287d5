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

//! Value types describing renderer state as it is recorded into a metafile.

use crate::metapack_bitflags;
use serde::{Deserialize, Serialize};

metapack_bitflags! {
    /// Boolean renderer attributes that can be toggled on or off.
    pub struct Attribute: u16 {
        /// Per-vertex lighting using normals.
        const LIGHTING = 1 << 0;
        /// Texture sampling using per-vertex texture coordinates.
        const TEXTURING = 1 << 1;
        /// Alpha blending. Toggled automatically by the active color's alpha.
        const BLENDING = 1 << 2;
        /// Depth testing.
        const DEPTH_TEST = 1 << 3;
        /// Anti-aliased lines.
        const LINE_SMOOTH = 1 << 4;
        /// Anti-aliased points.
        const POINT_SMOOTH = 1 << 5;
    }
}

metapack_bitflags! {
    /// Shading options that apply to filled (triangle) geometry.
    pub struct ShadingFlags: u8 {
        /// One color per face.
        const FLAT = 1 << 0;
        /// Interpolated per-vertex colors.
        const GOURAUD = 1 << 1;
        /// Draw face edges on top of fills.
        const EDGES = 1 << 2;
        /// Light both faces of a triangle.
        const TWO_SIDED = 1 << 3;
    }
}

metapack_bitflags! {
    /// Flags attached to the geometry that follows for interactive picking.
    pub struct SelectionFlags: u8 {
        /// The geometry is drawn highlighted.
        const HIGHLIGHTED = 1 << 0;
        /// The geometry cannot be picked.
        const UNSELECTABLE = 1 << 1;
    }
}

/// Which triangle faces are discarded during rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// No faces are culled.
    #[default]
    None,
    /// Front faces are culled.
    Front,
    /// Back faces are culled.
    Back,
}

impl CullMode {
    /// Returns the wire encoding of this mode.
    pub const fn to_u8(self) -> u8 {
        match self {
            CullMode::None => 0,
            CullMode::Front => 1,
            CullMode::Back => 2,
        }
    }

    /// Decodes a wire value produced by [`CullMode::to_u8`].
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CullMode::None),
            1 => Some(CullMode::Front),
            2 => Some(CullMode::Back),
            _ => None,
        }
    }
}

/// The width used to stroke line geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineWeight {
    /// A fixed width in device pixels.
    Pixels(u16),
    /// A width in model units, scaled with the view.
    Model(f32),
}

impl Default for LineWeight {
    fn default() -> Self {
        LineWeight::Pixels(1)
    }
}

/// How the ends of stroked lines are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineCap {
    /// Rounded ends.
    #[default]
    Round,
    /// Squared ends extending past the endpoint.
    Square,
    /// Ends cut flush at the endpoint.
    Butt,
}

/// How consecutive stroked segments are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineJoin {
    /// Rounded joins.
    #[default]
    Round,
    /// Beveled joins.
    Bevel,
    /// Mitered joins.
    Miter,
}

/// The stroke style applied to line and point geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LineStyle {
    /// The end cap style.
    pub cap: LineCap,
    /// The join style.
    pub join: LineJoin,
}

impl LineStyle {
    /// Packs the style into a single byte (`cap` in the low nibble).
    pub const fn to_u8(self) -> u8 {
        let cap = match self.cap {
            LineCap::Round => 0,
            LineCap::Square => 1,
            LineCap::Butt => 2,
        };
        let join = match self.join {
            LineJoin::Round => 0,
            LineJoin::Bevel => 1,
            LineJoin::Miter => 2,
        };
        cap | (join << 4)
    }

    /// Decodes a byte produced by [`LineStyle::to_u8`].
    pub const fn from_u8(value: u8) -> Option<Self> {
        let cap = match value & 0x0F {
            0 => LineCap::Round,
            1 => LineCap::Square,
            2 => LineCap::Butt,
            _ => return None,
        };
        let join = match value >> 4 {
            0 => LineJoin::Round,
            1 => LineJoin::Bevel,
            2 => LineJoin::Miter,
            _ => return None,
        };
        Some(Self { cap, join })
    }
}

/// An opaque marker identifying a sub-range of geometry for picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SelectionMarker(pub u64);

impl SelectionMarker {
    /// The marker in effect when no marker has been set.
    pub const NONE: Self = SelectionMarker(0);
}

/// A selection marker paired with the element offset at which it becomes active.
///
/// Offsets count vertices for array draws and indices for indexed draws, relative
/// to the start of the array bound by the enclosing `EnableArrays`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionMark {
    /// The marker value.
    pub marker: SelectionMarker,
    /// The element offset at which the marker becomes active.
    pub offset: u32,
}

impl SelectionMark {
    /// Creates a new mark.
    pub const fn new(marker: SelectionMarker, offset: u32) -> Self {
        Self { marker, offset }
    }

    /// Returns the same mark shifted by `base` elements.
    #[must_use]
    pub const fn rebased(self, base: u32) -> Self {
        Self {
            marker: self.marker,
            offset: self.offset + base,
        }
    }
}
