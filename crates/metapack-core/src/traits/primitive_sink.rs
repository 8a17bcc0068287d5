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

use crate::math::{Rgba8, Vec2, Vec3};
use crate::metafile::{
    Attribute, CullMode, LineStyle, LineWeight, SelectionFlags, SelectionMarker, ShadingFlags,
    VertexLayout,
};

/// Borrowed, parallel vertex attribute arrays.
///
/// Used both to upload a shared vertex pool to a packager and to hand bound
/// arrays to a [`ReplayTarget`](super::ReplayTarget). Every present attribute
/// slice has the same length as `positions`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexArrays<'a> {
    /// Vertex positions.
    pub positions: &'a [Vec3],
    /// Per-vertex colors, if any.
    pub colors: Option<&'a [Rgba8]>,
    /// Per-vertex normals, if any.
    pub normals: Option<&'a [Vec3]>,
    /// Per-vertex texture coordinates, if any.
    pub texcoords: Option<&'a [Vec2]>,
}

impl<'a> VertexArrays<'a> {
    /// Creates a set of arrays holding positions only.
    pub fn positions(positions: &'a [Vec3]) -> Self {
        Self {
            positions,
            colors: None,
            normals: None,
            texcoords: None,
        }
    }

    /// Returns the number of vertices.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if there are no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the layout described by the present attribute arrays.
    pub fn layout(&self) -> VertexLayout {
        VertexLayout {
            colors: self.colors.is_some(),
            normals: self.normals.is_some(),
            texcoords: self.texcoords.is_some(),
        }
    }

    /// Returns `true` if every present attribute array matches the position count.
    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len();
        self.colors.is_none_or(|c| c.len() == n)
            && self.normals.is_none_or(|c| c.len() == n)
            && self.texcoords.is_none_or(|c| c.len() == n)
    }
}

/// Where a triangle's texture coordinates come from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TexCoords {
    /// The triangle is untextured.
    #[default]
    None,
    /// The coordinates are known now.
    Explicit([Vec2; 3]),
    /// The coordinates are resolved later by the innermost open delayed-mapping scope.
    Deferred,
}

/// A single triangle as submitted by a geometry producer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The corner positions.
    pub positions: [Vec3; 3],
    /// Per-corner colors, if any.
    pub colors: Option<[Rgba8; 3]>,
    /// Per-corner normals, if any.
    pub normals: Option<[Vec3; 3]>,
    /// Per-corner texture coordinates.
    pub texcoords: TexCoords,
}

impl Triangle {
    /// Creates an untextured triangle without colors or normals.
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            positions: [a, b, c],
            colors: None,
            normals: None,
            texcoords: TexCoords::None,
        }
    }

    /// Attaches per-corner colors.
    #[must_use]
    pub const fn with_colors(mut self, colors: [Rgba8; 3]) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Attaches per-corner normals.
    #[must_use]
    pub const fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Attaches texture coordinates.
    #[must_use]
    pub const fn with_texcoords(mut self, texcoords: TexCoords) -> Self {
        self.texcoords = texcoords;
        self
    }

    /// Returns the vertex layout this triangle packs into.
    pub const fn layout(&self) -> VertexLayout {
        VertexLayout {
            colors: self.colors.is_some(),
            normals: self.normals.is_some(),
            texcoords: !matches!(self.texcoords, TexCoords::None),
        }
    }
}

/// The immediate-mode submission API a geometry producer drives.
///
/// Calls arrive one primitive or one state change at a time. An implementation
/// is free to defer, merge, or drop work as long as the replayed result is
/// visually equivalent to executing the calls in order.
pub trait PrimitiveSink {
    // --- State ---

    /// Sets the active color. Alpha other than 255 implies blending.
    fn set_color(&mut self, color: Rgba8);

    /// Sets the line weight for subsequent line geometry.
    fn set_line_weight(&mut self, weight: LineWeight);

    /// Sets the line style for subsequent line and point geometry.
    fn set_line_style(&mut self, style: LineStyle);

    /// Sets the face culling mode for subsequent triangles.
    fn set_cull_mode(&mut self, mode: CullMode);

    /// Turns renderer attribute(s) on or off.
    fn set_attribute(&mut self, attribute: Attribute, on: bool);

    /// Turns shading flag(s) on or off.
    fn set_shading(&mut self, flags: ShadingFlags, on: bool);

    /// Turns hidden-line removal on or off.
    fn set_hlr(&mut self, on: bool);

    /// Sets the selection marker attached to subsequent geometry.
    fn set_selection_marker(&mut self, marker: SelectionMarker);

    /// Sets the selection flags applied to subsequent geometry.
    fn set_selection_flags(&mut self, flags: SelectionFlags);

    // --- Array-addressed geometry ---

    /// Submits a single point.
    fn pack_point(&mut self, position: Vec3, color: Option<Rgba8>);

    /// Submits a connected polyline of `points.len() - 1` segments.
    fn pack_polyline(&mut self, points: &[Vec3], colors: Option<&[Rgba8]>);

    /// Submits independent segments, two consecutive positions per segment.
    fn pack_lines(&mut self, segments: &[Vec3], colors: Option<&[Rgba8]>);

    /// Submits a single triangle.
    fn pack_triangle(&mut self, triangle: &Triangle);

    // --- Index-addressed geometry ---

    /// Uploads a shared vertex pool for subsequent indexed primitives.
    fn set_vertex_pool(&mut self, pool: VertexArrays<'_>);

    /// Submits points as single indices into the current vertex pool.
    fn pack_indexed_points(&mut self, indices: &[u32]);

    /// Submits independent segments as index pairs into the current vertex pool.
    fn pack_indexed_lines(&mut self, indices: &[u32]);

    /// Submits independent triangles as index triples into the current vertex pool.
    fn pack_indexed_triangles(&mut self, indices: &[u32]);
}
