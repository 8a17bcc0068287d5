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

use super::point_entry::PointEntry;
use metapack_core::math::{Rgba8, Vec2, Vec3};
use metapack_core::metafile::{
    Addressing, PackageKind, PrimitiveClass, SelectionMark, SelectionMarker, TraitsOptions,
    VertexLayout,
};

/// A texture-coordinate triple whose values are resolved by a delayed mapping scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DeferredSlot {
    /// Index of the owning scope in the mapping stack.
    pub scope: usize,
    /// Index of the record within that scope.
    pub record: usize,
    /// Staging index of the triangle's first vertex.
    pub element: u32,
}

/// A staging slot for one pending batch.
///
/// Every array the slot holds has the cardinality implied by its [`PackageKind`]:
/// positions always, colors/normals/texture coordinates only when the layout
/// has them, and indices only in indexed mode (where the vertex data lives in
/// the shared pool instead).
#[derive(Debug, Default)]
pub struct PackageEntry {
    kind: PackageKind,
    positions: Vec<Vec3>,
    colors: Vec<Rgba8>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    indices: Vec<u32>,
    marks: Vec<SelectionMark>,
    input_traits: TraitsOptions,
    output_traits: TraitsOptions,
    deferred: Vec<DeferredSlot>,
}

impl PackageEntry {
    /// Creates an empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The kind of the open batch, or [`PackageKind::Empty`].
    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Returns `true` if no batch is open.
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    /// The number of elements to draw: indices in indexed mode, vertices otherwise.
    pub fn len(&self) -> u32 {
        match self.kind.addressing() {
            Some(Addressing::Indexed) => self.indices.len() as u32,
            _ => self.positions.len() as u32,
        }
    }

    /// The traits required by the first primitive of the batch.
    pub fn input_traits(&self) -> TraitsOptions {
        self.input_traits
    }

    /// The combined traits of every primitive in the batch.
    pub fn output_traits(&self) -> TraitsOptions {
        self.output_traits
    }

    /// The selection marks of the batch, ordered by offset.
    pub fn marks(&self) -> &[SelectionMark] {
        &self.marks
    }

    /// Staged vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Staged per-vertex colors.
    pub fn colors(&self) -> &[Rgba8] {
        &self.colors
    }

    /// Staged per-vertex normals.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Staged per-vertex texture coordinates.
    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    /// Staged indices into the vertex pool.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub(crate) fn deferred(&self) -> &[DeferredSlot] {
        &self.deferred
    }

    /// Returns `true` if a primitive of shape `kind` with `requirement` can join the batch.
    pub fn accepts(&self, kind: PackageKind, requirement: &TraitsOptions) -> bool {
        match kind {
            PackageKind::Empty => true,
            PackageKind::Active {
                class,
                layout,
                addressing,
            } => {
                self.kind.accepts(class, layout, addressing)
                    && (self.is_empty() || self.output_traits.is_compatible(requirement))
            }
        }
    }

    /// Opens the batch as `kind`, or folds `requirement` into the open batch's traits.
    pub fn open(&mut self, kind: PackageKind, requirement: TraitsOptions) {
        debug_assert!(
            self.accepts(kind, &requirement),
            "entry of kind {:?} cannot accept {kind:?}",
            self.kind
        );
        if self.is_empty() {
            self.kind = kind;
            self.input_traits = requirement;
            self.output_traits = requirement;
        } else if let Some(combined) = self.output_traits.combine(&requirement) {
            self.output_traits = combined;
        }
    }

    /// Records that geometry packed from now on belongs to `marker`.
    ///
    /// At most one mark is open at a time: the last one. A mark that never
    /// covered any geometry is replaced rather than followed.
    pub fn sync_marker(&mut self, marker: SelectionMarker) {
        let offset = self.len();
        if self.marks.last().is_some_and(|m| m.offset == offset) {
            self.marks.pop();
        }
        let current = self.marks.last().map_or(SelectionMarker::NONE, |m| m.marker);
        if current != marker {
            self.marks.push(SelectionMark::new(marker, offset));
        }
    }

    /// Appends one vertex. Attributes must match the batch layout.
    pub fn push_vertex(
        &mut self,
        position: Vec3,
        color: Option<Rgba8>,
        normal: Option<Vec3>,
        texcoord: Option<Vec2>,
    ) {
        debug_assert_eq!(
            self.kind.addressing(),
            Some(Addressing::Array),
            "vertices pushed into a non-array batch"
        );
        debug_assert_eq!(
            self.kind.layout(),
            Some(VertexLayout {
                colors: color.is_some(),
                normals: normal.is_some(),
                texcoords: texcoord.is_some(),
            }),
            "vertex attributes do not match the batch layout"
        );
        self.positions.push(position);
        self.colors.extend(color);
        self.normals.extend(normal);
        self.texcoords.extend(texcoord);
    }

    /// Appends indices into the vertex pool.
    pub fn push_indices(&mut self, indices: &[u32]) {
        debug_assert_eq!(self.kind.addressing(), Some(Addressing::Indexed));
        if let Some(class) = self.kind.class() {
            debug_assert_eq!(indices.len() as u32 % class.vertices_per_primitive(), 0);
        }
        self.indices.extend_from_slice(indices);
    }

    pub(crate) fn defer_texcoords(&mut self, slot: DeferredSlot) {
        debug_assert_eq!(self.kind.class(), Some(PrimitiveClass::Triangles));
        self.deferred.push(slot);
    }

    /// Resets the entry to empty, keeping at most `reserve` elements of capacity per array.
    pub fn clear(&mut self, reserve: usize) {
        self.kind = PackageKind::Empty;
        self.input_traits = TraitsOptions::UNSET;
        self.output_traits = TraitsOptions::UNSET;
        trim(&mut self.positions, reserve);
        trim(&mut self.colors, reserve);
        trim(&mut self.normals, reserve);
        trim(&mut self.texcoords, reserve);
        trim(&mut self.indices, reserve);
        self.marks.clear();
        self.deferred.clear();
    }
}

/// The three staging slots of a packager, keyed by primitive class.
#[derive(Debug, Default)]
pub(crate) struct Staging {
    pub(crate) lines: PackageEntry,
    pub(crate) triangles: PackageEntry,
    pub(crate) points: PointEntry,
}

impl Staging {
    pub(crate) fn entry(&self, class: PrimitiveClass) -> &PackageEntry {
        match class {
            PrimitiveClass::Lines => &self.lines,
            PrimitiveClass::Triangles => &self.triangles,
            PrimitiveClass::Points => self.points.batch(),
        }
    }

    pub(crate) fn entry_mut(&mut self, class: PrimitiveClass) -> &mut PackageEntry {
        match class {
            PrimitiveClass::Lines => &mut self.lines,
            PrimitiveClass::Triangles => &mut self.triangles,
            PrimitiveClass::Points => self.points.batch_mut(),
        }
    }

    /// Returns `true` if any batch is open with a different addressing mode.
    pub(crate) fn conflicts_with(&self, addressing: Addressing) -> bool {
        [&self.lines, &self.triangles, self.points.batch()]
            .iter()
            .any(|e| e.kind.addressing().is_some_and(|a| a != addressing))
    }

    pub(crate) fn clear_batches(&mut self, reserve: usize) {
        self.lines.clear(reserve);
        self.triangles.clear(reserve);
        self.points.batch_mut().clear(reserve);
    }

    pub(crate) fn clear(&mut self, reserve: usize) {
        self.lines.clear(reserve);
        self.triangles.clear(reserve);
        self.points.clear(reserve);
    }
}

fn trim<T>(vec: &mut Vec<T>, reserve: usize) {
    vec.clear();
    if vec.capacity() > reserve {
        vec.shrink_to(reserve);
    }
}
