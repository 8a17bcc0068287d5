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

use super::delayed_mapping::{DelayedMapping, DelayedMappingCache};
use super::emitter::Emitter;
use super::entry::{DeferredSlot, PackageEntry, Staging};
use super::point_entry::{HeldPoint, PointEntry};
use super::state_cache::{RendererState, StateChange};
use metapack_core::math::{Aabb, Rgba8, Vec2, Vec3};
use metapack_core::metafile::{
    Addressing, ArrayBinding, Attribute, Command, CullMode, LineStyle, LineWeight, PackStats,
    PackageKind, PackagerSettings, PointInlining, PrimitiveClass, SelectionFlags, SelectionMarker,
    ShadingFlags, TraitsOptions, VertexLayout,
};
use metapack_core::traits::{PrimitiveSink, TexCoords, Triangle, VertexArrays};
use metapack_data::{ArrayStore, Metafile};

/// A vertex pool uploaded for indexed primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct VertexPool {
    pub(crate) binding: ArrayBinding,
    pub(crate) layout: VertexLayout,
    pub(crate) len: u32,
    pub(crate) translucent: bool,
}

/// Compiles immediate primitive calls into a replayable [`Metafile`].
///
/// A packager records one session at a time: [`begin_writing`](Self::begin_writing),
/// any number of [`PrimitiveSink`] calls, then [`complete_writing`](Self::complete_writing).
/// Between sessions the staging arrays keep their capacity (up to
/// [`PackagerSettings::reserve_threshold`]), so a long-lived packager amortises
/// allocations across many short recordings.
///
/// Dropping a packager mid-session discards whatever has not been flushed.
#[derive(Debug)]
pub struct MetafilePackager {
    pub(super) settings: PackagerSettings,
    pub(super) staging: Staging,
    pub(super) state: RendererState,
    pub(super) out: Emitter,
    pub(super) arrays: ArrayStore,
    pub(super) mapping: DelayedMappingCache,
    pub(super) pool: Option<VertexPool>,
    extents: Aabb,
    writing: bool,
    scratch_positions: Vec<Vec3>,
    scratch_colors: Vec<Rgba8>,
}

impl Default for MetafilePackager {
    fn default() -> Self {
        Self::new(PackagerSettings::default())
    }
}

impl MetafilePackager {
    /// Creates a packager. No session is open until [`begin_writing`](Self::begin_writing).
    pub fn new(settings: PackagerSettings) -> Self {
        debug_assert!(
            settings.validate().is_ok(),
            "invalid packager settings: {settings:?}"
        );
        Self {
            out: Emitter::new(settings.word_size),
            settings,
            staging: Staging::default(),
            state: RendererState::default(),
            arrays: ArrayStore::new(),
            mapping: DelayedMappingCache::default(),
            pool: None,
            extents: Aabb::INVALID,
            writing: false,
            scratch_positions: Vec::new(),
            scratch_colors: Vec::new(),
        }
    }

    /// The settings this packager was created with.
    pub fn settings(&self) -> &PackagerSettings {
        &self.settings
    }

    /// The state the replay target will be in at this point of the recording.
    pub fn state(&self) -> &RendererState {
        &self.state
    }

    /// Counters for the current session.
    pub fn stats(&self) -> &PackStats {
        &self.out.stats
    }

    /// Returns `true` while a session is open.
    pub fn is_writing(&self) -> bool {
        self.writing
    }

    /// The number of bytes recorded so far in the current session.
    pub fn recorded_bytes(&self) -> usize {
        self.out.len()
    }

    /// The staged line batch.
    pub fn lines(&self) -> &PackageEntry {
        &self.staging.lines
    }

    /// The staged triangle batch.
    pub fn triangles(&self) -> &PackageEntry {
        &self.staging.triangles
    }

    /// The point staging slot.
    pub fn points(&self) -> &PointEntry {
        &self.staging.points
    }

    // --- Session lifecycle ---

    /// Opens a new recording session.
    ///
    /// The renderer state cache starts over from [`RendererState::default`].
    /// Calling this while a session is open abandons that session.
    pub fn begin_writing(&mut self) {
        if self.writing {
            log::warn!("begin_writing called with a session already open; abandoning it");
            self.abandon_writing();
        }
        self.reset_session();
        self.out.reset();
        self.arrays = ArrayStore::new();
        self.writing = true;
        log::info!(
            "Metafile session started (point mode {:?}, word size {})",
            self.settings.point_mode,
            self.settings.word_size
        );
    }

    /// Flushes everything pending, terminates the stream and returns the metafile.
    pub fn complete_writing(&mut self) -> Metafile {
        debug_assert!(self.writing, "complete_writing called without an open session");
        self.flush();
        self.out.emit(Command::End);

        let (stream, stats) = self.out.finish();
        let arrays = std::mem::take(&mut self.arrays);
        let extents = self.extents.is_valid().then_some(self.extents);
        self.reset_session();
        self.writing = false;

        log::info!(
            "Metafile session complete: {} primitives, {} draw calls, {} state changes ({} elided), {} bytes, {} arrays",
            stats.primitives_packed,
            stats.draw_calls,
            stats.state_changes_emitted,
            stats.state_changes_elided,
            stats.bytes_written,
            arrays.len()
        );
        Metafile::new(stream, arrays, extents, stats, self.settings.word_size)
    }

    /// Discards the open session, including anything already flushed.
    pub fn abandon_writing(&mut self) {
        if self.writing {
            log::info!(
                "Metafile session abandoned after {} bytes",
                self.out.len()
            );
        }
        self.reset_session();
        self.out.reset();
        self.arrays.clear();
        self.writing = false;
    }

    /// Emits every pending batch.
    pub fn flush(&mut self) {
        self.flush_staged();
    }

    /// Opens a delayed texture-coordinate mapping scope.
    pub fn begin_delayed_mapping(&mut self) -> DelayedMapping<'_> {
        DelayedMapping::open(self)
    }

    fn reset_session(&mut self) {
        self.staging.clear(self.settings.reserve_threshold);
        self.state = RendererState::default();
        self.mapping.clear();
        self.pool = None;
        self.extents = Aabb::INVALID;
    }

    // --- Internals ---

    fn change_state(&mut self, change: StateChange) {
        debug_assert!(self.writing, "state change outside of a session");
        if !self.state.differs(&change) {
            self.out.stats.state_changes_elided += 1;
            log::trace!("elided {change:?}");
            return;
        }
        self.flush();
        self.state.apply(change, &mut self.out);
    }

    /// The traits a primitive of this shape needs from the replay target.
    pub(super) fn requirement(
        &self,
        class: PrimitiveClass,
        layout: VertexLayout,
        translucent: bool,
    ) -> TraitsOptions {
        let mut traits = TraitsOptions::UNSET.with_hlr(self.state.hlr());
        match class {
            PrimitiveClass::Points | PrimitiveClass::Lines => {
                traits.set_attribute(Attribute::LIGHTING, false);
            }
            PrimitiveClass::Triangles => {
                let shading = self.state.shading();
                traits = traits
                    .with_attribute(Attribute::LIGHTING, layout.normals)
                    .with_attribute(Attribute::TEXTURING, layout.texcoords)
                    .with_shading(shading, true)
                    .with_shading(!shading, false)
                    .with_cull(self.state.cull_mode());
            }
        }
        if translucent {
            traits.set_attribute(Attribute::BLENDING, true);
        }
        traits
    }

    /// Makes room in the slot for `class` and returns it, opened for the given shape.
    fn open_batch(
        &mut self,
        class: PrimitiveClass,
        layout: VertexLayout,
        addressing: Addressing,
        translucent: bool,
        marker: SelectionMarker,
    ) -> &mut PackageEntry {
        let kind = PackageKind::active(class, layout, addressing);
        let requirement = self.requirement(class, layout, translucent);
        if !self.staging.entry(class).accepts(kind, &requirement) {
            log::debug!("{class} batch cannot take {kind:?}; flushing");
            self.flush();
        }
        let entry = self.staging.entry_mut(class);
        entry.open(kind, requirement);
        entry.sync_marker(marker);
        entry
    }

    fn track(&mut self, positions: &[Vec3]) {
        if self.settings.track_extents {
            for p in positions {
                self.extents.extend(*p);
            }
        }
    }

    /// Flushes pending batches recorded with the other addressing mode.
    fn ensure_addressing(&mut self, addressing: Addressing) {
        if self.staging.conflicts_with(addressing) {
            log::debug!("Switching to {addressing:?} addressing; flushing");
            self.flush();
        }
    }

    /// Points are their own batches in `Unopt` mode, so any other class flushes them.
    fn separate_unopt_points(&mut self) {
        if self.settings.point_mode == PointInlining::Unopt
            && !self.staging.points.batch().is_empty()
        {
            self.flush();
        }
    }

    /// The converse: in `Unopt` mode a point flushes pending lines and triangles.
    fn separate_unopt_geometry(&mut self) {
        if self.settings.point_mode == PointInlining::Unopt
            && (!self.staging.lines.is_empty() || !self.staging.triangles.is_empty())
        {
            self.flush();
        }
    }

    pub(super) fn release_held_point(&mut self) {
        if let Some(point) = self.staging.points.take_held() {
            log::trace!("Releasing held point {:?}", point.position);
            self.stage_point(point);
        }
    }

    fn stage_point(&mut self, point: HeldPoint) {
        self.ensure_addressing(Addressing::Array);
        self.track(&[point.position]);
        let layout = VertexLayout {
            colors: point.color.is_some(),
            ..VertexLayout::PLAIN
        };
        let translucent = point.color.is_some_and(|c| !c.is_opaque());
        let entry = self.open_batch(
            PrimitiveClass::Points,
            layout,
            Addressing::Array,
            translucent,
            point.marker,
        );
        entry.push_vertex(point.position, point.color, None, None);
    }

    /// Packs independent segments, two vertices each.
    fn pack_segments(&mut self, vertices: &[Vec3], colors: Option<&[Rgba8]>) {
        debug_assert_eq!(vertices.len() % 2, 0, "segments need an even vertex count");
        debug_assert!(colors.is_none_or(|c| c.len() == vertices.len()));
        if vertices.is_empty() {
            return;
        }
        self.ensure_addressing(Addressing::Array);

        if let Some(held) = self.staging.points.take_held() {
            if held.folds_into(vertices, self.settings.point_fold) {
                self.out.stats.points_folded += 1;
                log::debug!("Folded point {:?} into the following line", held.position);
            } else {
                self.stage_point(held);
            }
        }
        self.separate_unopt_points();

        self.track(vertices);
        let layout = if colors.is_some() {
            VertexLayout::COLORED
        } else {
            VertexLayout::PLAIN
        };
        let translucent = colors.is_some_and(|c| c.iter().any(|c| !c.is_opaque()));
        let marker = self.state.marker();
        let entry = self.open_batch(
            PrimitiveClass::Lines,
            layout,
            Addressing::Array,
            translucent,
            marker,
        );
        for (i, position) in vertices.iter().enumerate() {
            entry.push_vertex(*position, colors.map(|c| c[i]), None, None);
        }
    }

    fn pack_indexed(&mut self, class: PrimitiveClass, indices: &[u32]) {
        debug_assert!(self.writing, "indexed primitives packed outside of a session");
        let Some(pool) = self.pool else {
            log::warn!("{class} indices submitted without a vertex pool; ignored");
            return;
        };
        let per_primitive = class.vertices_per_primitive() as usize;
        debug_assert_eq!(indices.len() % per_primitive, 0);
        debug_assert!(
            indices.iter().all(|&i| i < pool.len),
            "index out of range of a pool of {} vertices",
            pool.len
        );
        if indices.is_empty() {
            return;
        }
        if class == PrimitiveClass::Points && self.settings.point_mode == PointInlining::High {
            self.out.stats.points_inlined += indices.len() as u64;
            let pairs: Vec<u32> = indices.iter().flat_map(|&i| [i, i]).collect();
            self.pack_indexed(PrimitiveClass::Lines, &pairs);
            return;
        }
        self.release_held_point();
        self.ensure_addressing(Addressing::Indexed);
        match class {
            // Indexed points are never held for folding.
            PrimitiveClass::Points => self.separate_unopt_geometry(),
            _ => self.separate_unopt_points(),
        }

        self.out.stats.primitives_packed += (indices.len() / per_primitive) as u64;
        if self.settings.track_extents {
            if let Ok(positions) = self.arrays.get::<Vec3>(pool.binding.vertices) {
                for &i in indices {
                    if let Some(p) = positions.get(i as usize) {
                        self.extents.extend(*p);
                    }
                }
            }
        }
        log::trace!("pack {} indexed {class}", indices.len() / per_primitive);

        let marker = self.state.marker();
        let entry = self.open_batch(
            class,
            pool.layout,
            Addressing::Indexed,
            pool.translucent,
            marker,
        );
        entry.push_indices(indices);
    }
}

impl PrimitiveSink for MetafilePackager {
    fn set_color(&mut self, color: Rgba8) {
        self.change_state(StateChange::Color(color));
    }

    fn set_line_weight(&mut self, weight: LineWeight) {
        self.change_state(StateChange::LineWeight(weight));
    }

    fn set_line_style(&mut self, style: LineStyle) {
        self.change_state(StateChange::LineStyle(style));
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.change_state(StateChange::CullMode(mode));
    }

    fn set_attribute(&mut self, attribute: Attribute, on: bool) {
        self.change_state(StateChange::Attribute { attribute, on });
    }

    fn set_shading(&mut self, flags: ShadingFlags, on: bool) {
        self.change_state(StateChange::Shading { flags, on });
    }

    fn set_hlr(&mut self, on: bool) {
        self.change_state(StateChange::Hlr(on));
    }

    fn set_selection_marker(&mut self, marker: SelectionMarker) {
        if self.state.set_marker(marker) {
            log::trace!("selection marker {marker:?}");
        } else {
            self.out.stats.state_changes_elided += 1;
        }
    }

    fn set_selection_flags(&mut self, flags: SelectionFlags) {
        self.change_state(StateChange::SelectionFlags(flags));
    }

    fn pack_point(&mut self, position: Vec3, color: Option<Rgba8>) {
        debug_assert!(self.writing, "point packed outside of a session");
        self.out.stats.primitives_packed += 1;
        log::trace!("pack point {position:?}");
        let point = HeldPoint {
            position,
            color,
            marker: self.state.marker(),
        };

        match self.settings.point_mode {
            PointInlining::Unopt => {
                self.separate_unopt_geometry();
                self.stage_point(point);
            }
            PointInlining::Opt => {
                // Extents grow when the point is staged; a folded point is never drawn.
                self.release_held_point();
                self.staging.points.hold(point);
            }
            PointInlining::High => {
                self.out.stats.points_inlined += 1;
                let colors = color.map(|c| [c, c]);
                self.pack_segments(&[position, position], colors.as_ref().map(|c| &c[..]));
            }
            PointInlining::Sep => self.stage_point(point),
        }
    }

    fn pack_polyline(&mut self, points: &[Vec3], colors: Option<&[Rgba8]>) {
        debug_assert!(self.writing, "polyline packed outside of a session");
        debug_assert!(colors.is_none_or(|c| c.len() == points.len()));
        match points {
            [] => {}
            [single] => self.pack_point(*single, colors.and_then(|c| c.first().copied())),
            _ => {
                self.out.stats.primitives_packed += (points.len() - 1) as u64;
                log::trace!("pack polyline of {} points", points.len());

                let mut positions = std::mem::take(&mut self.scratch_positions);
                let mut expanded = std::mem::take(&mut self.scratch_colors);
                positions.clear();
                expanded.clear();
                for pair in points.windows(2) {
                    positions.extend_from_slice(pair);
                }
                if let Some(colors) = colors {
                    for pair in colors.windows(2) {
                        expanded.extend_from_slice(pair);
                    }
                }
                self.pack_segments(&positions, colors.map(|_| expanded.as_slice()));
                self.scratch_positions = positions;
                self.scratch_colors = expanded;
            }
        }
    }

    fn pack_lines(&mut self, segments: &[Vec3], colors: Option<&[Rgba8]>) {
        debug_assert!(self.writing, "lines packed outside of a session");
        self.out.stats.primitives_packed += (segments.len() / 2) as u64;
        log::trace!("pack {} segments", segments.len() / 2);
        self.pack_segments(segments, colors);
    }

    fn pack_triangle(&mut self, triangle: &Triangle) {
        debug_assert!(self.writing, "triangle packed outside of a session");
        self.ensure_addressing(Addressing::Array);
        self.release_held_point();
        self.separate_unopt_points();

        self.out.stats.primitives_packed += 1;
        self.track(&triangle.positions);
        log::trace!("pack triangle {:?}", triangle.positions);

        let deferred = match triangle.texcoords {
            TexCoords::Deferred => {
                let record = self.mapping.record(triangle.positions);
                if record.is_none() {
                    log::warn!("Deferred texture coordinates outside a delayed mapping scope; using zeros");
                }
                record
            }
            _ => None,
        };
        let texcoords = match triangle.texcoords {
            TexCoords::None => None,
            TexCoords::Explicit(coords) => Some(coords),
            TexCoords::Deferred => Some([Vec2::ZERO; 3]),
        };
        let translucent = triangle
            .colors
            .is_some_and(|c| c.iter().any(|c| !c.is_opaque()));

        let marker = self.state.marker();
        let entry = self.open_batch(
            PrimitiveClass::Triangles,
            triangle.layout(),
            Addressing::Array,
            translucent,
            marker,
        );
        let element = entry.len();
        for i in 0..3 {
            entry.push_vertex(
                triangle.positions[i],
                triangle.colors.map(|c| c[i]),
                triangle.normals.map(|n| n[i]),
                texcoords.map(|t| t[i]),
            );
        }
        if let Some((scope, record)) = deferred {
            entry.defer_texcoords(DeferredSlot {
                scope,
                record,
                element,
            });
        }
    }

    fn set_vertex_pool(&mut self, pool: VertexArrays<'_>) {
        debug_assert!(self.writing, "vertex pool set outside of a session");
        debug_assert!(pool.is_consistent(), "vertex pool arrays differ in length");
        if self.staging.conflicts_with(Addressing::Array) {
            log::debug!("Vertex pool replaced with indexed batches pending; flushing");
            self.flush();
        }

        let vertices = self.arrays.append_slice(pool.positions);
        let colors = pool.colors.map(|c| self.arrays.append_slice(c));
        let normals = pool.normals.map(|n| self.arrays.append_slice(n));
        let texcoords = pool.texcoords.map(|t| self.arrays.append_slice(t));
        let binding = ArrayBinding {
            vertices,
            colors,
            normals,
            texcoords,
        };
        self.out.stats.arrays_created += 1
            + u64::from(colors.is_some())
            + u64::from(normals.is_some())
            + u64::from(texcoords.is_some());

        self.pool = Some(VertexPool {
            binding,
            layout: pool.layout(),
            len: pool.len() as u32,
            translucent: pool.colors.is_some_and(|c| c.iter().any(|c| !c.is_opaque())),
        });
        log::debug!("Uploaded vertex pool of {} vertices as {binding:?}", pool.len());
    }

    fn pack_indexed_points(&mut self, indices: &[u32]) {
        self.pack_indexed(PrimitiveClass::Points, indices);
    }

    fn pack_indexed_lines(&mut self, indices: &[u32]) {
        self.pack_indexed(PrimitiveClass::Lines, indices);
    }

    fn pack_indexed_triangles(&mut self, indices: &[u32]) {
        self.pack_indexed(PrimitiveClass::Triangles, indices);
    }
}
