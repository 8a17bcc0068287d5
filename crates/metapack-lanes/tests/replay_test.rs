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

use metapack_core::error::{MetafileError, StreamError};
use metapack_core::math::{Rgba8, Vec3};
use metapack_core::metafile::{
    Attribute, Command, CullMode, LineStyle, LineWeight, PackStats, PackagerSettings,
    PrimitiveClass, SelectionFlags, SelectionMark, SelectionMarker, ShadingFlags,
};
use metapack_core::traits::{PrimitiveSink, ReplayTarget, Triangle, VertexArrays};
use metapack_data::{ArrayStore, Metafile};
use metapack_lanes::{replay, MetafilePackager};
use std::ops::Range;

/// What a replay target observed, with arrays copied out.
#[derive(Debug, Clone, PartialEq)]
enum Event {
    State,
    Marks(Vec<SelectionMark>),
    Bind { vertices: usize, colored: bool },
    Unbind,
    Draw(PrimitiveClass, Range<u32>),
    DrawIndexed(PrimitiveClass, Vec<u32>),
}

#[derive(Default)]
struct RecordingTarget {
    events: Vec<Event>,
    bound: Vec<Vec3>,
    drawn: Vec<Vec3>,
}

impl ReplayTarget for RecordingTarget {
    fn set_color(&mut self, _: Rgba8) {
        self.events.push(Event::State);
    }
    fn set_line_weight(&mut self, _: LineWeight) {
        self.events.push(Event::State);
    }
    fn set_line_style(&mut self, _: LineStyle) {
        self.events.push(Event::State);
    }
    fn set_cull_mode(&mut self, _: CullMode) {
        self.events.push(Event::State);
    }
    fn set_attribute(&mut self, _: Attribute, _: bool) {
        self.events.push(Event::State);
    }
    fn set_shading(&mut self, _: ShadingFlags, _: bool) {
        self.events.push(Event::State);
    }
    fn set_hlr(&mut self, _: bool) {
        self.events.push(Event::State);
    }
    fn set_selection_flags(&mut self, _: SelectionFlags) {
        self.events.push(Event::State);
    }
    fn selection_marks(&mut self, marks: &[SelectionMark]) {
        self.events.push(Event::Marks(marks.to_vec()));
    }
    fn enable_arrays(&mut self, arrays: &VertexArrays<'_>) {
        assert!(arrays.is_consistent());
        self.bound = arrays.positions.to_vec();
        self.events.push(Event::Bind {
            vertices: arrays.len(),
            colored: arrays.colors.is_some(),
        });
    }
    fn disable_arrays(&mut self) {
        self.bound.clear();
        self.events.push(Event::Unbind);
    }
    fn draw_arrays(&mut self, class: PrimitiveClass, vertices: Range<u32>) {
        self.drawn
            .extend_from_slice(&self.bound[vertices.start as usize..vertices.end as usize]);
        self.events.push(Event::Draw(class, vertices));
    }
    fn draw_indexed(&mut self, class: PrimitiveClass, indices: &[u32]) {
        self.drawn
            .extend(indices.iter().map(|&i| self.bound[i as usize]));
        self.events.push(Event::DrawIndexed(class, indices.to_vec()));
    }
}

fn cad_scene(p: &mut MetafilePackager) {
    p.set_color(Rgba8::rgb(200, 200, 200));
    p.set_line_weight(LineWeight::Pixels(2));
    p.set_selection_marker(SelectionMarker(10));
    p.pack_polyline(
        &[Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y, Vec3::ZERO],
        None,
    );
    p.set_selection_marker(SelectionMarker(11));
    p.pack_triangle(&Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y));
    p.pack_point(Vec3::new(0.5, 0.5, 0.0), None);

    p.set_cull_mode(CullMode::Back);
    let pool = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
    let colors = [Rgba8::RED, Rgba8::GREEN, Rgba8::BLUE, Rgba8::WHITE];
    p.set_vertex_pool(VertexArrays {
        colors: Some(&colors),
        ..VertexArrays::positions(&pool)
    });
    p.pack_indexed_triangles(&[0, 1, 2, 0, 2, 3]);
    p.pack_indexed_lines(&[0, 3]);
}

#[test]
fn test_replay_reproduces_recorded_draws() {
    // --- 1. ARRANGE ---
    let mut packager = MetafilePackager::new(PackagerSettings::default());
    packager.begin_writing();
    cad_scene(&mut packager);
    let file = packager.complete_writing();
    let recorded = file.commands().unwrap();

    // --- 2. ACT ---
    let mut target = RecordingTarget::default();
    let summary = replay(&file, &mut target).unwrap();

    // --- 3. ASSERT ---
    let recorded_draws: Vec<Event> = recorded
        .iter()
        .filter_map(|c| match c {
            Command::DrawArrays {
                class,
                first,
                count,
            } => Some(Event::Draw(*class, *first..first + count)),
            Command::DrawIndexed {
                class,
                indices,
                first,
                count,
            } => {
                let slice = file
                    .arrays()
                    .get_range::<u32>(*indices, *first, *count)
                    .unwrap();
                Some(Event::DrawIndexed(*class, slice.to_vec()))
            }
            _ => None,
        })
        .collect();
    let replayed_draws: Vec<Event> = target
        .events
        .iter()
        .filter(|e| matches!(e, Event::Draw(..) | Event::DrawIndexed(..)))
        .cloned()
        .collect();
    assert_eq!(replayed_draws, recorded_draws);

    assert_eq!(summary.commands, recorded.len());
    assert_eq!(summary.draw_calls as u64, file.stats().draw_calls);
    assert_eq!(summary.array_binds as u64, file.stats().array_binds);
    assert_eq!(summary.state_changes as u64, file.stats().state_changes_emitted);

    // Lines, triangle and point share one binding; the colored indexed mesh has its own.
    let binds: Vec<&Event> = target
        .events
        .iter()
        .filter(|e| matches!(e, Event::Bind { .. }))
        .collect();
    assert_eq!(
        binds,
        vec![
            &Event::Bind {
                vertices: 12,
                colored: false
            },
            &Event::Bind {
                vertices: 4,
                colored: true
            }
        ]
    );
}

#[test]
fn test_replay_delivers_rebased_marks() {
    let mut packager = MetafilePackager::default();
    packager.begin_writing();
    cad_scene(&mut packager);
    let file = packager.complete_writing();

    let mut target = RecordingTarget::default();
    replay(&file, &mut target).unwrap();

    let marks: Vec<&Event> = target
        .events
        .iter()
        .filter(|e| matches!(e, Event::Marks(_)))
        .collect();
    // The polyline has 8 vertices; the triangle's mark starts right after it,
    // and the held point released at the end stays under marker 11.
    assert_eq!(
        marks.first(),
        Some(&&Event::Marks(vec![
            SelectionMark::new(SelectionMarker(10), 0),
            SelectionMark::new(SelectionMarker(11), 8),
        ]))
    );
}

#[test]
fn test_replay_covers_every_packed_vertex() {
    let segments = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
    let mut packager = MetafilePackager::default();
    packager.begin_writing();
    packager.pack_lines(&segments, None);
    let file = packager.complete_writing();

    let mut target = RecordingTarget::default();
    replay(&file, &mut target).unwrap();
    assert_eq!(target.drawn, segments.to_vec());
}

#[test]
fn test_corrupt_stream_is_reported() {
    let file = Metafile::new(
        vec![Command::End.tag() as u8 + 100],
        ArrayStore::new(),
        None,
        PackStats::default(),
        8,
    );
    let err = replay(&file, &mut RecordingTarget::default()).unwrap_err();
    assert!(matches!(
        err,
        MetafileError::Stream(StreamError::UnknownOpcode { offset: 0, .. })
    ));
}
