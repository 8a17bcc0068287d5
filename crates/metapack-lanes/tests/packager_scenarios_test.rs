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

use metapack_core::math::{Rgba8, Vec2, Vec3};
use metapack_core::metafile::{
    ArrayBinding, ArrayId, Attribute, Command, PackagerSettings, PointFoldPolicy, PointInlining,
    PrimitiveClass, SelectionMark, SelectionMarker,
};
use metapack_core::traits::{PrimitiveSink, TexCoords, Triangle, VertexArrays};
use metapack_data::{Metafile, StreamReader};
use metapack_lanes::MetafilePackager;

// --- Helpers ---

fn record(settings: PackagerSettings, scene: impl FnOnce(&mut MetafilePackager)) -> Metafile {
    let mut packager = MetafilePackager::new(settings);
    packager.begin_writing();
    scene(&mut packager);
    packager.complete_writing()
}

fn commands(file: &Metafile) -> Vec<Command> {
    file.commands().expect("recorded stream decodes")
}

fn with_mode(point_mode: PointInlining) -> PackagerSettings {
    PackagerSettings {
        point_mode,
        ..Default::default()
    }
}

fn draw(class: PrimitiveClass, first: u32, count: u32) -> Command {
    Command::DrawArrays {
        class,
        first,
        count,
    }
}

fn bind(id: u32) -> Command {
    Command::EnableArrays(ArrayBinding::positions(ArrayId(id)))
}

fn drawn_classes(commands: &[Command]) -> Vec<PrimitiveClass> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::DrawArrays { class, .. } | Command::DrawIndexed { class, .. } => Some(*class),
            _ => None,
        })
        .collect()
}

fn count(commands: &[Command], pred: impl Fn(&Command) -> bool) -> usize {
    commands.iter().filter(|c| pred(c)).count()
}

fn flat_triangle(x: f32) -> Triangle {
    Triangle::new(
        Vec3::new(x, 0.0, 0.0),
        Vec3::new(x + 1.0, 0.0, 0.0),
        Vec3::new(x, 1.0, 0.0),
    )
}

// --- State diffing ---

#[test]
fn test_repeated_state_emits_once() {
    // --- 1. ARRANGE & ACT ---
    let file = record(PackagerSettings::default(), |p| {
        for _ in 0..50 {
            p.set_color(Rgba8::RED);
            p.set_hlr(true);
        }
    });

    // --- 2. ASSERT ---
    let commands = commands(&file);
    assert_eq!(
        commands,
        vec![
            Command::SetColor(Rgba8::RED),
            Command::SetHlr(true),
            Command::End
        ]
    );
    assert_eq!(file.stats().state_changes_emitted, 2);
    assert_eq!(file.stats().state_changes_elided, 98);
}

#[test]
fn test_alpha_toggles_blending() {
    // --- 1. ARRANGE & ACT ---
    let translucent = Rgba8::RED.with_alpha(128);
    let file = record(PackagerSettings::default(), |p| {
        p.set_color(Rgba8::RED);
        p.set_color(translucent);
        p.set_color(Rgba8::RED);
    });

    // --- 2. ASSERT ---
    assert_eq!(
        commands(&file),
        vec![
            Command::SetColor(Rgba8::RED),
            Command::SetColor(translucent),
            Command::SetAttribute {
                attribute: Attribute::BLENDING,
                on: true
            },
            Command::SetColor(Rgba8::RED),
            Command::SetAttribute {
                attribute: Attribute::BLENDING,
                on: false
            },
            Command::End,
        ]
    );
}

#[test]
fn test_explicit_blending_survives_opaque_rgb_change() {
    // --- 1. ARRANGE & ACT ---
    let file = record(PackagerSettings::default(), |p| {
        p.set_attribute(Attribute::BLENDING, true);
        p.set_color(Rgba8::RED);
        p.set_color(Rgba8::BLUE);
    });

    // --- 2. ASSERT ---
    // Alpha stays at 255 throughout, so blending is left as the caller set it.
    assert_eq!(
        commands(&file),
        vec![
            Command::SetAttribute {
                attribute: Attribute::BLENDING,
                on: true
            },
            Command::SetColor(Rgba8::RED),
            Command::SetColor(Rgba8::BLUE),
            Command::End,
        ]
    );
}

#[test]
fn test_state_change_flushes_pending_batch() {
    let segment = [Vec3::ZERO, Vec3::X];
    let file = record(PackagerSettings::default(), |p| {
        p.pack_lines(&segment, None);
        p.set_color(Rgba8::RED);
        p.pack_lines(&segment, None);
    });

    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            draw(PrimitiveClass::Lines, 0, 2),
            Command::DisableArrays,
            Command::SetColor(Rgba8::RED),
            bind(1),
            draw(PrimitiveClass::Lines, 0, 2),
            Command::DisableArrays,
            Command::End,
        ]
    );
}

// --- Flush determinism ---

#[test]
fn test_flushing_nothing_emits_nothing() {
    let mut packager = MetafilePackager::default();
    packager.begin_writing();

    packager.flush();
    packager.flush();
    assert_eq!(packager.recorded_bytes(), 0);

    let file = packager.complete_writing();
    assert_eq!(commands(&file), vec![Command::End]);
    assert_eq!(file.stats().flushes, 0);
    assert!(file.extents().is_none());
}

#[test]
fn test_lines_only_flush_binds_once() {
    let file = record(PackagerSettings::default(), |p| {
        p.pack_lines(&[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z], None);
    });

    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            draw(PrimitiveClass::Lines, 0, 4),
            Command::DisableArrays,
            Command::End
        ]
    );
    assert_eq!(file.stats().flushes, 1);
    assert_eq!(file.stats().merged_flushes, 0);
}

#[test]
fn test_polyline_then_triangle_share_one_binding() {
    // --- 1. ARRANGE ---
    let polyline = [
        Vec3::ZERO,
        Vec3::X,
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::Y,
    ];

    // --- 2. ACT ---
    let file = record(PackagerSettings::default(), |p| {
        p.pack_polyline(&polyline, None);
        p.pack_triangle(&flat_triangle(2.0));
    });

    // --- 3. ASSERT ---
    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            draw(PrimitiveClass::Triangles, 6, 3),
            draw(PrimitiveClass::Lines, 0, 6),
            Command::DisableArrays,
            Command::End,
        ]
    );
    let positions = file.arrays().get::<Vec3>(ArrayId(0)).unwrap();
    assert_eq!(positions.len(), 9);
    assert_eq!(positions[..2], [Vec3::ZERO, Vec3::X]);
    assert_eq!(positions[6], Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(file.stats().merged_flushes, 1);
    assert_eq!(file.stats().primitives_packed, 4);
}

// --- Merge compatibility ---

#[test]
fn test_lit_triangles_do_not_merge_with_lines() {
    let normals = [Vec3::Z; 3];
    let file = record(PackagerSettings::default(), |p| {
        p.pack_lines(&[Vec3::ZERO, Vec3::X], None);
        p.pack_triangle(&flat_triangle(0.0).with_normals(normals));
    });

    let commands = commands(&file);
    assert_eq!(
        commands,
        vec![
            Command::SetAttribute {
                attribute: Attribute::LIGHTING,
                on: true
            },
            Command::EnableArrays(ArrayBinding {
                normals: Some(ArrayId(1)),
                ..ArrayBinding::positions(ArrayId(0))
            }),
            draw(PrimitiveClass::Triangles, 0, 3),
            Command::DisableArrays,
            Command::SetAttribute {
                attribute: Attribute::LIGHTING,
                on: false
            },
            bind(2),
            draw(PrimitiveClass::Lines, 0, 2),
            Command::DisableArrays,
            Command::End,
        ]
    );
}

#[test]
fn test_merging_can_be_disabled() {
    let settings = PackagerSettings {
        merge_lines_and_triangles: false,
        ..Default::default()
    };
    let file = record(settings, |p| {
        p.pack_lines(&[Vec3::ZERO, Vec3::X], None);
        p.pack_triangle(&flat_triangle(0.0));
    });

    let commands = commands(&file);
    assert_eq!(count(&commands, |c| matches!(c, Command::EnableArrays(_))), 2);
    assert_eq!(
        drawn_classes(&commands),
        vec![PrimitiveClass::Triangles, PrimitiveClass::Lines]
    );
}

#[test]
fn test_layout_change_forces_flush() {
    let file = record(PackagerSettings::default(), |p| {
        p.pack_lines(&[Vec3::ZERO, Vec3::X], None);
        p.pack_lines(&[Vec3::Y, Vec3::Z], Some(&[Rgba8::RED, Rgba8::BLUE]));
    });

    let commands = commands(&file);
    assert_eq!(count(&commands, |c| matches!(c, Command::EnableArrays(_))), 2);
    assert_eq!(file.stats().flushes, 2);
}

// --- Selection marks ---

#[test]
fn test_selection_marks_are_rebased_after_merge() {
    // --- 1. ARRANGE & ACT ---
    let file = record(PackagerSettings::default(), |p| {
        p.set_selection_marker(SelectionMarker(1));
        p.pack_lines(&[Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z], None);
        p.set_selection_marker(SelectionMarker(2));
        p.pack_triangle(&flat_triangle(0.0));
        p.set_selection_marker(SelectionMarker(3));
        p.pack_triangle(&flat_triangle(1.0));
    });

    // --- 2. ASSERT ---
    // Triangle marks sat at offsets 0 and 3 of their batch; the line batch has 4 vertices.
    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            Command::SelectionMarks(vec![
                SelectionMark::new(SelectionMarker(1), 0),
                SelectionMark::new(SelectionMarker(2), 4),
                SelectionMark::new(SelectionMarker(3), 7),
            ]),
            draw(PrimitiveClass::Triangles, 4, 6),
            draw(PrimitiveClass::Lines, 0, 4),
            Command::DisableArrays,
            Command::End,
        ]
    );
}

// --- Point inlining ---

#[test]
fn test_opt_lone_point_is_drawn() {
    let file = record(with_mode(PointInlining::Opt), |p| {
        p.pack_point(Vec3::new(3.0, 4.0, 5.0), None);
    });

    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            draw(PrimitiveClass::Points, 0, 1),
            Command::DisableArrays,
            Command::End
        ]
    );
    assert_eq!(file.stats().points_folded, 0);
}

#[test]
fn test_opt_point_before_line_is_folded() {
    let file = record(with_mode(PointInlining::Opt), |p| {
        p.pack_point(Vec3::ZERO, None);
        p.pack_lines(&[Vec3::ZERO, Vec3::X], None);
    });

    let commands = commands(&file);
    assert_eq!(drawn_classes(&commands), vec![PrimitiveClass::Lines]);
    assert_eq!(file.stats().points_folded, 1);
}

#[test]
fn test_coincident_policy_keeps_distant_point() {
    // --- 1. ARRANGE ---
    let settings = PackagerSettings {
        point_fold: PointFoldPolicy::Coincident { tolerance: 0.001 },
        ..Default::default()
    };

    // --- 2. ACT ---
    let file = record(settings, |p| {
        p.pack_point(Vec3::new(10.0, 10.0, 0.0), None);
        p.pack_lines(&[Vec3::ZERO, Vec3::X], None);
    });

    // --- 3. ASSERT ---
    // The released point shares the line binding and is drawn after it.
    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            draw(PrimitiveClass::Lines, 0, 2),
            draw(PrimitiveClass::Points, 2, 1),
            Command::DisableArrays,
            Command::End,
        ]
    );
    assert_eq!(file.stats().points_folded, 0);
}

#[test]
fn test_high_mode_never_draws_points() {
    let file = record(with_mode(PointInlining::High), |p| {
        p.pack_point(Vec3::X, None);
        p.pack_point(Vec3::Y, None);
        p.pack_lines(&[Vec3::ZERO, Vec3::Z], None);
    });

    let commands = commands(&file);
    assert_eq!(
        commands,
        vec![
            bind(0),
            draw(PrimitiveClass::Lines, 0, 6),
            Command::DisableArrays,
            Command::End
        ]
    );
    assert_eq!(file.stats().points_inlined, 2);
    let positions = file.arrays().get::<Vec3>(ArrayId(0)).unwrap();
    assert_eq!(positions[0], positions[1]);
}

#[test]
fn test_sep_mode_draws_points_after_combined_sequence() {
    let file = record(with_mode(PointInlining::Sep), |p| {
        p.pack_point(Vec3::new(0.5, 0.5, 0.0), None);
        p.pack_lines(&[Vec3::ZERO, Vec3::X], None);
        p.pack_triangle(&flat_triangle(0.0));
    });

    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            draw(PrimitiveClass::Triangles, 2, 3),
            draw(PrimitiveClass::Lines, 0, 2),
            Command::DisableArrays,
            bind(1),
            draw(PrimitiveClass::Points, 0, 1),
            Command::DisableArrays,
            Command::End,
        ]
    );
}

#[test]
fn test_unopt_mode_keeps_submission_order() {
    let file = record(with_mode(PointInlining::Unopt), |p| {
        p.pack_point(Vec3::X, None);
        p.pack_lines(&[Vec3::ZERO, Vec3::Y], None);
        p.pack_point(Vec3::Z, None);
    });

    let commands = commands(&file);
    assert_eq!(
        drawn_classes(&commands),
        vec![
            PrimitiveClass::Points,
            PrimitiveClass::Lines,
            PrimitiveClass::Points
        ]
    );
    assert_eq!(count(&commands, |c| matches!(c, Command::EnableArrays(_))), 3);
}

// --- Indexed mode ---

#[test]
fn test_indexed_batches_merge_through_one_index_array() {
    // --- 1. ARRANGE ---
    let pool = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];

    // --- 2. ACT ---
    let file = record(PackagerSettings::default(), |p| {
        p.set_vertex_pool(VertexArrays::positions(&pool));
        p.pack_indexed_triangles(&[0, 1, 2, 0, 2, 3]);
        p.pack_indexed_lines(&[0, 1, 1, 2]);
    });

    // --- 3. ASSERT ---
    let indices = ArrayId(1);
    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            Command::DrawIndexed {
                class: PrimitiveClass::Triangles,
                indices,
                first: 4,
                count: 6
            },
            Command::DrawIndexed {
                class: PrimitiveClass::Lines,
                indices,
                first: 0,
                count: 4
            },
            Command::DisableArrays,
            Command::End,
        ]
    );
    assert_eq!(
        file.arrays().get::<u32>(indices).unwrap(),
        &[0, 1, 1, 2, 0, 1, 2, 0, 2, 3]
    );
}

#[test]
fn test_indexed_points_join_the_indexed_line_batch() {
    // --- 1. ARRANGE ---
    let pool = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];

    // --- 2. ACT ---
    let file = record(with_mode(PointInlining::Opt), |p| {
        p.set_vertex_pool(VertexArrays::positions(&pool));
        p.pack_indexed_lines(&[0, 1]);
        p.pack_indexed_points(&[2, 3]);
    });

    // --- 3. ASSERT ---
    let indices = ArrayId(1);
    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            Command::DrawIndexed {
                class: PrimitiveClass::Lines,
                indices,
                first: 0,
                count: 2
            },
            Command::DrawIndexed {
                class: PrimitiveClass::Points,
                indices,
                first: 2,
                count: 2
            },
            Command::DisableArrays,
            Command::End,
        ]
    );
    assert_eq!(file.arrays().get::<u32>(indices).unwrap(), &[0, 1, 2, 3]);
    assert_eq!(file.stats().primitives_packed, 3);
}

#[test]
fn test_high_mode_turns_indexed_points_into_degenerate_lines() {
    let pool = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
    let file = record(with_mode(PointInlining::High), |p| {
        p.set_vertex_pool(VertexArrays::positions(&pool));
        p.pack_indexed_points(&[1, 3]);
    });

    let indices = ArrayId(1);
    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            Command::DrawIndexed {
                class: PrimitiveClass::Lines,
                indices,
                first: 0,
                count: 4
            },
            Command::DisableArrays,
            Command::End,
        ]
    );
    assert_eq!(file.arrays().get::<u32>(indices).unwrap(), &[1, 1, 3, 3]);
    assert_eq!(file.stats().points_inlined, 2);
}

#[test]
fn test_sep_mode_keeps_indexed_points_apart() {
    let pool = [Vec3::ZERO, Vec3::X, Vec3::Y];
    let file = record(with_mode(PointInlining::Sep), |p| {
        p.set_vertex_pool(VertexArrays::positions(&pool));
        p.pack_indexed_lines(&[0, 1]);
        p.pack_indexed_points(&[2]);
    });

    assert_eq!(
        commands(&file),
        vec![
            bind(0),
            Command::DrawIndexed {
                class: PrimitiveClass::Lines,
                indices: ArrayId(1),
                first: 0,
                count: 2
            },
            Command::DisableArrays,
            bind(0),
            Command::DrawIndexed {
                class: PrimitiveClass::Points,
                indices: ArrayId(2),
                first: 0,
                count: 1
            },
            Command::DisableArrays,
            Command::End,
        ]
    );
}

#[test]
fn test_array_and_indexed_points_never_share_a_binding() {
    let pool = [Vec3::ZERO, Vec3::X];
    let file = record(with_mode(PointInlining::Sep), |p| {
        p.set_vertex_pool(VertexArrays::positions(&pool));
        p.pack_point(Vec3::Y, None);
        p.pack_indexed_points(&[0, 1]);
        p.pack_point(Vec3::Z, None);
    });

    let commands = commands(&file);
    assert_eq!(count(&commands, |c| matches!(c, Command::EnableArrays(_))), 3);
    assert_eq!(
        count(&commands, |c| matches!(c, Command::DrawArrays { .. })),
        2
    );
    assert_eq!(
        count(&commands, |c| matches!(c, Command::DrawIndexed { .. })),
        1
    );
}

#[test]
fn test_addressing_modes_never_share_a_binding() {
    let pool = [Vec3::ZERO, Vec3::X, Vec3::Y];
    let file = record(PackagerSettings::default(), |p| {
        p.pack_lines(&[Vec3::ZERO, Vec3::Z], None);
        p.set_vertex_pool(VertexArrays::positions(&pool));
        p.pack_indexed_lines(&[0, 1]);
        p.pack_triangle(&flat_triangle(0.0));
        p.pack_indexed_triangles(&[0, 1, 2]);
    });

    // Split the stream into bind..disable sequences.
    let commands = commands(&file);
    let mut sequences: Vec<Vec<&Command>> = Vec::new();
    for command in &commands {
        match command {
            Command::EnableArrays(_) => sequences.push(Vec::new()),
            Command::DrawArrays { .. } | Command::DrawIndexed { .. } => {
                sequences.last_mut().expect("draw inside a binding").push(command)
            }
            _ => {}
        }
    }
    assert_eq!(sequences.len(), 4);
    for draws in sequences {
        let indexed = draws
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
            .count();
        assert!(indexed == 0 || indexed == draws.len());
    }
}

#[test]
fn test_indexed_call_without_pool_is_ignored() {
    let file = record(PackagerSettings::default(), |p| {
        p.pack_indexed_lines(&[0, 1]);
    });
    assert_eq!(commands(&file), vec![Command::End]);
}

// --- Delayed mapping ---

#[test]
fn test_delayed_mapping_patches_flushed_texcoords() {
    // --- 1. ARRANGE ---
    let mut packager = MetafilePackager::default();
    packager.begin_writing();

    // --- 2. ACT ---
    {
        let mut scope = packager.begin_delayed_mapping();
        scope.pack_triangle(&flat_triangle(0.0).with_texcoords(TexCoords::Deferred));
        scope.pack_triangle(&flat_triangle(5.0).with_texcoords(TexCoords::Deferred));
        let resolved = scope
            .resolve(|p| {
                [
                    Vec2::new(p[0].x, 0.0),
                    Vec2::new(p[1].x, 0.0),
                    Vec2::new(p[2].x, 1.0),
                ]
            })
            .unwrap();
        assert_eq!(resolved, 2);
    }
    let file = packager.complete_writing();

    // --- 3. ASSERT ---
    let commands = commands(&file);
    assert_eq!(
        commands[0],
        Command::SetAttribute {
            attribute: Attribute::TEXTURING,
            on: true
        }
    );
    let Command::EnableArrays(binding) = commands[1] else {
        panic!("expected a binding, got {:?}", commands[1]);
    };
    let texcoords = file.arrays().get::<Vec2>(binding.texcoords.unwrap()).unwrap();
    assert_eq!(
        texcoords,
        &[
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(5.0, 1.0),
        ]
    );
}

#[test]
fn test_delayed_mapping_resolves_in_stack_order() {
    // --- 1. ARRANGE ---
    let textured = |x| flat_triangle(x).with_texcoords(TexCoords::Deferred);
    let mut packager = MetafilePackager::default();
    packager.begin_writing();

    // --- 2. ACT ---
    {
        let mut outer = packager.begin_delayed_mapping();
        outer.pack_triangle(&textured(0.0));
        {
            let mut inner = outer.begin_delayed_mapping();
            assert_eq!(inner.depth(), 1);
            inner.pack_triangle(&textured(5.0));
            // Dropped unresolved: its triangle gets zero coordinates.
        }
        outer.pack_triangle(&textured(10.0));
        assert_eq!(outer.resolve(|_| [Vec2::ONE; 3]).unwrap(), 2);
    }
    let file = packager.complete_writing();

    // --- 3. ASSERT ---
    let texcoord_arrays: Vec<&[Vec2]> = commands(&file)
        .iter()
        .filter_map(|c| match c {
            Command::EnableArrays(binding) => binding.texcoords,
            _ => None,
        })
        .map(|id| file.arrays().get::<Vec2>(id).unwrap())
        .collect();
    assert_eq!(texcoord_arrays.len(), 2);
    assert_eq!(texcoord_arrays[0][..3], [Vec2::ONE; 3]);
    assert_eq!(texcoord_arrays[0][3..], [Vec2::ZERO; 3]);
    assert_eq!(texcoord_arrays[1], &[Vec2::ONE; 3]);
}

#[test]
fn test_session_completed_inside_mapping_scope() {
    // --- 1. ARRANGE ---
    let mut packager = MetafilePackager::default();
    packager.begin_writing();

    // --- 2. ACT ---
    // The scope is dropped after its session already ended.
    let file = {
        let mut scope = packager.begin_delayed_mapping();
        scope.pack_triangle(&flat_triangle(0.0).with_texcoords(TexCoords::Deferred));
        scope.complete_writing()
    };

    // --- 3. ASSERT ---
    assert!(!packager.is_writing());
    let commands = commands(&file);
    assert_eq!(drawn_classes(&commands), vec![PrimitiveClass::Triangles]);

    packager.begin_writing();
    let mut scope = packager.begin_delayed_mapping();
    scope.abandon_writing();
    assert_eq!(scope.resolve(|_| [Vec2::ONE; 3]).unwrap(), 0);
}

// --- Session lifecycle ---

#[test]
fn test_extents_cover_every_vertex() {
    let file = record(PackagerSettings::default(), |p| {
        p.pack_polyline(&[Vec3::ZERO, Vec3::new(2.0, 3.0, -1.0)], None);
        p.pack_point(Vec3::new(-4.0, 0.5, 0.0), None);
    });

    let extents = file.extents().expect("geometry was packed");
    approx::assert_relative_eq!(extents.min.x, -4.0);
    approx::assert_relative_eq!(extents.min.z, -1.0);
    approx::assert_relative_eq!(extents.max.y, 3.0);
    approx::assert_relative_eq!(extents.max.x, 2.0);
}

#[test]
fn test_folded_point_does_not_grow_extents() {
    let file = record(with_mode(PointInlining::Opt), |p| {
        p.pack_point(Vec3::new(100.0, 100.0, 100.0), None);
        p.pack_lines(&[Vec3::ZERO, Vec3::X], None);
    });

    assert_eq!(file.stats().points_folded, 1);
    let extents = file.extents().expect("geometry was packed");
    approx::assert_relative_eq!(extents.max.x, 1.0);
    approx::assert_relative_eq!(extents.max.y, 0.0);
    approx::assert_relative_eq!(extents.max.z, 0.0);
}

#[test]
fn test_abandoned_session_leaves_nothing_behind() {
    let mut packager = MetafilePackager::default();
    packager.begin_writing();
    packager.set_color(Rgba8::BLUE);
    packager.pack_lines(&[Vec3::ZERO, Vec3::X], None);
    packager.flush();
    packager.abandon_writing();
    assert!(!packager.is_writing());

    packager.begin_writing();
    let file = packager.complete_writing();
    assert_eq!(commands(&file), vec![Command::End]);
    assert!(file.arrays().is_empty());
}

#[test]
fn test_sessions_are_deterministic() {
    let scene = |p: &mut MetafilePackager| {
        p.set_color(Rgba8::GREEN);
        p.set_selection_marker(SelectionMarker(42));
        p.pack_polyline(&[Vec3::ZERO, Vec3::X, Vec3::Y], None);
        p.pack_triangle(&flat_triangle(1.0).with_colors([Rgba8::RED; 3]));
        p.pack_point(Vec3::Z, Some(Rgba8::BLUE));
    };
    let mut packager = MetafilePackager::default();
    packager.begin_writing();
    scene(&mut packager);
    let first = packager.complete_writing();
    packager.begin_writing();
    scene(&mut packager);
    let second = packager.complete_writing();

    assert_eq!(first, second);
}

#[test]
fn test_aligned_records_start_on_word_boundaries() {
    // --- 1. ARRANGE & ACT ---
    let file = record(PackagerSettings::default(), |p| {
        p.set_color(Rgba8::RED);
        p.set_selection_marker(SelectionMarker(3));
        p.pack_lines(&[Vec3::ZERO, Vec3::X], None);
        p.set_hlr(true);
        p.pack_triangle(&flat_triangle(0.0));
        p.pack_point(Vec3::Y, None);
    });

    // --- 2. ASSERT ---
    let word = file.word_size() as usize;
    let mut reader = StreamReader::new(file.stream());
    let mut aligned = 0;
    while let Some(command) = reader.read_command().unwrap() {
        if command.tag().is_aligned() {
            assert_eq!((reader.last_record_offset() + 1) % word, 0, "{command:?}");
            aligned += 1;
        }
    }
    assert!(aligned >= 6);
    assert_eq!(file.stats().bytes_written, file.stream().len() as u64);
}
