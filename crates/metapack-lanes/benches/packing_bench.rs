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

use criterion::{criterion_group, criterion_main, Criterion};
use metapack_core::math::{Rgba8, Vec3};
use metapack_core::metafile::{PackagerSettings, PointInlining, SelectionMarker};
use metapack_core::traits::{PrimitiveSink, Triangle};
use metapack_lanes::MetafilePackager;
use std::hint::black_box;

/// A hatch-like scene: many short polylines with interleaved fills and points.
fn hatch_scene(p: &mut MetafilePackager) {
    for i in 0..2_000u32 {
        let y = i as f32 * 0.01;
        p.set_selection_marker(SelectionMarker(u64::from(i / 100)));
        p.pack_polyline(&[Vec3::new(0.0, y, 0.0), Vec3::new(1.0, y, 0.0)], None);
        if i % 4 == 0 {
            p.pack_triangle(&Triangle::new(
                Vec3::new(0.0, y, 0.0),
                Vec3::new(1.0, y, 0.0),
                Vec3::new(0.5, y + 0.01, 0.0),
            ));
        }
        if i % 8 == 0 {
            p.pack_point(Vec3::new(0.5, y, 0.0), None);
        }
        if i % 250 == 0 {
            p.set_color(Rgba8::rgb((i / 250) as u8 * 20, 0, 0));
        }
    }
}

fn bench_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Metafile Packing");

    for mode in [PointInlining::Unopt, PointInlining::Opt, PointInlining::Sep] {
        let mut packager = MetafilePackager::new(PackagerSettings {
            point_mode: mode,
            ..Default::default()
        });
        group.bench_function(format!("Hatch scene ({mode:?})"), |b| {
            b.iter(|| {
                packager.begin_writing();
                hatch_scene(&mut packager);
                black_box(packager.complete_writing());
            });
        });
    }

    let mut packager = MetafilePackager::default();
    packager.begin_writing();
    hatch_scene(&mut packager);
    let file = packager.complete_writing();
    group.bench_function("Decode stream", |b| {
        b.iter(|| black_box(file.commands()));
    });

    group.finish();
}

criterion_group!(benches, bench_packing);
criterion_main!(benches);
