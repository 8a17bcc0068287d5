use anyhow::Context;
use metapack_core::math::{Rgba8, Vec3};
use metapack_core::metafile::{
    Attribute, CullMode, LineStyle, LineWeight, PackagerSettings, PrimitiveClass, SelectionFlags,
    SelectionMark, SelectionMarker, ShadingFlags,
};
use metapack_core::traits::{PrimitiveSink, ReplayTarget, Triangle, VertexArrays};
use metapack_lanes::{replay, MetafilePackager};
use metapack_telemetry::{logging, PackTelemetry};
use std::ops::Range;

/// Replay target that logs every call it receives.
#[derive(Default)]
struct LoggingTarget {
    vertices_drawn: u64,
}

impl ReplayTarget for LoggingTarget {
    fn set_color(&mut self, color: Rgba8) {
        log::debug!("color {color:?}");
    }
    fn set_line_weight(&mut self, weight: LineWeight) {
        log::debug!("line weight {weight:?}");
    }
    fn set_line_style(&mut self, style: LineStyle) {
        log::debug!("line style {style:?}");
    }
    fn set_cull_mode(&mut self, mode: CullMode) {
        log::debug!("cull {mode:?}");
    }
    fn set_attribute(&mut self, attribute: Attribute, on: bool) {
        log::debug!("attribute {attribute:?} = {on}");
    }
    fn set_shading(&mut self, flags: ShadingFlags, on: bool) {
        log::debug!("shading {flags:?} = {on}");
    }
    fn set_hlr(&mut self, on: bool) {
        log::debug!("hlr = {on}");
    }
    fn set_selection_flags(&mut self, flags: SelectionFlags) {
        log::debug!("selection flags {flags:?}");
    }
    fn selection_marks(&mut self, marks: &[SelectionMark]) {
        log::debug!("{} selection marks", marks.len());
    }
    fn enable_arrays(&mut self, arrays: &VertexArrays<'_>) {
        log::debug!("bind {} vertices ({:?})", arrays.len(), arrays.layout());
    }
    fn disable_arrays(&mut self) {
        log::debug!("unbind");
    }
    fn draw_arrays(&mut self, class: PrimitiveClass, vertices: Range<u32>) {
        log::debug!("draw {class:?} {vertices:?}");
        self.vertices_drawn += u64::from(vertices.end - vertices.start);
    }
    fn draw_indexed(&mut self, class: PrimitiveClass, indices: &[u32]) {
        log::debug!("draw indexed {class:?} x{}", indices.len());
        self.vertices_drawn += indices.len() as u64;
    }
}

/// A small drawing: a framed part with a hatched face, dimension ticks and a shaded bolt.
fn record_part(sink: &mut dyn PrimitiveSink) {
    sink.set_color(Rgba8::rgb(30, 30, 30));
    sink.set_line_weight(LineWeight::Pixels(2));
    sink.set_selection_marker(SelectionMarker(1));
    sink.pack_polyline(
        &[
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(4.0, 2.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::ZERO,
        ],
        None,
    );

    sink.set_selection_marker(SelectionMarker(2));
    sink.set_line_weight(LineWeight::default());
    let hatch: Vec<Vec3> = (1..8)
        .flat_map(|i| {
            let x = i as f32 * 0.5;
            [Vec3::new(x, 0.0, 0.0), Vec3::new(x - 0.5, 2.0, 0.0)]
        })
        .collect();
    sink.pack_lines(&hatch, None);

    sink.set_selection_marker(SelectionMarker(3));
    sink.set_color(Rgba8::RED);
    for x in [0.0, 4.0] {
        sink.pack_point(Vec3::new(x, -0.5, 0.0), None);
        sink.pack_polyline(&[Vec3::new(x, -0.5, 0.0), Vec3::new(x, -1.0, 0.0)], None);
    }

    sink.set_selection_marker(SelectionMarker(4));
    sink.set_color(Rgba8::rgb(120, 120, 140));
    sink.set_cull_mode(CullMode::Back);
    let bolt = [
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(1.5, 1.0, 0.0),
        Vec3::new(1.5, 1.5, 0.0),
        Vec3::new(1.0, 1.5, 0.0),
    ];
    let normals = [Vec3::Z; 4];
    sink.set_vertex_pool(VertexArrays {
        normals: Some(&normals),
        ..VertexArrays::positions(&bolt)
    });
    sink.pack_indexed_triangles(&[0, 1, 2, 0, 2, 3]);

    sink.set_selection_marker(SelectionMarker(5));
    sink.set_color(Rgba8::BLUE.with_alpha(128));
    sink.pack_triangle(&Triangle::new(
        Vec3::new(2.5, 0.5, 0.0),
        Vec3::new(3.5, 0.5, 0.0),
        Vec3::new(3.0, 1.5, 0.0),
    ));
}

fn main() -> anyhow::Result<()> {
    logging::init()?;

    let settings = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file '{path}'"))?;
            PackagerSettings::from_json_str(&json)
                .with_context(|| format!("Invalid settings in '{path}'"))?
        }
        None => PackagerSettings::default(),
    };
    log::info!("Packaging with {settings:?}");

    let telemetry = PackTelemetry::new()?;
    let mut packager = MetafilePackager::new(settings);

    for pass in 0..2 {
        packager.begin_writing();
        record_part(&mut packager);
        let metafile = packager.complete_writing();
        telemetry.publish(metafile.stats())?;

        let mut target = LoggingTarget::default();
        let summary = replay(&metafile, &mut target)?;
        log::info!(
            "Pass {pass}: {} commands, {} draws, {} vertices drawn, extents {:?}",
            summary.commands,
            summary.draw_calls,
            target.vertices_drawn,
            metafile.extents()
        );
    }

    let totals = telemetry.totals()?;
    println!("{}", serde_json::to_string_pretty(&totals)?);
    Ok(())
}
