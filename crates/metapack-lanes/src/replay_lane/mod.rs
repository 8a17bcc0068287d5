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

//! Replay lane - drives a rendering backend from a recorded metafile.

use metapack_core::error::{ArrayError, MetafileError};
use metapack_core::math::{Rgba8, Vec2, Vec3};
use metapack_core::metafile::{ArrayBinding, ArrayId, Command};
use metapack_core::traits::{ReplayTarget, VertexArrays};
use metapack_data::{ArrayElement, ArrayStore, Metafile};

/// Counters gathered while replaying a metafile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Commands decoded, `End` included.
    pub commands: usize,
    /// State-change commands dispatched.
    pub state_changes: usize,
    /// Array bindings dispatched.
    pub array_binds: usize,
    /// Draw commands dispatched.
    pub draw_calls: usize,
    /// Vertices or indices consumed by draw commands.
    pub elements_drawn: u64,
}

/// Replays `metafile` into `target`, in recorded order.
///
/// Every array handle is resolved against the metafile's array store before
/// the target sees it. Replay stops at the `End` record or at the first error.
pub fn replay(
    metafile: &Metafile,
    target: &mut dyn ReplayTarget,
) -> Result<ReplaySummary, MetafileError> {
    let arrays = metafile.arrays();
    let mut summary = ReplaySummary::default();
    let mut bound: Option<(ArrayBinding, u32)> = None;

    for command in metafile.reader() {
        let command = command.inspect_err(|err| log::warn!("Replay stopped: {err}"))?;
        summary.commands += 1;
        if command.is_state_change() {
            summary.state_changes += 1;
        }

        match command {
            Command::SetColor(color) => target.set_color(color),
            Command::SetLineWeight(weight) => target.set_line_weight(weight),
            Command::SetLineStyle(style) => target.set_line_style(style),
            Command::SetCullMode(mode) => target.set_cull_mode(mode),
            Command::SetAttribute { attribute, on } => target.set_attribute(attribute, on),
            Command::SetShading { flags, on } => target.set_shading(flags, on),
            Command::SetHlr(on) => target.set_hlr(on),
            Command::SetSelectionFlags(flags) => target.set_selection_flags(flags),
            Command::SelectionMarks(marks) => target.selection_marks(&marks),
            Command::EnableArrays(binding) => {
                let vertices = resolve(arrays, &binding)?;
                let len = vertices.len() as u32;
                target.enable_arrays(&vertices);
                bound = Some((binding, len));
                summary.array_binds += 1;
            }
            Command::DisableArrays => {
                target.disable_arrays();
                bound = None;
            }
            Command::DrawArrays {
                class,
                first,
                count,
            } => {
                let (binding, len) = bound.ok_or(MetafileError::DrawWithoutArrays)?;
                let end = first as usize + count as usize;
                if end > len as usize {
                    return Err(ArrayError::OutOfBounds {
                        id: binding.vertices,
                        end,
                        len: len as usize,
                    }
                    .into());
                }
                target.draw_arrays(class, first..first + count);
                summary.draw_calls += 1;
                summary.elements_drawn += u64::from(count);
            }
            Command::DrawIndexed {
                class,
                indices,
                first,
                count,
            } => {
                let (binding, len) = bound.ok_or(MetafileError::DrawWithoutArrays)?;
                let slice = arrays.get_range::<u32>(indices, first, count)?;
                if let Some(&bad) = slice.iter().find(|&&i| i >= len) {
                    return Err(ArrayError::OutOfBounds {
                        id: binding.vertices,
                        end: bad as usize + 1,
                        len: len as usize,
                    }
                    .into());
                }
                target.draw_indexed(class, slice);
                summary.draw_calls += 1;
                summary.elements_drawn += u64::from(count);
            }
            Command::End => break,
        }
    }

    log::debug!(
        "Replayed {} commands: {} draw calls, {} state changes",
        summary.commands,
        summary.draw_calls,
        summary.state_changes
    );
    Ok(summary)
}

/// Borrows the arrays named by `binding`, checking every attribute against the position count.
fn resolve<'a>(
    arrays: &'a ArrayStore,
    binding: &ArrayBinding,
) -> Result<VertexArrays<'a>, ArrayError> {
    let positions = arrays.get::<Vec3>(binding.vertices)?;
    let len = positions.len();
    Ok(VertexArrays {
        positions,
        colors: attribute::<Rgba8>(arrays, binding.colors, len)?,
        normals: attribute::<Vec3>(arrays, binding.normals, len)?,
        texcoords: attribute::<Vec2>(arrays, binding.texcoords, len)?,
    })
}

fn attribute<T: ArrayElement>(
    arrays: &ArrayStore,
    id: Option<ArrayId>,
    len: usize,
) -> Result<Option<&[T]>, ArrayError> {
    id.map(|id| arrays.get_range::<T>(id, 0, len as u32))
        .transpose()
}
