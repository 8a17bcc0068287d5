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

//! The flush/merge engine.
//!
//! A flush turns the pending batches into draw sequences. Batches that can
//! share one array binding (same layout, same addressing, compatible traits)
//! are grouped: their arrays are laid out contiguously in physical order
//! lines, triangles, points, and drawn in the order triangles, lines, points.

use super::entry::PackageEntry;
use super::packager::MetafilePackager;
use metapack_core::error::ArrayError;
use metapack_core::metafile::{
    Addressing, ArrayBinding, ArrayId, Command, PointInlining, PrimitiveClass, SelectionMark,
    SelectionMarker, TraitsOptions,
};
use metapack_data::{ArrayElement, ArrayStore};

const PHYSICAL_ORDER: [PrimitiveClass; 3] = [
    PrimitiveClass::Lines,
    PrimitiveClass::Triangles,
    PrimitiveClass::Points,
];

const DRAW_ORDER: [PrimitiveClass; 3] = [
    PrimitiveClass::Triangles,
    PrimitiveClass::Lines,
    PrimitiveClass::Points,
];

/// The staging slots drawn from one array binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Group {
    lines: bool,
    triangles: bool,
    points: bool,
}

impl Group {
    fn of(class: PrimitiveClass) -> Self {
        let mut group = Self::default();
        group.insert(class);
        group
    }

    fn insert(&mut self, class: PrimitiveClass) {
        match class {
            PrimitiveClass::Lines => self.lines = true,
            PrimitiveClass::Triangles => self.triangles = true,
            PrimitiveClass::Points => self.points = true,
        }
    }

    fn contains(&self, class: PrimitiveClass) -> bool {
        match class {
            PrimitiveClass::Lines => self.lines,
            PrimitiveClass::Triangles => self.triangles,
            PrimitiveClass::Points => self.points,
        }
    }

    fn len(&self) -> usize {
        usize::from(self.lines) + usize::from(self.triangles) + usize::from(self.points)
    }

    fn members(self, order: [PrimitiveClass; 3]) -> impl Iterator<Item = PrimitiveClass> {
        order.into_iter().filter(move |c| self.contains(*c))
    }
}

impl MetafilePackager {
    pub(super) fn flush_staged(&mut self) {
        self.release_held_point();
        let groups = self.plan_groups();
        if groups.is_empty() {
            return;
        }
        self.out.stats.flushes += 1;
        for group in groups {
            self.emit_group(group);
        }
        self.staging.clear_batches(self.settings.reserve_threshold);
    }

    fn plan_groups(&self) -> Vec<Group> {
        let pending = |class| !self.staging.entry(class).is_empty();
        let mut groups = Vec::with_capacity(3);

        let lines = pending(PrimitiveClass::Lines);
        let triangles = pending(PrimitiveClass::Triangles);
        if lines
            && triangles
            && self.settings.merge_lines_and_triangles
            && self.joins(&Group::of(PrimitiveClass::Lines), PrimitiveClass::Triangles)
        {
            let mut group = Group::of(PrimitiveClass::Lines);
            group.insert(PrimitiveClass::Triangles);
            groups.push(group);
        } else {
            if triangles {
                groups.push(Group::of(PrimitiveClass::Triangles));
            }
            if lines {
                groups.push(Group::of(PrimitiveClass::Lines));
            }
        }

        if pending(PrimitiveClass::Points) {
            let joinable = self.settings.point_mode == PointInlining::Opt
                && groups
                    .last()
                    .is_some_and(|last| self.joins(last, PrimitiveClass::Points));
            match groups.last_mut() {
                Some(last) if joinable => last.insert(PrimitiveClass::Points),
                _ => groups.push(Group::of(PrimitiveClass::Points)),
            }
        }
        groups
    }

    /// Returns `true` if the batch of `class` can share `group`'s array binding.
    fn joins(&self, group: &Group, class: PrimitiveClass) -> bool {
        let candidate = self.staging.entry(class);
        let shape_matches = group.members(PHYSICAL_ORDER).all(|member| {
            let entry = self.staging.entry(member);
            entry.kind().layout() == candidate.kind().layout()
                && entry.kind().addressing() == candidate.kind().addressing()
        });
        shape_matches
            && self
                .group_traits(group)
                .is_some_and(|traits| traits.is_compatible(&candidate.output_traits()))
    }

    fn group_traits(&self, group: &Group) -> Option<TraitsOptions> {
        group
            .members(PHYSICAL_ORDER)
            .try_fold(TraitsOptions::UNSET, |acc, class| {
                acc.combine(&self.staging.entry(class).output_traits())
            })
    }

    fn emit_group(&mut self, group: Group) {
        // Members were checked for compatibility when the group was planned.
        let traits = self.group_traits(&group).unwrap_or_default();
        self.state.apply_traits(&traits, &mut self.out);

        let addressing = group
            .members(PHYSICAL_ORDER)
            .find_map(|class| self.staging.entry(class).kind().addressing());
        let result = match addressing {
            Some(Addressing::Array) => self.emit_array_group(group),
            Some(Addressing::Indexed) => self.emit_indexed_group(group),
            None => Ok(()),
        };
        if let Err(err) = result {
            log::error!("Flush could not lay out staged arrays: {err}");
        }
        if group.len() > 1 {
            self.out.stats.merged_flushes += 1;
        }
    }

    fn emit_array_group(&mut self, group: Group) -> Result<(), ArrayError> {
        let Self {
            staging,
            arrays,
            out,
            mapping,
            ..
        } = self;
        let members: Vec<(PrimitiveClass, &PackageEntry)> = group
            .members(PHYSICAL_ORDER)
            .map(|class| (class, staging.entry(class)))
            .collect();
        let layout = members
            .first()
            .and_then(|(_, entry)| entry.kind().layout())
            .unwrap_or_default();

        let (vertices, bases) = upload(arrays, members.iter().map(|(_, e)| e.positions()))?;
        let colors = if layout.colors {
            Some(upload(arrays, members.iter().map(|(_, e)| e.colors()))?.0)
        } else {
            None
        };
        let normals = if layout.normals {
            Some(upload(arrays, members.iter().map(|(_, e)| e.normals()))?.0)
        } else {
            None
        };
        let texcoords = if layout.texcoords {
            Some(upload(arrays, members.iter().map(|(_, e)| e.texcoords()))?.0)
        } else {
            None
        };
        let binding = ArrayBinding {
            vertices,
            colors,
            normals,
            texcoords,
        };
        out.stats.arrays_created += binding.layout().to_u8().count_ones() as u64 + 1;

        if let Some(texcoords) = texcoords {
            for ((_, entry), base) in members.iter().zip(&bases) {
                for slot in entry.deferred() {
                    mapping.store(slot.scope, slot.record, texcoords, base + slot.element);
                }
            }
        }

        out.emit(Command::EnableArrays(binding));
        if let Some(marks) = merged_marks(&members, &bases) {
            out.emit(Command::SelectionMarks(marks));
        }
        for class in DRAW_ORDER {
            if let Some(i) = members.iter().position(|(c, _)| *c == class) {
                out.emit(Command::DrawArrays {
                    class,
                    first: bases[i],
                    count: members[i].1.len(),
                });
            }
        }
        out.emit(Command::DisableArrays);

        log::debug!(
            "Flushed {} batch(es) from {vertices:?}: {}",
            members.len(),
            describe(&members)
        );
        Ok(())
    }

    fn emit_indexed_group(&mut self, group: Group) -> Result<(), ArrayError> {
        let Self {
            staging,
            arrays,
            out,
            pool,
            ..
        } = self;
        let Some(pool) = *pool else {
            log::warn!("Indexed batches pending without a vertex pool; dropped");
            return Ok(());
        };
        let members: Vec<(PrimitiveClass, &PackageEntry)> = group
            .members(PHYSICAL_ORDER)
            .map(|class| (class, staging.entry(class)))
            .collect();

        let (indices, bases) = upload(arrays, members.iter().map(|(_, e)| e.indices()))?;
        out.stats.arrays_created += 1;

        out.emit(Command::EnableArrays(pool.binding));
        if let Some(marks) = merged_marks(&members, &bases) {
            out.emit(Command::SelectionMarks(marks));
        }
        for class in DRAW_ORDER {
            if let Some(i) = members.iter().position(|(c, _)| *c == class) {
                out.emit(Command::DrawIndexed {
                    class,
                    indices,
                    first: bases[i],
                    count: members[i].1.len(),
                });
            }
        }
        out.emit(Command::DisableArrays);

        log::debug!(
            "Flushed {} indexed batch(es) through {indices:?}: {}",
            members.len(),
            describe(&members)
        );
        Ok(())
    }
}

/// Lays `parts` out contiguously in one new array. Returns the array and the
/// index at which each part starts.
fn upload<'a, T, I>(arrays: &mut ArrayStore, mut parts: I) -> Result<(ArrayId, Vec<u32>), ArrayError>
where
    T: ArrayElement + 'a,
    I: Iterator<Item = &'a [T]>,
{
    let id = arrays.append_slice(parts.next().unwrap_or_default());
    let mut bases = vec![0];
    for part in parts {
        bases.push(arrays.concat(id, part)?);
    }
    Ok((id, bases))
}

/// Concatenates the members' selection marks, rebased onto the combined array.
///
/// When a member that starts unmarked follows a marked one, a closing mark is
/// inserted at the boundary so the previous marker does not leak into it. A
/// mark that repeats the marker already open is dropped.
fn merged_marks(
    members: &[(PrimitiveClass, &PackageEntry)],
    bases: &[u32],
) -> Option<Vec<SelectionMark>> {
    let mut marks: Vec<SelectionMark> = Vec::new();
    for ((_, entry), &base) in members.iter().zip(bases) {
        let starts_marked = entry.marks().first().is_some_and(|m| m.offset == 0);
        if !starts_marked {
            push_mark(&mut marks, SelectionMark::new(SelectionMarker::NONE, base));
        }
        for mark in entry.marks() {
            push_mark(&mut marks, mark.rebased(base));
        }
    }
    (!marks.is_empty()).then_some(marks)
}

fn push_mark(marks: &mut Vec<SelectionMark>, mark: SelectionMark) {
    let open = marks.last().map_or(SelectionMarker::NONE, |m| m.marker);
    if open != mark.marker {
        marks.push(mark);
    }
}

fn describe(members: &[(PrimitiveClass, &PackageEntry)]) -> String {
    members
        .iter()
        .map(|(class, entry)| format!("{} {class}", entry.len()))
        .collect::<Vec<_>>()
        .join(", ")
}
