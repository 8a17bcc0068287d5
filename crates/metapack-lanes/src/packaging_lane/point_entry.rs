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

//! The point staging slot.
//!
//! Points interact with line batches: depending on the inlining mode a point
//! can be folded away, rewritten as a degenerate segment, or drawn after the
//! lines it accompanies. The slot therefore carries a one-point hold buffer in
//! addition to its batch.

use super::entry::PackageEntry;
use metapack_core::math::{Rgba8, Vec3};
use metapack_core::metafile::{PointFoldPolicy, SelectionMarker};

/// A point held back to see whether a line absorbs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldPoint {
    /// The point position.
    pub position: Vec3,
    /// The point color, if it carries one.
    pub color: Option<Rgba8>,
    /// The selection marker active when the point was submitted.
    pub marker: SelectionMarker,
}

impl HeldPoint {
    /// Returns `true` if a line made of `segments` makes this point redundant.
    pub fn folds_into(&self, segments: &[Vec3], policy: PointFoldPolicy) -> bool {
        match policy {
            PointFoldPolicy::Adjacent => !segments.is_empty(),
            PointFoldPolicy::Coincident { tolerance } => {
                let limit = tolerance * tolerance;
                segments
                    .iter()
                    .any(|p| (*p - self.position).length_squared() <= limit)
            }
        }
    }
}

/// Staging for point primitives.
#[derive(Debug, Default)]
pub struct PointEntry {
    batch: PackageEntry,
    held: Option<HeldPoint>,
}

impl PointEntry {
    /// Creates an empty point slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The staged point batch.
    pub fn batch(&self) -> &PackageEntry {
        &self.batch
    }

    /// Mutable access to the staged point batch.
    pub fn batch_mut(&mut self) -> &mut PackageEntry {
        &mut self.batch
    }

    /// The point currently held back, if any.
    pub fn held(&self) -> Option<&HeldPoint> {
        self.held.as_ref()
    }

    /// Holds `point`, returning the point it displaces.
    pub fn hold(&mut self, point: HeldPoint) -> Option<HeldPoint> {
        self.held.replace(point)
    }

    /// Takes the held point out of the hold buffer.
    pub fn take_held(&mut self) -> Option<HeldPoint> {
        self.held.take()
    }

    /// Returns `true` if neither a batch nor a held point is pending.
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty() && self.held.is_none()
    }

    /// Drops the held point and resets the batch.
    pub fn clear(&mut self, reserve: usize) {
        self.held = None;
        self.batch.clear(reserve);
    }
}
