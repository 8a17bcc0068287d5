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

//! Per-session statistics gathered while packaging.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Counters describing what a packaging session emitted and what it avoided emitting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackStats {
    /// Primitives accepted through the submission API.
    pub primitives_packed: u64,
    /// State-change commands written to the stream.
    pub state_changes_emitted: u64,
    /// State-change requests that matched the cached state and were dropped.
    pub state_changes_elided: u64,
    /// Flushes that emitted at least one draw.
    pub flushes: u64,
    /// Flushes that drew lines and triangles from one shared array binding.
    pub merged_flushes: u64,
    /// Array bindings (`EnableArrays`) written.
    pub array_binds: u64,
    /// Draw commands written.
    pub draw_calls: u64,
    /// Points dropped because an adjacent line made them redundant.
    pub points_folded: u64,
    /// Points rewritten as zero-length line segments.
    pub points_inlined: u64,
    /// Arrays created in the array store.
    pub arrays_created: u64,
    /// Bytes written to the stream.
    pub bytes_written: u64,
}

impl AddAssign<&PackStats> for PackStats {
    fn add_assign(&mut self, rhs: &PackStats) {
        self.primitives_packed += rhs.primitives_packed;
        self.state_changes_emitted += rhs.state_changes_emitted;
        self.state_changes_elided += rhs.state_changes_elided;
        self.flushes += rhs.flushes;
        self.merged_flushes += rhs.merged_flushes;
        self.array_binds += rhs.array_binds;
        self.draw_calls += rhs.draw_calls;
        self.points_folded += rhs.points_folded;
        self.points_inlined += rhs.points_inlined;
        self.arrays_created += rhs.arrays_created;
        self.bytes_written += rhs.bytes_written;
    }
}
