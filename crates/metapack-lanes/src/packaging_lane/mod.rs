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

//! Packaging lane - records immediate primitives into a metafile.
//!
//! The lane is organised around three staging slots (lines, triangles and
//! points), a cache of the state the replay target is known to be in, and a
//! flush engine that decides how pending batches are combined into draws.

mod delayed_mapping;
mod emitter;
mod entry;
mod flush;
mod packager;
mod point_entry;
mod state_cache;

pub use delayed_mapping::{DeferredRecord, DelayedMapping, TexCoordSlot};
pub use entry::PackageEntry;
pub use packager::MetafilePackager;
pub use point_entry::{HeldPoint, PointEntry};
pub use state_cache::{RendererState, StateChange};
