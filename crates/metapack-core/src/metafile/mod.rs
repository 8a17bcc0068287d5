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

//! The metafile vocabulary: primitive kinds, renderer state values, the traits
//! snapshot used for merge decisions, the recorded command model, settings and
//! statistics.

pub mod command;
pub mod kind;
pub mod settings;
pub mod state;
pub mod stats;
pub mod traits_options;

pub use self::command::{ArrayBinding, ArrayId, Command, OpcodeTag};
pub use self::kind::{Addressing, PackageKind, PrimitiveClass, VertexLayout};
pub use self::settings::{PackagerSettings, PointFoldPolicy, PointInlining};
pub use self::state::{
    Attribute, CullMode, LineCap, LineJoin, LineStyle, LineWeight, SelectionFlags, SelectionMark,
    SelectionMarker, ShadingFlags,
};
pub use self::stats::PackStats;
pub use self::traits_options::TraitsOptions;
