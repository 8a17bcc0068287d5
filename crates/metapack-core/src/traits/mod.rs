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

//! Defines the two contracts at the boundary of the packager.
//!
//! [`PrimitiveSink`] is what a geometry producer (a tessellator walking a CAD
//! document) talks to. [`ReplayTarget`] is what a rendering backend implements
//! to receive a recorded metafile.

pub mod primitive_sink;
pub mod replay_target;

pub use self::primitive_sink::{PrimitiveSink, TexCoords, Triangle, VertexArrays};
pub use self::replay_target::ReplayTarget;
