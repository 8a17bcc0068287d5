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

//! # Metapack Core
//!
//! Foundational crate containing value types, the recorded command model, and
//! the interface contracts that sit on either side of the metafile packager:
//! [`PrimitiveSink`](traits::PrimitiveSink) for the geometry producer feeding it
//! and [`ReplayTarget`](traits::ReplayTarget) for the renderer consuming its output.

#![warn(missing_docs)]

pub mod error;
pub mod math;
pub mod metafile;
pub mod traits;
pub mod utils;

pub use error::{ArrayError, MetafileError, SettingsError, StreamError};
pub use metafile::{PackStats, PackagerSettings};
