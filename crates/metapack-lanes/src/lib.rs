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

//! # Metapack Lanes
//!
//! The hot path of the packager. The [`packaging_lane`] turns immediate,
//! one-primitive-at-a-time calls into a compact [`Metafile`](metapack_data::Metafile);
//! the [`replay_lane`] walks a finished metafile and drives a
//! [`ReplayTarget`](metapack_core::traits::ReplayTarget).

#![warn(missing_docs)]

pub mod packaging_lane;
pub mod replay_lane;

pub use packaging_lane::{DelayedMapping, MetafilePackager, RendererState, StateChange};
pub use replay_lane::{replay, ReplaySummary};
