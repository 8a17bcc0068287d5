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

use super::VertexArrays;
use crate::math::Rgba8;
use crate::metafile::{
    Attribute, CullMode, LineStyle, LineWeight, PrimitiveClass, SelectionFlags, SelectionMark,
    ShadingFlags,
};
use std::ops::Range;

/// A rendering backend that consumes a recorded metafile.
///
/// The replay driver decodes the command stream and calls these methods in
/// recorded order. Array handles are resolved before the call, so an
/// implementation only ever sees borrowed slices.
pub trait ReplayTarget {
    /// Sets the active color.
    fn set_color(&mut self, color: Rgba8);

    /// Sets the line weight.
    fn set_line_weight(&mut self, weight: LineWeight);

    /// Sets the line style.
    fn set_line_style(&mut self, style: LineStyle);

    /// Sets the face culling mode.
    fn set_cull_mode(&mut self, mode: CullMode);

    /// Turns renderer attribute(s) on or off.
    fn set_attribute(&mut self, attribute: Attribute, on: bool);

    /// Turns shading flag(s) on or off.
    fn set_shading(&mut self, flags: ShadingFlags, on: bool);

    /// Turns hidden-line removal on or off.
    fn set_hlr(&mut self, on: bool);

    /// Sets the selection flags for subsequent draws.
    fn set_selection_flags(&mut self, flags: SelectionFlags);

    /// Receives the selection marks for the draws that follow.
    fn selection_marks(&mut self, marks: &[SelectionMark]);

    /// Binds vertex arrays for the draws that follow.
    fn enable_arrays(&mut self, arrays: &VertexArrays<'_>);

    /// Releases the bound vertex arrays.
    fn disable_arrays(&mut self);

    /// Draws a range of the bound vertices.
    fn draw_arrays(&mut self, class: PrimitiveClass, vertices: Range<u32>);

    /// Draws the bound vertices through a slice of indices.
    fn draw_indexed(&mut self, class: PrimitiveClass, indices: &[u32]);
}
