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

//! The renderer state cache.
//!
//! Tracks what the replay target is known to be configured with, so that a
//! state-change call only reaches the byte stream when it changes something.
//! A replay target is expected to start every metafile in
//! [`RendererState::default`].

use super::emitter::Emitter;
use metapack_core::math::Rgba8;
use metapack_core::metafile::{
    Attribute, Command, CullMode, LineStyle, LineWeight, SelectionFlags, SelectionMarker,
    ShadingFlags, TraitsOptions,
};

/// A single state-change request, as issued by a geometry producer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateChange {
    /// Set the active color.
    Color(Rgba8),
    /// Set the line weight.
    LineWeight(LineWeight),
    /// Set the line style.
    LineStyle(LineStyle),
    /// Set the face culling mode.
    CullMode(CullMode),
    /// Turn attribute(s) on or off.
    Attribute {
        /// The attribute flags to change.
        attribute: Attribute,
        /// The target value.
        on: bool,
    },
    /// Turn shading flag(s) on or off.
    Shading {
        /// The shading flags to change.
        flags: ShadingFlags,
        /// The target value.
        on: bool,
    },
    /// Turn hidden-line removal on or off.
    Hlr(bool),
    /// Set the selection flags.
    SelectionFlags(SelectionFlags),
}

/// The state the replay target is currently configured with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererState {
    color: Rgba8,
    line_weight: LineWeight,
    line_style: LineStyle,
    cull: CullMode,
    attributes: Attribute,
    shading: ShadingFlags,
    hlr: bool,
    selection_flags: SelectionFlags,
    marker: SelectionMarker,
}

impl Default for RendererState {
    fn default() -> Self {
        Self {
            color: Rgba8::WHITE,
            line_weight: LineWeight::default(),
            line_style: LineStyle::default(),
            cull: CullMode::None,
            attributes: Attribute::EMPTY,
            shading: ShadingFlags::EMPTY,
            hlr: false,
            selection_flags: SelectionFlags::EMPTY,
            marker: SelectionMarker::NONE,
        }
    }
}

impl RendererState {
    /// The active color.
    pub fn color(&self) -> Rgba8 {
        self.color
    }

    /// The active line weight.
    pub fn line_weight(&self) -> LineWeight {
        self.line_weight
    }

    /// The active line style.
    pub fn line_style(&self) -> LineStyle {
        self.line_style
    }

    /// The active culling mode.
    pub fn cull_mode(&self) -> CullMode {
        self.cull
    }

    /// The attributes currently on.
    pub fn attributes(&self) -> Attribute {
        self.attributes
    }

    /// The shading flags currently on.
    pub fn shading(&self) -> ShadingFlags {
        self.shading
    }

    /// Whether hidden-line removal is on.
    pub fn hlr(&self) -> bool {
        self.hlr
    }

    /// The active selection flags.
    pub fn selection_flags(&self) -> SelectionFlags {
        self.selection_flags
    }

    /// The selection marker attached to newly packed geometry.
    pub fn marker(&self) -> SelectionMarker {
        self.marker
    }

    /// Sets the selection marker. Returns `true` if it changed.
    ///
    /// Markers are recorded as selection marks inside batches, never as opcodes.
    pub fn set_marker(&mut self, marker: SelectionMarker) -> bool {
        std::mem::replace(&mut self.marker, marker) != marker
    }

    /// Returns `true` if applying `change` would alter the cached state.
    pub fn differs(&self, change: &StateChange) -> bool {
        match *change {
            StateChange::Color(color) => self.color != color,
            StateChange::LineWeight(weight) => self.line_weight != weight,
            StateChange::LineStyle(style) => self.line_style != style,
            StateChange::CullMode(mode) => self.cull != mode,
            StateChange::Attribute { attribute, on } => {
                !differing(self.attributes, attribute, on).is_empty()
            }
            StateChange::Shading { flags, on } => !differing(self.shading, flags, on).is_empty(),
            StateChange::Hlr(on) => self.hlr != on,
            StateChange::SelectionFlags(flags) => self.selection_flags != flags,
        }
    }

    /// Applies `change`, emitting the opcodes needed to bring the replay target along.
    pub(crate) fn apply(&mut self, change: StateChange, out: &mut Emitter) {
        match change {
            StateChange::Color(color) => {
                if self.color == color {
                    return;
                }
                let alpha_changed = self.color.a != color.a;
                self.color = color;
                out.emit(Command::SetColor(color));
                // Only an alpha change touches blending; RGB changes keep whatever was set.
                if alpha_changed {
                    self.apply(
                        StateChange::Attribute {
                            attribute: Attribute::BLENDING,
                            on: !color.is_opaque(),
                        },
                        out,
                    );
                }
            }
            StateChange::LineWeight(weight) => {
                if self.line_weight != weight {
                    self.line_weight = weight;
                    out.emit(Command::SetLineWeight(weight));
                }
            }
            StateChange::LineStyle(style) => {
                if self.line_style != style {
                    self.line_style = style;
                    out.emit(Command::SetLineStyle(style));
                }
            }
            StateChange::CullMode(mode) => {
                if self.cull != mode {
                    self.cull = mode;
                    out.emit(Command::SetCullMode(mode));
                }
            }
            StateChange::Attribute { attribute, on } => {
                let changed = differing(self.attributes, attribute, on);
                if !changed.is_empty() {
                    self.attributes.set(changed, on);
                    out.emit(Command::SetAttribute {
                        attribute: changed,
                        on,
                    });
                }
            }
            StateChange::Shading { flags, on } => {
                let changed = differing(self.shading, flags, on);
                if !changed.is_empty() {
                    self.shading.set(changed, on);
                    out.emit(Command::SetShading { flags: changed, on });
                }
            }
            StateChange::Hlr(on) => {
                if self.hlr != on {
                    self.hlr = on;
                    out.emit(Command::SetHlr(on));
                }
            }
            StateChange::SelectionFlags(flags) => {
                if self.selection_flags != flags {
                    self.selection_flags = flags;
                    out.emit(Command::SetSelectionFlags(flags));
                }
            }
        }
    }

    /// Brings every concrete field of `traits` into effect.
    pub(crate) fn apply_traits(&mut self, traits: &TraitsOptions, out: &mut Emitter) {
        let (on, set) = traits.attributes();
        self.apply(StateChange::Attribute { attribute: on, on: true }, out);
        self.apply(
            StateChange::Attribute {
                attribute: set & !on,
                on: false,
            },
            out,
        );

        let (on, set) = traits.shading_flags();
        self.apply(StateChange::Shading { flags: on, on: true }, out);
        self.apply(
            StateChange::Shading {
                flags: set & !on,
                on: false,
            },
            out,
        );

        if let Some(mode) = traits.cull() {
            self.apply(StateChange::CullMode(mode), out);
        }
        if let Some(hlr) = traits.hlr() {
            self.apply(StateChange::Hlr(hlr), out);
        }
    }

    /// Returns `true` if the current state already satisfies every concrete field of `traits`.
    pub fn satisfies(&self, traits: &TraitsOptions) -> bool {
        let (on, set) = traits.attributes();
        let (shading_on, shading_set) = traits.shading_flags();
        (self.attributes & set) == on
            && (self.shading & shading_set) == shading_on
            && traits.cull().is_none_or(|c| c == self.cull)
            && traits.hlr().is_none_or(|h| h == self.hlr)
    }
}

/// The flags of `requested` whose current value in `current` is not `on`.
fn differing<F>(current: F, requested: F, on: bool) -> F
where
    F: Copy + std::ops::BitAnd<Output = F> + std::ops::Not<Output = F>,
{
    if on {
        requested & !current
    } else {
        requested & current
    }
}
