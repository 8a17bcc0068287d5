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

//! The traits snapshot used to decide whether two batches may be merged.

use super::state::{Attribute, CullMode, ShadingFlags};

/// A snapshot of the renderer configuration a batch requires.
///
/// Every field is tri-state: on, off, or unset ("don't care"). The boolean
/// sets are stored as an `(enabled, explicitly_set)` pair so that "off" and
/// "unset" never share a representation; a bit in `*_on` is meaningful only
/// where the matching bit in `*_set` is present.
///
/// Two snapshots are *compatible* if, for every field where both specify a
/// concrete value, the values agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TraitsOptions {
    attributes_on: Attribute,
    attributes_set: Attribute,
    shading_on: ShadingFlags,
    shading_set: ShadingFlags,
    cull: Option<CullMode>,
    hlr: Option<bool>,
}

impl TraitsOptions {
    /// A snapshot with every field unset.
    pub const UNSET: Self = Self {
        attributes_on: Attribute::EMPTY,
        attributes_set: Attribute::EMPTY,
        shading_on: ShadingFlags::EMPTY,
        shading_set: ShadingFlags::EMPTY,
        cull: None,
        hlr: None,
    };

    /// Returns `true` if no field carries a concrete value.
    pub fn is_unset(&self) -> bool {
        self.attributes_set.is_empty()
            && self.shading_set.is_empty()
            && self.cull.is_none()
            && self.hlr.is_none()
    }

    // --- Attributes ---

    /// Returns a copy with the given attribute(s) explicitly set to `on`.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute, on: bool) -> Self {
        self.set_attribute(attribute, on);
        self
    }

    /// Explicitly sets the given attribute(s) to `on`.
    pub fn set_attribute(&mut self, attribute: Attribute, on: bool) {
        self.attributes_set.insert(attribute);
        self.attributes_on.set(attribute, on);
    }

    /// Returns the tri-state value of a single attribute.
    pub fn attribute(&self, attribute: Attribute) -> Option<bool> {
        self.attributes_set
            .contains(attribute)
            .then_some(self.attributes_on.contains(attribute))
    }

    /// Returns the `(enabled, explicitly_set)` pair for all attributes.
    pub fn attributes(&self) -> (Attribute, Attribute) {
        (self.attributes_on & self.attributes_set, self.attributes_set)
    }

    // --- Shading ---

    /// Returns a copy with the given shading flag(s) explicitly set to `on`.
    #[must_use]
    pub fn with_shading(mut self, flags: ShadingFlags, on: bool) -> Self {
        self.shading_set.insert(flags);
        self.shading_on.set(flags, on);
        self
    }

    /// Returns the tri-state value of a single shading flag.
    pub fn shading(&self, flag: ShadingFlags) -> Option<bool> {
        self.shading_set
            .contains(flag)
            .then_some(self.shading_on.contains(flag))
    }

    /// Returns the `(enabled, explicitly_set)` pair for all shading flags.
    pub fn shading_flags(&self) -> (ShadingFlags, ShadingFlags) {
        (self.shading_on & self.shading_set, self.shading_set)
    }

    // --- Cull mode and hidden-line removal ---

    /// Returns a copy with an explicit cull mode.
    #[must_use]
    pub fn with_cull(mut self, cull: CullMode) -> Self {
        self.cull = Some(cull);
        self
    }

    /// Returns the cull mode, if set.
    pub fn cull(&self) -> Option<CullMode> {
        self.cull
    }

    /// Returns a copy with an explicit hidden-line-removal toggle.
    #[must_use]
    pub fn with_hlr(mut self, hlr: bool) -> Self {
        self.hlr = Some(hlr);
        self
    }

    /// Returns the hidden-line-removal toggle, if set.
    pub fn hlr(&self) -> Option<bool> {
        self.hlr
    }

    // --- Merging ---

    /// Returns `true` if no field is concretely specified by both snapshots with different values.
    pub fn is_compatible(&self, other: &TraitsOptions) -> bool {
        let attributes_both = self.attributes_set & other.attributes_set;
        let shading_both = self.shading_set & other.shading_set;
        ((self.attributes_on ^ other.attributes_on) & attributes_both).is_empty()
            && ((self.shading_on ^ other.shading_on) & shading_both).is_empty()
            && agree(self.cull, other.cull)
            && agree(self.hlr, other.hlr)
    }

    /// Combines two compatible snapshots into one carrying every concrete field of either.
    ///
    /// Returns `None` if the snapshots conflict.
    pub fn combine(&self, other: &TraitsOptions) -> Option<TraitsOptions> {
        if !self.is_compatible(other) {
            return None;
        }
        Some(TraitsOptions {
            attributes_on: (self.attributes_on & self.attributes_set)
                | (other.attributes_on & other.attributes_set),
            attributes_set: self.attributes_set | other.attributes_set,
            shading_on: (self.shading_on & self.shading_set) | (other.shading_on & other.shading_set),
            shading_set: self.shading_set | other.shading_set,
            cull: self.cull.or(other.cull),
            hlr: self.hlr.or(other.hlr),
        })
    }
}

fn agree<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}
