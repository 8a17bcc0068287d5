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

//! Defines the `Rgba8` color type used for the active color and per-vertex colors.

use serde::{Deserialize, Serialize};

/// Represents an 8-bit-per-channel RGBA color.
///
/// CAD documents specify colors as byte triples plus a transparency byte, and
/// the replay format keeps them that way. An alpha of `255` is fully opaque;
/// any other alpha means the geometry drawn with it needs blending.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Rgba8 {
    /// The red component.
    pub r: u8,
    /// The green component.
    pub g: u8,
    /// The blue component.
    pub b: u8,
    /// The alpha (opacity) component.
    pub a: u8,
}

impl Rgba8 {
    // --- Common Color Constants ---

    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Creates a new `Rgba8` with explicit RGBA values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a new opaque `Rgba8` (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Returns `true` if the color is fully opaque.
    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Returns a new color with the same RGB components but a different alpha.
    #[inline]
    pub const fn with_alpha(&self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Packs the color into a little-endian `u32` (`r` in the low byte).
    #[inline]
    pub const fn to_u32(&self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpacks a color previously packed with [`Rgba8::to_u32`].
    #[inline]
    pub const fn from_u32(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_le_bytes();
        Self { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity() {
        assert!(Rgba8::RED.is_opaque());
        assert!(!Rgba8::RED.with_alpha(128).is_opaque());
    }

    #[test]
    fn test_u32_packing_is_lossless() {
        let c = Rgba8::new(1, 2, 3, 4);
        assert_eq!(c.to_u32(), 0x0403_0201);
        assert_eq!(Rgba8::from_u32(c.to_u32()), c);
    }
}
