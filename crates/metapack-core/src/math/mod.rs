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

//! Provides the small set of mathematics primitives the packager needs.
//!
//! Positions, normals and texture coordinates travel through the packager as
//! plain `#[repr(C)]` vectors so that staged arrays can be handed to a replay
//! target (or written to a GPU buffer) without conversion.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

// --- Declare Sub-Modules ---

pub mod color;
pub mod geometry;
pub mod vector;

// --- Re-export Principal Types ---

pub use self::color::Rgba8;
pub use self::geometry::Aabb;
pub use self::vector::{Vec2, Vec3};

// --- Utility Functions ---

/// Clamps a value to a specified minimum and maximum range.
///
/// # Examples
///
/// ```
/// use metapack_core::math::clamp;
/// assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
/// assert_eq!(clamp(-1.0, 0.0, 1.0), 0.0);
/// assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
/// ```
#[inline]
pub fn clamp<T: PartialOrd>(value: T, min_val: T, max_val: T) -> T {
    if value < min_val {
        min_val
    } else if value > max_val {
        max_val
    } else {
        value
    }
}

/// Checks if two floating-point numbers are approximately equal within [`EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}
