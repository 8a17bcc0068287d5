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

//! The shared array store that draw records reference by [`ArrayId`].
//!
//! Arrays are append-only while a metafile is being recorded. The one exception
//! is texture coordinates resolved by a delayed mapping scope, which are patched
//! in place through [`ArrayStore::get_mut`].

use metapack_core::error::ArrayError;
use metapack_core::math::{Rgba8, Vec2, Vec3};
use metapack_core::metafile::ArrayId;

/// A typed, owned array of vertex or index data.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// Positions or normals.
    Vec3s(Vec<Vec3>),
    /// Texture coordinates.
    Vec2s(Vec<Vec2>),
    /// Per-vertex colors.
    Colors(Vec<Rgba8>),
    /// Vertex indices.
    Indices(Vec<u32>),
}

impl ArrayData {
    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Vec3s(v) => v.len(),
            ArrayData::Vec2s(v) => v.len(),
            ArrayData::Colors(v) => v.len(),
            ArrayData::Indices(v) => v.len(),
        }
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the name of the element type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ArrayData::Vec3s(_) => Vec3::TYPE_NAME,
            ArrayData::Vec2s(_) => Vec2::TYPE_NAME,
            ArrayData::Colors(_) => Rgba8::TYPE_NAME,
            ArrayData::Indices(_) => u32::TYPE_NAME,
        }
    }

    /// Returns the raw bytes of the array.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ArrayData::Vec3s(v) => bytemuck::cast_slice(v),
            ArrayData::Vec2s(v) => bytemuck::cast_slice(v),
            ArrayData::Colors(v) => bytemuck::cast_slice(v),
            ArrayData::Indices(v) => bytemuck::cast_slice(v),
        }
    }
}

/// An element type that can be stored in an [`ArrayStore`].
pub trait ArrayElement: bytemuck::Pod {
    /// Human-readable element type name.
    const TYPE_NAME: &'static str;

    /// Wraps a vector of this element type.
    fn wrap(data: Vec<Self>) -> ArrayData;

    /// Borrows the array as this element type, if it holds it.
    fn view(data: &ArrayData) -> Option<&[Self]>;

    /// Mutably borrows the array as this element type, if it holds it.
    fn view_mut(data: &mut ArrayData) -> Option<&mut Vec<Self>>;
}

macro_rules! impl_array_element {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl ArrayElement for $ty {
            const TYPE_NAME: &'static str = $name;

            fn wrap(data: Vec<Self>) -> ArrayData {
                ArrayData::$variant(data)
            }

            fn view(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn view_mut(data: &mut ArrayData) -> Option<&mut Vec<Self>> {
                match data {
                    ArrayData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_array_element!(Vec3, Vec3s, "Vec3");
impl_array_element!(Vec2, Vec2s, "Vec2");
impl_array_element!(Rgba8, Colors, "Rgba8");
impl_array_element!(u32, Indices, "u32");

/// Owns every array referenced by a metafile's draw records.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ArrayStore {
    arrays: Vec<ArrayData>,
}

impl ArrayStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `data` and returns its handle.
    pub fn append<T: ArrayElement>(&mut self, data: Vec<T>) -> ArrayId {
        let id = ArrayId(self.arrays.len() as u32);
        log::trace!(
            "ArrayStore: appended {} x {} as {:?}",
            data.len(),
            T::TYPE_NAME,
            id
        );
        self.arrays.push(T::wrap(data));
        id
    }

    /// Copies `data` into a new array and returns its handle.
    pub fn append_slice<T: ArrayElement>(&mut self, data: &[T]) -> ArrayId {
        self.append(data.to_vec())
    }

    /// Appends `data` to an existing array and returns the index of its first
    /// new element.
    pub fn concat<T: ArrayElement>(&mut self, id: ArrayId, data: &[T]) -> Result<u32, ArrayError> {
        let array = self.slot_mut(id)?;
        let found = array.type_name();
        let vec = T::view_mut(array).ok_or(ArrayError::TypeMismatch {
            id,
            expected: T::TYPE_NAME,
            found,
        })?;
        let base = vec.len() as u32;
        vec.extend_from_slice(data);
        Ok(base)
    }

    /// Borrows the array `id` as elements of type `T`.
    pub fn get<T: ArrayElement>(&self, id: ArrayId) -> Result<&[T], ArrayError> {
        let array = self
            .arrays
            .get(id.0 as usize)
            .ok_or(ArrayError::UnknownArray(id))?;
        T::view(array).ok_or(ArrayError::TypeMismatch {
            id,
            expected: T::TYPE_NAME,
            found: array.type_name(),
        })
    }

    /// Borrows `count` elements of array `id` starting at `first`.
    pub fn get_range<T: ArrayElement>(
        &self,
        id: ArrayId,
        first: u32,
        count: u32,
    ) -> Result<&[T], ArrayError> {
        let data = self.get::<T>(id)?;
        let start = first as usize;
        let end = start + count as usize;
        data.get(start..end).ok_or(ArrayError::OutOfBounds {
            id,
            end,
            len: data.len(),
        })
    }

    /// Mutably borrows the array `id` as elements of type `T`.
    pub fn get_mut<T: ArrayElement>(&mut self, id: ArrayId) -> Result<&mut [T], ArrayError> {
        let array = self.slot_mut(id)?;
        let found = array.type_name();
        T::view_mut(array)
            .map(Vec::as_mut_slice)
            .ok_or(ArrayError::TypeMismatch {
                id,
                expected: T::TYPE_NAME,
                found,
            })
    }

    /// Returns the untyped array `id`.
    pub fn data(&self, id: ArrayId) -> Option<&ArrayData> {
        self.arrays.get(id.0 as usize)
    }

    /// Returns the number of arrays.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Returns `true` if the store holds no arrays.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Returns the total number of elements across all arrays.
    pub fn element_count(&self) -> usize {
        self.arrays.iter().map(ArrayData::len).sum()
    }

    /// Returns the total payload size in bytes.
    pub fn total_bytes(&self) -> usize {
        self.arrays.iter().map(|a| a.as_bytes().len()).sum()
    }

    /// Iterates over `(handle, array)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ArrayId, &ArrayData)> {
        self.arrays
            .iter()
            .enumerate()
            .map(|(i, a)| (ArrayId(i as u32), a))
    }

    /// Drops every array. Previously issued handles become dangling.
    pub fn clear(&mut self) {
        self.arrays.clear();
    }

    fn slot_mut(&mut self, id: ArrayId) -> Result<&mut ArrayData, ArrayError> {
        self.arrays
            .get_mut(id.0 as usize)
            .ok_or(ArrayError::UnknownArray(id))
    }
}
