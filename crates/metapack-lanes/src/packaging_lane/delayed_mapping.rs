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

//! Delayed texture-coordinate mapping.
//!
//! Triangles packed with [`TexCoords::Deferred`](metapack_core::traits::TexCoords)
//! reserve a texture-coordinate triple whose values are only known later. Each
//! open [`DelayedMapping`] scope records those triples; resolving the scope
//! writes the computed coordinates straight into the array store, wherever the
//! flush engine ended up placing them.

use super::packager::MetafilePackager;
use metapack_core::error::ArrayError;
use metapack_core::math::{Vec2, Vec3};
use metapack_core::metafile::ArrayId;
use std::ops::{Deref, DerefMut};

/// Where a deferred texture-coordinate triple currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexCoordSlot {
    /// Still in a staging slot; patched when the slot is flushed.
    Staged,
    /// Written to the array store.
    Stored {
        /// The texture-coordinate array.
        array: ArrayId,
        /// Index of the triangle's first corner in that array.
        element: u32,
    },
}

/// One triangle awaiting texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeferredRecord {
    /// The triangle corners, handed to the mapper on resolution.
    pub positions: [Vec3; 3],
    /// Where its texture coordinates are.
    pub slot: TexCoordSlot,
}

/// The stack of open mapping scopes.
#[derive(Debug, Default)]
pub(crate) struct DelayedMappingCache {
    scopes: Vec<Vec<DeferredRecord>>,
}

impl DelayedMappingCache {
    pub(crate) fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub(crate) fn push_scope(&mut self) -> usize {
        self.scopes.push(Vec::new());
        self.scopes.len() - 1
    }

    /// Records a triangle in the innermost scope, returning `(scope, record)`.
    pub(crate) fn record(&mut self, positions: [Vec3; 3]) -> Option<(usize, usize)> {
        let scope = self.scopes.len().checked_sub(1)?;
        let records = &mut self.scopes[scope];
        records.push(DeferredRecord {
            positions,
            slot: TexCoordSlot::Staged,
        });
        Some((scope, records.len() - 1))
    }

    pub(crate) fn store(&mut self, scope: usize, record: usize, array: ArrayId, element: u32) {
        if let Some(r) = self.scopes.get_mut(scope).and_then(|s| s.get_mut(record)) {
            r.slot = TexCoordSlot::Stored { array, element };
        }
    }

    pub(crate) fn pop_scope(&mut self) -> Vec<DeferredRecord> {
        self.scopes.pop().unwrap_or_default()
    }

    pub(crate) fn clear(&mut self) {
        self.scopes.clear();
    }
}

/// An open delayed-mapping scope.
///
/// The guard dereferences to the packager, so geometry is packed through it.
/// Scopes nest: opening a new scope from a guard borrows that guard until the
/// inner scope is resolved. A guard dropped without [`resolve`](Self::resolve)
/// resolves its triangles with zero coordinates.
pub struct DelayedMapping<'a> {
    packager: &'a mut MetafilePackager,
    depth: usize,
    resolved: bool,
}

impl<'a> DelayedMapping<'a> {
    pub(crate) fn open(packager: &'a mut MetafilePackager) -> Self {
        let depth = packager.mapping.push_scope();
        log::debug!("Opened delayed mapping scope at depth {depth}");
        Self {
            packager,
            depth,
            resolved: false,
        }
    }

    /// The nesting depth of this scope, starting at zero.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Flushes pending geometry and writes `mapper`'s coordinates for every
    /// triangle recorded in this scope. Returns the number of triangles resolved.
    pub fn resolve<F>(mut self, mapper: F) -> Result<usize, ArrayError>
    where
        F: FnMut(&[Vec3; 3]) -> [Vec2; 3],
    {
        self.finish(mapper)
    }

    fn finish<F>(&mut self, mut mapper: F) -> Result<usize, ArrayError>
    where
        F: FnMut(&[Vec3; 3]) -> [Vec2; 3],
    {
        self.resolved = true;
        if self.packager.mapping.depth() <= self.depth {
            // The session ended while the scope was open and took the scope with it.
            log::warn!(
                "Delayed mapping scope at depth {} outlived its session; nothing to resolve",
                self.depth
            );
            return Ok(0);
        }
        self.packager.flush();
        debug_assert_eq!(
            self.packager.mapping.depth(),
            self.depth + 1,
            "delayed mapping scopes resolved out of order"
        );
        let records = self.packager.mapping.pop_scope();

        let mut resolved = 0;
        for record in &records {
            let TexCoordSlot::Stored { array, element } = record.slot else {
                log::warn!("Deferred triangle was never flushed; skipping");
                continue;
            };
            let coords = mapper(&record.positions);
            let data = self.packager.arrays.get_mut::<Vec2>(array)?;
            let start = element as usize;
            let len = data.len();
            let target = data
                .get_mut(start..start + 3)
                .ok_or(ArrayError::OutOfBounds {
                    id: array,
                    end: start + 3,
                    len,
                })?;
            target.copy_from_slice(&coords);
            resolved += 1;
        }
        log::debug!(
            "Resolved delayed mapping scope at depth {}: {resolved} triangles",
            self.depth
        );
        Ok(resolved)
    }
}

impl Deref for DelayedMapping<'_> {
    type Target = MetafilePackager;

    fn deref(&self) -> &MetafilePackager {
        self.packager
    }
}

impl DerefMut for DelayedMapping<'_> {
    fn deref_mut(&mut self) -> &mut MetafilePackager {
        self.packager
    }
}

impl Drop for DelayedMapping<'_> {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        log::warn!(
            "Delayed mapping scope at depth {} dropped unresolved; using zero coordinates",
            self.depth
        );
        if let Err(err) = self.finish(|_| [Vec2::ZERO; 3]) {
            log::warn!("Failed to resolve dropped delayed mapping scope: {err}");
        }
    }
}
