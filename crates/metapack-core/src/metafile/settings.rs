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

//! Configuration of a metafile packager.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};

/// How point primitives interact with line batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointInlining {
    /// Points are staged and flushed as their own batches, in submission order.
    Unopt,
    /// A lone point is held back one step; if a line follows it is folded away,
    /// otherwise it is staged and drawn after the associated lines.
    #[default]
    Opt,
    /// Points are rewritten as zero-length line segments and join the line batch.
    High,
    /// Points accumulate in a separate array drawn after the combined line/triangle draw.
    Sep,
}

/// When a held-back point counts as redundant in [`PointInlining::Opt`] mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PointFoldPolicy {
    /// Any line submitted immediately after the point absorbs it.
    #[default]
    Adjacent,
    /// The point is absorbed only if the following line passes through one of
    /// its endpoints within `tolerance` model units.
    Coincident {
        /// Maximum distance between the point and a line endpoint.
        tolerance: f32,
    },
}

/// Settings that control how a packager batches and encodes geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagerSettings {
    /// The point-inlining policy.
    pub point_mode: PointInlining,
    /// The redundancy test for held-back points.
    pub point_fold: PointFoldPolicy,
    /// If `true`, compatible line and triangle batches share one array binding.
    pub merge_lines_and_triangles: bool,
    /// Alignment, in bytes, of array-lifecycle and draw operand blocks. `1` disables padding.
    pub word_size: u32,
    /// Element capacity each staging array keeps after a flush.
    pub reserve_threshold: usize,
    /// If `true`, the bounding box of all packed vertices is tracked.
    pub track_extents: bool,
}

impl Default for PackagerSettings {
    fn default() -> Self {
        Self {
            point_mode: PointInlining::Opt,
            point_fold: PointFoldPolicy::Adjacent,
            merge_lines_and_triangles: true,
            word_size: 8,
            reserve_threshold: 4096,
            track_extents: true,
        }
    }
}

impl PackagerSettings {
    /// Parses settings from JSON. Missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: PackagerSettings =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Checks the settings for values the packager cannot honor.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.word_size == 0 || !self.word_size.is_power_of_two() {
            return Err(SettingsError::InvalidWordSize(self.word_size));
        }
        if let PointFoldPolicy::Coincident { tolerance } = self.point_fold {
            if tolerance.is_nan() || tolerance < 0.0 {
                return Err(SettingsError::InvalidTolerance(tolerance));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PackagerSettings::default();
        assert_eq!(settings.point_mode, PointInlining::Opt);
        assert_eq!(settings.word_size, 8);
        assert!(settings.merge_lines_and_triangles);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = PackagerSettings::from_json_str(r#"{ "point_mode": "Sep", "word_size": 4 }"#)
            .expect("valid settings");
        assert_eq!(settings.point_mode, PointInlining::Sep);
        assert_eq!(settings.word_size, 4);
        assert_eq!(settings.reserve_threshold, 4096);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = PackagerSettings {
            point_fold: PointFoldPolicy::Coincident { tolerance: 0.5 },
            ..Default::default()
        };
        let json = settings.to_json_string().unwrap();
        assert_eq!(PackagerSettings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_word_size_is_rejected() {
        let err = PackagerSettings::from_json_str(r#"{ "word_size": 6 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidWordSize(6)));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = PackagerSettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
