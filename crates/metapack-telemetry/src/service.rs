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

//! Publishes packaging statistics into a metrics registry.

use crate::metrics::registry::{CounterHandle, GaugeHandle, MetricsRegistry};
use crate::metrics::MetricsResult;
use metapack_core::PackStats;

/// Namespace under which packaging metrics are registered.
pub const NAMESPACE: &str = "metapack";

/// Counter names paired with their descriptions, in [`stat_values`] order.
const COUNTERS: [(&str, &str); 11] = [
    ("primitives_packed", "Primitives accepted by the packager"),
    ("state_changes_emitted", "State-change commands written"),
    ("state_changes_elided", "Redundant state changes dropped"),
    ("flushes", "Flushes that drew something"),
    ("merged_flushes", "Flushes drawing lines and triangles from one binding"),
    ("array_binds", "Array bindings written"),
    ("draw_calls", "Draw commands written"),
    ("points_folded", "Points dropped next to an adjacent line"),
    ("points_inlined", "Points rewritten as zero-length segments"),
    ("arrays_created", "Arrays created in the array store"),
    ("bytes_written", "Stream bytes written"),
];

fn stat_values(stats: &PackStats) -> [u64; 11] {
    [
        stats.primitives_packed,
        stats.state_changes_emitted,
        stats.state_changes_elided,
        stats.flushes,
        stats.merged_flushes,
        stats.array_binds,
        stats.draw_calls,
        stats.points_folded,
        stats.points_inlined,
        stats.arrays_created,
        stats.bytes_written,
    ]
}

/// Accumulates [`PackStats`] from completed sessions.
#[derive(Debug)]
pub struct PackTelemetry {
    registry: MetricsRegistry,
    sessions: CounterHandle,
    counters: Vec<CounterHandle>,
    last_stream_bytes: GaugeHandle,
}

impl PackTelemetry {
    /// Registers the packaging metrics in a fresh in-memory registry.
    pub fn new() -> MetricsResult<Self> {
        Self::with_registry(MetricsRegistry::new())
    }

    /// Registers the packaging metrics in `registry`.
    pub fn with_registry(registry: MetricsRegistry) -> MetricsResult<Self> {
        let sessions =
            registry.register_counter(NAMESPACE, "sessions", "Completed packaging sessions")?;
        let counters = COUNTERS
            .iter()
            .map(|(name, description)| registry.register_counter(NAMESPACE, *name, *description))
            .collect::<MetricsResult<Vec<_>>>()?;
        let last_stream_bytes = registry.register_gauge(
            NAMESPACE,
            "last_stream_bytes",
            "Size of the most recent session's stream",
            "bytes",
        )?;
        Ok(Self {
            registry,
            sessions,
            counters,
            last_stream_bytes,
        })
    }

    /// Adds one session's statistics to the running totals.
    pub fn publish(&self, stats: &PackStats) -> MetricsResult<()> {
        let sessions = self.sessions.increment()?;
        for (counter, value) in self.counters.iter().zip(stat_values(stats)) {
            counter.increment_by(value)?;
        }
        self.last_stream_bytes.set(stats.bytes_written as f64)?;
        log::debug!(
            "Published session #{sessions}: {} draws, {} state changes, {} bytes.",
            stats.draw_calls,
            stats.state_changes_emitted,
            stats.bytes_written
        );
        Ok(())
    }

    /// Reads the accumulated totals back as a [`PackStats`].
    pub fn totals(&self) -> MetricsResult<PackStats> {
        let mut values = [0u64; 11];
        for (slot, counter) in values.iter_mut().zip(&self.counters) {
            *slot = counter.get()?;
        }
        let [
            primitives_packed,
            state_changes_emitted,
            state_changes_elided,
            flushes,
            merged_flushes,
            array_binds,
            draw_calls,
            points_folded,
            points_inlined,
            arrays_created,
            bytes_written,
        ] = values;
        Ok(PackStats {
            primitives_packed,
            state_changes_emitted,
            state_changes_elided,
            flushes,
            merged_flushes,
            array_binds,
            draw_calls,
            points_folded,
            points_inlined,
            arrays_created,
            bytes_written,
        })
    }

    /// Number of sessions published so far.
    pub fn sessions(&self) -> MetricsResult<u64> {
        self.sessions.get()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricId;

    fn session(draws: u64, bytes: u64) -> PackStats {
        PackStats {
            draw_calls: draws,
            flushes: 1,
            bytes_written: bytes,
            ..Default::default()
        }
    }

    #[test]
    fn test_publish_accumulates_totals() {
        let telemetry = PackTelemetry::new().unwrap();
        telemetry.publish(&session(3, 100)).unwrap();
        telemetry.publish(&session(2, 40)).unwrap();

        let mut expected = session(3, 100);
        expected += &session(2, 40);
        assert_eq!(telemetry.totals().unwrap(), expected);
        assert_eq!(telemetry.sessions().unwrap(), 2);
    }

    #[test]
    fn test_gauge_tracks_last_session() {
        let telemetry = PackTelemetry::new().unwrap();
        telemetry.publish(&session(1, 64)).unwrap();
        telemetry.publish(&session(1, 16)).unwrap();

        let metric = telemetry
            .registry()
            .get_metric(&MetricId::new(NAMESPACE, "last_stream_bytes"))
            .unwrap();
        assert_eq!(metric.value.as_gauge(), Some(16.0));
    }

    #[test]
    fn test_all_metrics_share_namespace() {
        let telemetry = PackTelemetry::new().unwrap();
        let metrics = telemetry.registry().namespace_metrics(NAMESPACE);
        assert_eq!(metrics.len(), COUNTERS.len() + 2);
        assert_eq!(metrics.len(), telemetry.registry().metric_count());
    }
}
