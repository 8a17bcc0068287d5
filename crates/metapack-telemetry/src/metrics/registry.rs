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

//! Registry for counters and gauges.

use super::{Metric, MetricId, MetricsError, MetricsResult};
use crate::storage::{InMemoryBackend, MetricsBackend};
use std::sync::Arc;

/// Entry point for registering and reading metrics.
///
/// Registration returns a cheap handle bound to the metric's id, so hot code
/// never has to rebuild identifiers.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    backend: Arc<dyn MetricsBackend>,
}

impl MetricsRegistry {
    /// Creates a registry over an [`InMemoryBackend`].
    pub fn new() -> Self {
        Self::with_backend(Arc::new(InMemoryBackend::new()))
    }

    /// Creates a registry over a custom backend.
    pub fn with_backend(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }

    /// Registers a counter, or returns a handle to the existing one.
    pub fn register_counter(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> MetricsResult<CounterHandle> {
        let id = MetricId::new(namespace, name);
        if !self.backend.contains_metric(&id) {
            self.backend
                .put_metric(Metric::counter(id.clone(), description))?;
        }
        Ok(CounterHandle {
            id,
            backend: self.backend.clone(),
        })
    }

    /// Registers a gauge, or returns a handle to the existing one.
    pub fn register_gauge(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> MetricsResult<GaugeHandle> {
        let id = MetricId::new(namespace, name);
        if !self.backend.contains_metric(&id) {
            self.backend
                .put_metric(Metric::gauge(id.clone(), description, unit))?;
        }
        Ok(GaugeHandle {
            id,
            backend: self.backend.clone(),
        })
    }

    /// Fetches a metric by id.
    pub fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        self.backend.get_metric(id)
    }

    /// Returns the metrics of one namespace, ordered by name.
    pub fn namespace_metrics(&self, namespace: &str) -> Vec<Metric> {
        self.backend
            .list_metrics()
            .into_iter()
            .filter(|metric| metric.id.namespace == namespace)
            .collect()
    }

    /// Number of registered metrics.
    pub fn metric_count(&self) -> usize {
        self.backend.list_metrics().len()
    }

    /// Serializes every metric to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.backend.list_metrics())
    }

    /// Removes every metric. Existing handles fail with `NotFound` afterwards.
    pub fn clear(&self) -> MetricsResult<()> {
        self.backend.clear()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered counter.
#[derive(Debug, Clone)]
pub struct CounterHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl CounterHandle {
    /// Adds one.
    pub fn increment(&self) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, 1)
    }

    /// Adds `amount`.
    pub fn increment_by(&self, amount: u64) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, amount)
    }

    /// Current count.
    pub fn get(&self) -> MetricsResult<u64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric
            .value
            .as_counter()
            .ok_or_else(|| MetricsError::TypeMismatch {
                id: self.id.clone(),
                expected: "counter",
                found: metric.value.kind(),
            })
    }

    /// The counter's id.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle to a registered gauge.
#[derive(Debug, Clone)]
pub struct GaugeHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl GaugeHandle {
    /// Overwrites the value.
    pub fn set(&self, value: f64) -> MetricsResult<()> {
        self.backend.set_gauge(&self.id, value)
    }

    /// Current value.
    pub fn get(&self) -> MetricsResult<f64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric
            .value
            .as_gauge()
            .ok_or_else(|| MetricsError::TypeMismatch {
                id: self.id.clone(),
                expected: "gauge",
                found: metric.value.kind(),
            })
    }

    /// The gauge's id.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice_keeps_value() {
        let registry = MetricsRegistry::new();
        let first = registry.register_counter("metapack", "flushes", "").unwrap();
        first.increment_by(4).unwrap();

        let second = registry.register_counter("metapack", "flushes", "").unwrap();
        assert_eq!(second.get().unwrap(), 4);
        assert_eq!(registry.metric_count(), 1);
    }

    #[test]
    fn test_gauge_roundtrip_and_namespace_listing() {
        let registry = MetricsRegistry::new();
        let gauge = registry
            .register_gauge("metapack", "stream_bytes", "last stream size", "bytes")
            .unwrap();
        registry.register_counter("other", "events", "").unwrap();

        gauge.set(128.0).unwrap();
        assert_eq!(gauge.get().unwrap(), 128.0);

        let names: Vec<_> = registry
            .namespace_metrics("metapack")
            .into_iter()
            .map(|m| m.id.name)
            .collect();
        assert_eq!(names, vec!["stream_bytes".to_string()]);
    }

    #[test]
    fn test_handle_after_clear_reports_missing() {
        let registry = MetricsRegistry::new();
        let counter = registry.register_counter("metapack", "draws", "").unwrap();
        registry.clear().unwrap();

        assert!(matches!(counter.increment(), Err(MetricsError::NotFound(_))));
    }

    #[test]
    fn test_json_export_lists_metrics() {
        let registry = MetricsRegistry::new();
        registry
            .register_counter("metapack", "draws", "draw commands")
            .unwrap()
            .increment_by(2)
            .unwrap();

        let json = registry.to_json().unwrap();
        let parsed: Vec<Metric> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].value.as_counter(), Some(2));
    }
}
