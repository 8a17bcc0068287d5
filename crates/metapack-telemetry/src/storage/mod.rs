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

//! Storage backends for metrics.

pub mod memory_backend;

pub use memory_backend::InMemoryBackend;

use crate::metrics::{Metric, MetricId, MetricValue, MetricsError, MetricsResult};
use std::fmt::Debug;

/// Storage for registered metrics.
///
/// Implementors provide the four primitive operations; value updates are
/// built on top of them.
pub trait MetricsBackend: Send + Sync + Debug + 'static {
    /// Stores or replaces a metric.
    fn put_metric(&self, metric: Metric) -> MetricsResult<()>;

    /// Fetches a copy of a metric.
    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric>;

    /// Returns every stored metric, ordered by id.
    fn list_metrics(&self) -> Vec<Metric>;

    /// Removes every metric.
    fn clear(&self) -> MetricsResult<()>;

    /// Whether a metric is registered under `id`.
    fn contains_metric(&self, id: &MetricId) -> bool {
        self.get_metric(id).is_ok()
    }

    /// Adds `delta` to a counter, saturating, and returns the new count.
    fn increment_counter(&self, id: &MetricId, delta: u64) -> MetricsResult<u64> {
        let mut metric = self.get_metric(id)?;
        let MetricValue::Counter(count) = metric.value else {
            return Err(mismatch(&metric, "counter"));
        };
        let count = count.saturating_add(delta);
        metric.value = MetricValue::Counter(count);
        self.put_metric(metric)?;
        Ok(count)
    }

    /// Overwrites a gauge.
    fn set_gauge(&self, id: &MetricId, value: f64) -> MetricsResult<()> {
        let mut metric = self.get_metric(id)?;
        if metric.value.as_gauge().is_none() {
            return Err(mismatch(&metric, "gauge"));
        }
        metric.value = MetricValue::Gauge(value);
        self.put_metric(metric)
    }
}

fn mismatch(metric: &Metric, expected: &'static str) -> MetricsError {
    MetricsError::TypeMismatch {
        id: metric.id.clone(),
        expected,
        found: metric.value.kind(),
    }
}
