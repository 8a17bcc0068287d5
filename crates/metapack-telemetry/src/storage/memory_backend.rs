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

use super::MetricsBackend;
use crate::metrics::{Metric, MetricId, MetricsError, MetricsResult};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-process metrics storage behind a `RwLock`.
///
/// Metrics are kept in a `BTreeMap` so listings come out in id order.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    storage: RwLock<BTreeMap<MetricId, Metric>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metrics registered under `namespace`.
    pub fn metrics_in_namespace(&self, namespace: &str) -> Vec<Metric> {
        match self.storage.read() {
            Ok(storage) => storage
                .values()
                .filter(|metric| metric.id.namespace == namespace)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl MetricsBackend for InMemoryBackend {
    fn put_metric(&self, metric: Metric) -> MetricsResult<()> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| MetricsError::Storage("Failed to acquire write lock".to_string()))?;
        storage.insert(metric.id.clone(), metric);
        Ok(())
    }

    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        let storage = self
            .storage
            .read()
            .map_err(|_| MetricsError::Storage("Failed to acquire read lock".to_string()))?;
        storage
            .get(id)
            .cloned()
            .ok_or_else(|| MetricsError::NotFound(id.clone()))
    }

    fn list_metrics(&self) -> Vec<Metric> {
        self.storage
            .read()
            .map(|storage| storage.values().cloned().collect())
            .unwrap_or_default()
    }

    fn clear(&self) -> MetricsResult<()> {
        self.storage
            .write()
            .map_err(|_| MetricsError::Storage("Failed to acquire write lock".to_string()))?
            .clear();
        Ok(())
    }
}
