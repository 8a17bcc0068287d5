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

//! Metric identifiers, values and errors.

pub mod registry;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Identifies a metric by namespace and name, e.g. `metapack:draw_calls`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricId {
    /// Owning subsystem.
    pub namespace: String,
    /// Metric name within the namespace.
    pub name: String,
}

impl MetricId {
    /// Creates an identifier.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// The value held by a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// Monotonically increasing count.
    Counter(u64),
    /// Arbitrary sampled value.
    Gauge(f64),
}

impl MetricValue {
    /// Returns the count if this is a counter.
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            MetricValue::Gauge(_) => None,
        }
    }

    /// Returns the value if this is a gauge.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(v) => Some(*v),
            MetricValue::Counter(_) => None,
        }
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            MetricValue::Counter(_) => "counter",
            MetricValue::Gauge(_) => "gauge",
        }
    }
}

/// A registered metric with its description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Identifier.
    pub id: MetricId,
    /// Human readable description.
    pub description: String,
    /// Unit of the value (`count`, `bytes`, ...).
    pub unit: String,
    /// Current value.
    pub value: MetricValue,
}

impl Metric {
    /// A counter starting at zero.
    pub fn counter(id: MetricId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            unit: "count".to_string(),
            value: MetricValue::Counter(0),
        }
    }

    /// A gauge starting at zero.
    pub fn gauge(id: MetricId, description: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            unit: unit.into(),
            value: MetricValue::Gauge(0.0),
        }
    }
}

/// Result alias for metric operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Errors raised by the metrics registry and its backends.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// No metric is registered under this id.
    NotFound(MetricId),
    /// The metric exists but holds another kind of value.
    TypeMismatch {
        /// The metric involved.
        id: MetricId,
        /// Kind the operation expected.
        expected: &'static str,
        /// Kind actually stored.
        found: &'static str,
    },
    /// The backend storage could not be accessed.
    Storage(String),
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::NotFound(id) => write!(f, "Metric not found: {id}"),
            MetricsError::TypeMismatch {
                id,
                expected,
                found,
            } => write!(f, "Metric {id} is a {found}, expected a {expected}"),
            MetricsError::Storage(msg) => write!(f, "Metrics storage error: {msg}"),
        }
    }
}

impl std::error::Error for MetricsError {}
