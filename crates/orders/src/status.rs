use std::sync::Arc;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult};

/// Order status as persisted.
///
/// The wire/storage form is the exact display string (`"On the Way"`, ...).
/// Strings that match no known status are kept verbatim in `Unrecognized` so
/// legacy rows survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Placed,
    OnTheWay,
    Shipped,
    Delivered,
    /// Set by an external cancellation action; absorbing.
    Cancelled,
    Unrecognized(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::OnTheWay => "On the Way",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Unrecognized(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Placed" => OrderStatus::Placed,
            "On the Way" => OrderStatus::OnTheWay,
            "Shipped" => OrderStatus::Shipped,
            "Delivered" => OrderStatus::Delivered,
            "Cancelled" => OrderStatus::Cancelled,
            other => OrderStatus::Unrecognized(other.to_string()),
        }
    }

    /// The scheduler never moves an order out of a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        OrderStatus::parse(&value)
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Unrecognized(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable, ordered list of the statuses an order walks through.
///
/// Cheap to clone (shared slice); built once from configuration and read by
/// every scheduler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPipeline {
    stages: Arc<[OrderStatus]>,
}

impl StatusPipeline {
    /// Build a pipeline from explicit stages.
    ///
    /// Stages must be non-empty, unique, and must not contain `Cancelled` or
    /// unrecognized statuses.
    pub fn new(stages: Vec<OrderStatus>) -> DomainResult<Self> {
        if stages.is_empty() {
            return Err(DomainError::invalid_state("status pipeline cannot be empty"));
        }
        for (i, stage) in stages.iter().enumerate() {
            if matches!(stage, OrderStatus::Cancelled | OrderStatus::Unrecognized(_)) {
                return Err(DomainError::invalid_state(format!(
                    "status pipeline cannot contain {stage}"
                )));
            }
            if stages[..i].contains(stage) {
                return Err(DomainError::invalid_state(format!(
                    "status pipeline lists {stage} twice"
                )));
            }
        }
        Ok(Self {
            stages: stages.into(),
        })
    }

    pub fn stages(&self) -> &[OrderStatus] {
        &self.stages
    }

    /// Status every new order starts in.
    pub fn initial(&self) -> &OrderStatus {
        &self.stages[0]
    }

    pub fn position(&self, status: &OrderStatus) -> Option<usize> {
        self.stages.iter().position(|s| s == status)
    }

    /// Stage following `status`, or `None` when `status` is unknown to the
    /// pipeline or already the last stage.
    pub fn next_after(&self, status: &OrderStatus) -> Option<&OrderStatus> {
        let idx = self.position(status)?;
        self.stages.get(idx + 1)
    }
}

impl Default for StatusPipeline {
    fn default() -> Self {
        Self {
            stages: Arc::from(vec![
                OrderStatus::Placed,
                OrderStatus::OnTheWay,
                OrderStatus::Shipped,
                OrderStatus::Delivered,
            ]),
        }
    }
}
