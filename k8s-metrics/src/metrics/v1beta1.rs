use constcat::concat;

use super::*;

pub use node::NodeMetrics;

pub const METRICS_API_GROUP: &str = "metrics.k8s.io";
pub const METRICS_API_VERSION: &str = "v1beta1";
pub const METRICS_API_GROUP_VERSION: &str = concat!(METRICS_API_GROUP, "/", METRICS_API_VERSION);

mod duration;
mod node;

/// Resource usage as reported by the metrics API.
///
/// `storage` is not part of what metrics-server reports for nodes, but other
/// metrics API implementations may fill it in, so it is carried when present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub cpu: resource::Quantity,
    pub memory: resource::Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<resource::Quantity>,
}

impl Usage {
    pub fn cpu(&self) -> Result<f64, QuantityParseError> {
        self.cpu.to_f64()
    }

    pub fn memory(&self) -> Result<i64, QuantityParseError> {
        self.memory.to_memory()
    }

    /// Storage in bytes, `0.0` when the metrics source does not report it.
    pub fn storage(&self) -> Result<f64, QuantityParseError> {
        self.storage
            .as_ref()
            .map_or(Ok(0.0), |storage| storage.to_f64())
    }
}

#[cfg(test)]
mod tests;
