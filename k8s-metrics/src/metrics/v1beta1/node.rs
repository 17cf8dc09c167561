use std::time::Duration;

use k8s_openapi::ClusterResourceScope;
use k8s_openapi::Metadata;
use k8s_openapi::Resource;

use super::*;

/// `NodeMetrics` sets resource usage metrics of a node.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub metadata: metav1::ObjectMeta,

    /// The following fields define time interval from which metrics were
    /// collected from the interval [Timestamp-Window, Timestamp].
    ///
    pub timestamp: metav1::Time,

    #[serde(with = "duration")]
    pub window: Duration,

    /// The memory usage is the memory working set.
    ///
    pub usage: Usage,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            metadata: metav1::ObjectMeta::default(),
            timestamp: metav1::Time(Timestamp::UNIX_EPOCH),
            window: Duration::default(),
            usage: Usage::default(),
        }
    }
}

impl NodeMetrics {
    pub fn cpu(&self) -> Result<f64, QuantityParseError> {
        self.usage.cpu()
    }

    pub fn memory(&self) -> Result<i64, QuantityParseError> {
        self.usage.memory()
    }

    pub fn storage(&self) -> Result<f64, QuantityParseError> {
        self.usage.storage()
    }
}

impl Resource for NodeMetrics {
    const API_VERSION: &'static str = METRICS_API_GROUP_VERSION;
    const GROUP: &'static str = METRICS_API_GROUP;
    const KIND: &'static str = "NodeMetrics";
    const VERSION: &'static str = METRICS_API_VERSION;
    const URL_PATH_SEGMENT: &'static str = "nodes";
    type Scope = ClusterResourceScope;
}

impl Metadata for NodeMetrics {
    type Ty = metav1::ObjectMeta;

    fn metadata(&self) -> &Self::Ty {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Self::Ty {
        &mut self.metadata
    }
}
