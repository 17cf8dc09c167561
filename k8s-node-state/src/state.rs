use super::*;

/// Last successfully sampled usage of one node.
///
/// Replaced as a whole on every sample, so the three values always come from
/// the same usage snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
    /// Absolute bytes; storage capacity is not known.
    pub storage_usage_bytes: f64,
    /// When the metrics source observed the usage, `None` before the first sample.
    pub timestamp: Option<metav1::Time>,
}

impl NodeState {
    pub fn from_metrics(metrics: &metricsv1::NodeMetrics, node: &NodeIdentity) -> Result<Self> {
        let name = node.name();
        let capacity = node.capacity();
        let quantity = |resource| {
            move |source| Error::Quantity {
                node: name.to_string(),
                resource,
                source,
            }
        };
        let zero = |resource| Error::ZeroCapacity {
            node: name.to_string(),
            resource,
        };

        let cpu = metrics.cpu().map_err(quantity(k8s::CPU))?;
        let memory = metrics.memory().map_err(quantity(k8s::MEMORY))?;
        let storage = metrics.storage().map_err(quantity("storage"))?;

        Ok(Self {
            cpu_usage_percent: percent(cpu, capacity.cpu).ok_or_else(|| zero(k8s::CPU))?,
            memory_usage_percent: percent(memory as f64, capacity.memory)
                .ok_or_else(|| zero(k8s::MEMORY))?,
            storage_usage_bytes: storage,
            timestamp: Some(metrics.timestamp.clone()),
        })
    }

    pub fn is_sampled(&self) -> bool {
        self.timestamp.is_some()
    }
}

/// `used / capacity * 100`, or `None` when there is no capacity to divide by.
pub fn percent(used: f64, capacity: i64) -> Option<f64> {
    (capacity > 0).then(|| used / capacity as f64 * 100.0)
}
