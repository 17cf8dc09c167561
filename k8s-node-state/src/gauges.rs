use std::collections::HashMap;
use std::fmt;

use prometheus::Gauge;
use prometheus::Opts;
use prometheus::Registry;

use super::*;

/// Gauge name prefix for a node: every character outside `[A-Za-z0-9]`
/// becomes `_`, and a leading digit gets an extra `_` in front.
///
/// ```
/// assert_eq!(k8s_node_state::gauge_prefix("worker-1"), "worker_1");
/// assert_eq!(k8s_node_state::gauge_prefix("10.0.0.7"), "_10_0_0_7");
/// ```
pub fn gauge_prefix(node: &str) -> String {
    let mut prefix = node
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();
    if prefix.starts_with(|c: char| c.is_ascii_digit()) {
        prefix.insert(0, '_');
    }
    prefix
}

/// Rejects node sets where two names share a gauge prefix.
pub(crate) fn check_collisions(nodes: &[NodeIdentity]) -> Result<()> {
    let mut seen = HashMap::<String, &str>::with_capacity(nodes.len());
    for node in nodes {
        let prefix = gauge_prefix(node.name());
        if let Some(first) = seen.insert(prefix.clone(), node.name()) {
            return Err(Error::GaugeNameCollision {
                prefix,
                first: first.to_string(),
                second: node.name().to_string(),
            });
        }
    }
    Ok(())
}

/// The three gauges of one node, registered once and then only set.
#[derive(Clone)]
pub(crate) struct NodeGauges {
    prefix: String,
    cpu: Gauge,
    memory: Gauge,
    storage: Gauge,
}

impl NodeGauges {
    /// Builds the gauges of `node` without registering them.
    pub(crate) fn new(node: &str) -> Result<Self> {
        let prefix = gauge_prefix(node);
        let cpu = gauge(
            format!("{prefix}_cpu_usage"),
            format!("CPU usage of node {node} in percent of capacity"),
        )?;
        let memory = gauge(
            format!("{prefix}_mem_usage"),
            format!("Memory usage of node {node} in percent of capacity"),
        )?;
        let storage = gauge(
            format!("{prefix}_storage_usage"),
            format!("Storage used on node {node} in bytes"),
        )?;
        Ok(Self {
            prefix,
            cpu,
            memory,
            storage,
        })
    }

    pub(crate) fn set(&self, state: &NodeState) {
        self.cpu.set(state.cpu_usage_percent);
        self.memory.set(state.memory_usage_percent);
        self.storage.set(state.storage_usage_bytes);
    }

    fn gauges(&self) -> [&Gauge; 3] {
        [&self.cpu, &self.memory, &self.storage]
    }
}

impl fmt::Debug for NodeGauges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeGauges")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Registers the gauges of every node, or none of them.
///
/// On the first failure every gauge registered so far is unregistered again,
/// leaving `registry` as it was.
pub(crate) fn register_all(nodes: &[NodeGauges], registry: &Registry) -> Result<()> {
    let mut registered = Vec::with_capacity(nodes.len() * 3);
    for gauge in nodes.iter().flat_map(NodeGauges::gauges) {
        if let Err(err) = registry.register(Box::new(gauge.clone())) {
            for gauge in registered {
                if let Err(err) = registry.unregister(Box::new(gauge)) {
                    tracing::warn!(?err, "Failed to roll back gauge registration");
                }
            }
            return Err(err.into());
        }
        registered.push(gauge.clone());
    }
    Ok(())
}

fn gauge(name: String, help: String) -> Result<Gauge> {
    Ok(Gauge::with_opts(Opts::new(name, help))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_normalizes_separators() {
        assert_eq!(gauge_prefix("worker-1"), "worker_1");
        assert_eq!(gauge_prefix("ip-10-0-0-7.ec2.internal"), "ip_10_0_0_7_ec2_internal");
        assert_eq!(gauge_prefix("node"), "node");
    }

    #[test]
    fn prefix_never_starts_with_digit() {
        assert_eq!(gauge_prefix("1node"), "_1node");
    }

    #[test]
    fn registers_three_gauges_once() {
        let registry = Registry::new();
        let gauges = NodeGauges::new("worker-1").unwrap();
        register_all(std::slice::from_ref(&gauges), &registry).unwrap();
        gauges.set(&NodeState {
            cpu_usage_percent: 12.5,
            ..NodeState::default()
        });

        let text = prometheus::TextEncoder::new()
            .encode_to_string(&registry.gather())
            .unwrap();
        assert!(text.contains("# TYPE worker_1_cpu_usage gauge"));
        assert!(text.contains("# TYPE worker_1_mem_usage gauge"));
        assert!(text.contains("# TYPE worker_1_storage_usage gauge"));
        assert!(text.contains("worker_1_cpu_usage 12.5"));

        assert!(register_all(&[gauges], &registry).is_err());
    }

    #[test]
    fn failed_registration_leaves_registry_untouched() {
        let registry = Registry::new();
        let taken = Gauge::new("worker_2_mem_usage", "taken").unwrap();
        registry.register(Box::new(taken)).unwrap();

        let nodes = [
            NodeGauges::new("worker-1").unwrap(),
            NodeGauges::new("worker-2").unwrap(),
        ];
        let err = register_all(&nodes, &registry).unwrap_err();
        assert!(matches!(err, Error::Registry(_)), "{err:?}");

        let text = prometheus::TextEncoder::new()
            .encode_to_string(&registry.gather())
            .unwrap();
        let metrics = text
            .lines()
            .filter(|line| !line.starts_with('#'))
            .collect::<Vec<_>>();
        assert_eq!(metrics, ["worker_2_mem_usage 0"]);
    }
}
