use kube::ResourceExt as _;

use super::*;

/// CPU and memory a node offers, frozen at discovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Capacity {
    /// Whole cores.
    pub cpu: i64,
    /// Bytes.
    pub memory: i64,
}

impl Capacity {
    fn from_node(node: &corev1::Node, name: &str, source: CapacitySource) -> Result<Self> {
        let cpu = read(node, name, source, k8s::CPU, QuantityExt::to_cores)?;
        let memory = read(node, name, source, k8s::MEMORY, QuantityExt::to_memory)?;
        Ok(Self { cpu, memory })
    }
}

fn read(
    node: &corev1::Node,
    name: &str,
    source: CapacitySource,
    resource: &'static str,
    convert: fn(&k8s::resource::Quantity) -> Result<i64, QuantityParseError>,
) -> Result<i64> {
    let quantity = source
        .quantity(node, resource)
        .ok_or_else(|| Error::MissingCapacity {
            node: name.to_string(),
            resource,
            list: source,
        })?;
    let value = convert(quantity).map_err(|source| Error::Quantity {
        node: name.to_string(),
        resource,
        source,
    })?;
    if value <= 0 {
        return Err(Error::ZeroCapacity {
            node: name.to_string(),
            resource,
        });
    }
    Ok(value)
}

/// A node as seen at discovery: its name, its capacity and the object itself.
#[derive(Clone, Debug)]
pub struct NodeIdentity {
    name: String,
    capacity: Capacity,
    node: corev1::Node,
}

impl NodeIdentity {
    pub fn discover(node: corev1::Node, source: CapacitySource) -> Result<Self> {
        let name = node.name_any();
        let capacity = Capacity::from_node(&node, &name, source)?;
        Ok(Self {
            name,
            capacity,
            node,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn node(&self) -> &corev1::Node {
        &self.node
    }
}

/// Enumerates the cluster's nodes once. Any failure aborts discovery as a whole.
pub(crate) async fn discover<C>(cluster: &C, source: CapacitySource) -> Result<Vec<NodeIdentity>>
where
    C: ClusterMetadata,
{
    let nodes = cluster.list_nodes().await.map_err(Error::discovery)?;
    let nodes = nodes
        .into_iter()
        .map(|node| NodeIdentity::discover(node, source))
        .collect::<Result<Vec<_>>>()?;
    for node in &nodes {
        tracing::debug!(
            node = node.name(),
            cpu = node.capacity.cpu,
            memory = node.capacity.memory,
            "Discovered node"
        );
    }
    Ok(nodes)
}
