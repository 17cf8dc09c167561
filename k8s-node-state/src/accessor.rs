use std::fmt;

use tokio::sync::watch;

use super::*;

/// Read-only handle on one node's live state and identity.
///
/// Reads never wait for the sampling loop. Before the first sample the usage
/// getters return `0.0`; see [`has_sample`](Self::has_sample).
pub struct NodeAccessor<C> {
    node: Arc<NodeIdentity>,
    state: watch::Receiver<NodeState>,
    cluster: Arc<C>,
}

impl<C> NodeAccessor<C> {
    pub(crate) fn new(
        node: Arc<NodeIdentity>,
        state: watch::Receiver<NodeState>,
        cluster: Arc<C>,
    ) -> Self {
        Self {
            node,
            state,
            cluster,
        }
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn node(&self) -> &corev1::Node {
        self.node.node()
    }

    pub fn cpu_usage_percent(&self) -> f64 {
        self.state.borrow().cpu_usage_percent
    }

    pub fn mem_usage_percent(&self) -> f64 {
        self.state.borrow().memory_usage_percent
    }

    pub fn storage_usage_bytes(&self) -> f64 {
        self.state.borrow().storage_usage_bytes
    }

    pub fn cpu_capacity(&self) -> i64 {
        self.node.capacity().cpu
    }

    pub fn memory_capacity(&self) -> i64 {
        self.node.capacity().memory
    }

    pub fn capacity(&self) -> Capacity {
        self.node.capacity()
    }

    /// All three usage values from the same sample.
    pub fn snapshot(&self) -> NodeState {
        self.state.borrow().clone()
    }

    pub fn has_sample(&self) -> bool {
        self.state.borrow().is_sampled()
    }

    /// Waits for the next sample this accessor has not seen yet.
    pub async fn changed(&mut self) -> Result<NodeState> {
        self.state
            .changed()
            .await
            .map_err(|_| Error::SamplerStopped {
                node: self.node.name().to_string(),
            })?;
        Ok(self.state.borrow_and_update().clone())
    }
}

impl<C> NodeAccessor<C>
where
    C: ClusterMetadata,
{
    /// Pods in `namespace` currently scheduled on this node.
    ///
    /// Asks the cluster on every call; nothing is cached. An empty namespace
    /// searches all namespaces.
    pub async fn pods_on_node(&self, namespace: &str) -> Result<Vec<corev1::Pod>> {
        let name = self.name();
        let pods = self
            .cluster
            .list_pods(namespace)
            .await
            .map_err(|err| Error::pods(name, namespace, err))?;
        let pods = pods
            .into_iter()
            .filter(|pod| pod.node_name() == Some(name))
            .collect::<Vec<_>>();
        tracing::debug!(node = name, namespace, pods = pods.len(), "Listed pods on node");
        Ok(pods)
    }
}

impl<C> Clone for NodeAccessor<C> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            state: self.state.clone(),
            cluster: Arc::clone(&self.cluster),
        }
    }
}

impl<C> fmt::Debug for NodeAccessor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeAccessor")
            .field("node", &self.node.name())
            .field("capacity", &self.node.capacity())
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
