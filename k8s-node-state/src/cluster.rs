use std::future::Future;

use k8s::NodeMetricsExt as _;
use k8s_metrics_kubeapi::KubeApi;

use super::*;

/// Read-only view of the cluster that node state is built from.
pub trait ClusterMetadata: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list_nodes(&self) -> impl Future<Output = Result<Vec<corev1::Node>, Self::Error>> + Send;

    /// Usage snapshot of `node` as of the call.
    fn node_metrics(
        &self,
        node: &str,
    ) -> impl Future<Output = Result<metricsv1::NodeMetrics, Self::Error>> + Send;

    /// Pods in `namespace`; the empty namespace means all namespaces.
    fn list_pods(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<corev1::Pod>, Self::Error>> + Send;
}

/// [`ClusterMetadata`] backed by the Kubernetes API and `metrics.k8s.io`.
#[derive(Debug)]
pub struct KubeCluster {
    api: KubeApi,
    cadvisor_storage: bool,
}

impl KubeCluster {
    pub fn new(api: KubeApi) -> Self {
        Self {
            api,
            cadvisor_storage: false,
        }
    }

    /// Fill storage usage from each node's cAdvisor scrape when the metrics
    /// API does not report it. Costs one extra proxied request per sample.
    pub fn with_cadvisor_storage(self, cadvisor_storage: bool) -> Self {
        Self {
            cadvisor_storage,
            ..self
        }
    }
}

impl ClusterMetadata for KubeCluster {
    type Error = kube::Error;

    async fn list_nodes(&self) -> kube::Result<Vec<corev1::Node>> {
        self.api.list_nodes().await
    }

    async fn node_metrics(&self, node: &str) -> kube::Result<metricsv1::NodeMetrics> {
        let metrics = self.api.get_node_metrics(node).await?;
        if !self.cadvisor_storage || metrics.usage.storage.is_some() {
            return Ok(metrics);
        }

        let root_fs = self.api.node_fs_usage_bytes(node).await?;
        Ok(merge_storage(metrics, root_fs))
    }

    async fn list_pods(&self, namespace: &str) -> kube::Result<Vec<corev1::Pod>> {
        self.api.list_pods(namespace).await
    }
}

/// Fills in storage usage from the root filesystem bytes scraped from
/// cAdvisor. Storage reported by the metrics API wins.
fn merge_storage(
    metrics: metricsv1::NodeMetrics,
    root_fs: Option<f64>,
) -> metricsv1::NodeMetrics {
    match root_fs {
        Some(bytes) if metrics.usage.storage.is_none() => {
            metrics.with_storage(&bytes.to_string())
        }
        _ => metrics,
    }
}
