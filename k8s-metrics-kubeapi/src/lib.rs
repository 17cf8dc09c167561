use std::fmt;

use k8s_metrics_ext as k8s;
use kube::api;
use prometheus_parse::Scrape;
use prometheus_parse::Value;

use k8s::corev1;
use k8s::metricsv1;

/// cAdvisor series carrying filesystem usage per container and device.
const FS_USAGE_METRIC: &str = "container_fs_usage_bytes";
/// cAdvisor reports the node itself as the root cgroup.
const ROOT_CGROUP: &str = "/";

pub struct KubeApi {
    get_params: api::GetParams,
    list_params: api::ListParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi configured with a default Kubernetes client.
    ///
    /// The client is inferred from `KUBECONFIG` or the in-cluster service account.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), kube::Error> {
    /// let api = k8s_metrics_kubeapi::KubeApi::new().await?;
    /// // use `api`...
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> kube::Result<Self> {
        kube::Client::try_default().await.map(Self::with_client)
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    ///
    /// The returned KubeApi is initialized with default `GetParams` and `ListParams`
    /// and uses `client` for all Kubernetes interactions.
    pub fn with_client(client: kube::Client) -> Self {
        Self {
            get_params: api::GetParams::default(),
            list_params: api::ListParams::default(),
            client,
        }
    }

    /// Lists all Nodes in the cluster, including their status.
    ///
    /// Full objects are fetched (not metadata only) since callers need
    /// `status.capacity` and `status.allocatable`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use k8s_metrics_kubeapi::KubeApi;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let api = KubeApi::new().await?;
    /// let nodes = api.list_nodes().await?;
    /// println!("discovered {} nodes", nodes.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_nodes(&self) -> kube::Result<Vec<corev1::Node>> {
        let lp = self.list_params();
        self.nodes().list(lp).await.map(|list| list.items)
    }

    /// Fetches the current `NodeMetrics` for `node` from the `metrics.k8s.io` API.
    ///
    /// # Returns
    ///
    /// The usage snapshot as of the metrics server's last scrape; a `kube::Error`
    /// if the metrics API is not installed, the node is unknown, or the request fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use k8s_metrics_kubeapi::KubeApi;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let api = KubeApi::new().await?;
    /// let metrics = api.get_node_metrics("worker-1").await?;
    /// println!("cpu: {:?}", metrics.usage.cpu);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_node_metrics(&self, node: &str) -> kube::Result<metricsv1::NodeMetrics> {
        let gp = self.get_params();
        self.node_metrics().get_with(node, gp).await
    }

    /// Lists Pods in `namespace`, or in all namespaces when `namespace` is empty.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use k8s_metrics_kubeapi::KubeApi;
    /// # async fn example() -> kube::Result<()> {
    /// let api = KubeApi::new().await?;
    /// let pods = api.list_pods("kube-system").await?;
    /// println!("{} pods in kube-system", pods.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_pods(&self, namespace: &str) -> kube::Result<Vec<corev1::Pod>> {
        let lp = self.list_params();
        self.pods(namespace).list(lp).await.map(|list| list.items)
    }

    /// Scrapes the node's cAdvisor endpoint through the API server proxy.
    pub async fn scrape_node_cadvisor(&self, node: &str) -> kube::Result<Scrape> {
        let cadvisor = self.get_node_cadvisor_metrics(node).await?;
        let lines = cadvisor.lines().map(|line| Ok(line.to_string()));
        Scrape::parse(lines).map_err(kube::Error::ReadEvents)
    }

    /// Bytes used on the node's filesystems according to cAdvisor.
    ///
    /// Sums `container_fs_usage_bytes` of the root cgroup over all devices.
    /// `None` when the scrape carries no such series.
    pub async fn node_fs_usage_bytes(&self, node: &str) -> kube::Result<Option<f64>> {
        let scrape = self.scrape_node_cadvisor(node).await?;
        let used = root_fs_usage(&scrape);
        if used.is_none() {
            tracing::debug!(node, "No root filesystem usage in cAdvisor scrape");
        }
        Ok(used)
    }

    /// Fetches the raw response body from the Kubernetes API for the given request path.
    async fn raw_get(&self, name: impl AsRef<str>) -> kube::Result<String> {
        let gp = self.get_params();
        let request = api::Request::new("")
            .get(name.as_ref(), gp)
            .map_err(kube::Error::BuildRequest)?;
        self.client.request_text(request).await
    }

    async fn get_node_cadvisor_metrics(&self, node: &str) -> kube::Result<String> {
        let name = format!("/api/v1/nodes/{node}/proxy/metrics/cadvisor");
        self.raw_get(&name).await
    }

    fn nodes(&self) -> api::Api<corev1::Node> {
        api::Api::all(self.client.clone())
    }

    fn node_metrics(&self) -> api::Api<metricsv1::NodeMetrics> {
        api::Api::all(self.client.clone())
    }

    fn pods(&self, namespace: &str) -> api::Api<corev1::Pod> {
        if namespace.is_empty() {
            api::Api::all(self.client.clone())
        } else {
            api::Api::namespaced(self.client.clone(), namespace)
        }
    }

    fn get_params(&self) -> &api::GetParams {
        &self.get_params
    }

    fn list_params(&self) -> &api::ListParams {
        &self.list_params
    }
}

impl fmt::Debug for KubeApi {
    /// Formats the `KubeApi` for debugging, showing `get_params` and `list_params` while redacting the `client`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeApi")
            .field("get_params", &self.get_params)
            .field("list_params", &self.list_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}

fn root_fs_usage(scrape: &Scrape) -> Option<f64> {
    scrape
        .samples
        .iter()
        .filter(|sample| sample.metric == FS_USAGE_METRIC)
        .filter(|sample| sample.labels.get("id").is_some_and(|id| id == ROOT_CGROUP))
        .filter_map(|sample| match sample.value {
            Value::Gauge(value) | Value::Counter(value) | Value::Untyped(value) => Some(value),
            Value::Histogram(_) | Value::Summary(_) => None,
        })
        .fold(None, |total, value| Some(total.unwrap_or(0.0) + value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrape(text: &str) -> Scrape {
        Scrape::parse(text.lines().map(|line| Ok(line.to_string()))).unwrap()
    }

    #[test]
    fn sums_root_cgroup_devices() {
        let scrape = scrape(
            r#"# TYPE container_fs_usage_bytes gauge
container_fs_usage_bytes{device="/dev/sda1",id="/"} 1000
container_fs_usage_bytes{device="/dev/sdb1",id="/"} 24
container_fs_usage_bytes{device="/dev/sda1",id="/kubepods/burstable"} 500
"#,
        );
        assert_eq!(root_fs_usage(&scrape), Some(1024.0));
    }

    #[test]
    fn missing_series_is_none() {
        let scrape = scrape(
            r#"# TYPE container_memory_working_set_bytes gauge
container_memory_working_set_bytes{id="/"} 1000
"#,
        );
        assert_eq!(root_fs_usage(&scrape), None);
    }
}
