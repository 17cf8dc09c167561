//! Live resource usage of every node in a Kubernetes cluster.
//!
//! [`start`] discovers the nodes once, freezes their capacity and registers
//! three gauges per node. It returns one [`NodeAccessor`] per node together
//! with an [`Activation`] that runs one sampling loop per node once it is
//! [run](Activation::run).
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! use k8s_metrics_kubeapi::KubeApi;
//! use k8s_node_state::{Config, KubeCluster};
//!
//! let cluster = KubeCluster::new(KubeApi::new().await?);
//! let registry = prometheus::Registry::new();
//! let (nodes, activation) = k8s_node_state::start(cluster, &registry, Config::default()).await?;
//! let sampling = activation.spawn();
//!
//! for node in &nodes {
//!     println!("{}: {:.1}% cpu", node.name(), node.cpu_usage_percent());
//! }
//! sampling.await??;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use k8s_metrics::QuantityParseError;
use k8s_metrics_ext as k8s;
use prometheus::Registry;
use serde::Serialize;

use k8s::corev1;
use k8s::metav1;
use k8s::metricsv1;
use k8s::NodeExt;
use k8s::PodExt;
use k8s::QuantityExt;

use gauges::NodeGauges;
use sampler::Sampler;

pub use accessor::NodeAccessor;
pub use cluster::{ClusterMetadata, KubeCluster};
pub use config::{
    CapacitySource, Config, BACKOFF_MAX_ENV, CAPACITY_ENV, INTERVAL_ENV, ON_ERROR_ENV,
};
pub use error::{BoxError, Error, Result};
pub use gauges::gauge_prefix;
pub use node::{Capacity, NodeIdentity};
pub use policy::{Backoff, Decision, ErrorPolicy, FailFast};
pub use sampler::Activation;
pub use state::{percent, NodeState};

mod accessor;
mod cluster;
mod config;
mod error;
mod gauges;
mod node;
mod policy;
mod sampler;
mod state;

/// Discovers the cluster's nodes and prepares one sampling loop per node.
///
/// The accessors are usable right away but report no usage until the
/// returned [`Activation`] is run. Fails without partial state if discovery
/// fails, a node has no usable capacity, two nodes would share gauge names,
/// or the gauges cannot be registered.
pub async fn start<C>(
    cluster: C,
    registry: &Registry,
    config: Config,
) -> Result<(Vec<NodeAccessor<C>>, Activation<C>)>
where
    C: ClusterMetadata,
{
    let cluster = Arc::new(cluster);
    let nodes = node::discover(cluster.as_ref(), config.capacity_source).await?;
    gauges::check_collisions(&nodes)?;
    let gauges = nodes
        .iter()
        .map(|node| NodeGauges::new(node.name()))
        .collect::<Result<Vec<_>>>()?;
    gauges::register_all(&gauges, registry)?;

    let mut accessors = Vec::with_capacity(nodes.len());
    let mut samplers = Vec::with_capacity(nodes.len());
    for (node, gauges) in nodes.into_iter().zip(gauges) {
        let node = Arc::new(node);
        let (sampler, state) =
            Sampler::new(Arc::clone(&node), Arc::clone(&cluster), gauges, &config);
        accessors.push(NodeAccessor::new(node, state, Arc::clone(&cluster)));
        samplers.push(sampler);
    }

    tracing::info!(nodes = accessors.len(), interval = ?config.interval, "Node state ready");
    Ok((accessors, Activation::new(samplers)))
}
