use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::task::JoinSet;
use tokio::time;

use super::*;

/// The only writer of one node's state.
pub(crate) struct Sampler<C> {
    node: Arc<NodeIdentity>,
    cluster: Arc<C>,
    state: watch::Sender<NodeState>,
    gauges: NodeGauges,
    interval: Duration,
    policy: Arc<dyn ErrorPolicy>,
}

impl<C> Sampler<C>
where
    C: ClusterMetadata,
{
    pub(crate) fn new(
        node: Arc<NodeIdentity>,
        cluster: Arc<C>,
        gauges: NodeGauges,
        config: &Config,
    ) -> (Self, watch::Receiver<NodeState>) {
        let (state, receiver) = watch::channel(NodeState::default());
        let sampler = Self {
            node,
            cluster,
            state,
            gauges,
            interval: config.interval,
            policy: Arc::clone(&config.policy),
        };
        (sampler, receiver)
    }

    /// Fetches usage once, replaces the node state and updates the gauges.
    ///
    /// On error the previous state is left in place.
    pub(crate) async fn sample(&self) -> Result<NodeState> {
        let name = self.node.name();
        let metrics = self
            .cluster
            .node_metrics(name)
            .await
            .map_err(|err| Error::sample(name, err))?;
        let state = NodeState::from_metrics(&metrics, &self.node)?;

        self.state.send_replace(state.clone());
        self.gauges.set(&state);

        tracing::trace!(
            node = name,
            cpu = state.cpu_usage_percent,
            memory = state.memory_usage_percent,
            storage = state.storage_usage_bytes,
            "Sampled node usage"
        );
        Ok(state)
    }

    /// Samples forever, one fetch at a time, until the policy aborts.
    pub(crate) async fn run(self) -> Result<()> {
        let node = self.node.name();
        let mut failures = 0_u32;
        tracing::debug!(node, interval = ?self.interval, "Sampling loop started");

        loop {
            let delay = match self.sample().await {
                Ok(_) => {
                    failures = 0;
                    self.interval
                }
                Err(err) => {
                    failures = failures.saturating_add(1);
                    match self.policy.decide(node, &err, failures) {
                        Decision::Abort => {
                            tracing::error!(node, ?err, "Sampling failed, aborting");
                            return Err(err);
                        }
                        Decision::RetryAfter(delay) => {
                            tracing::warn!(
                                node,
                                failures,
                                ?delay,
                                ?err,
                                "Sampling failed, retrying"
                            );
                            delay
                        }
                    }
                }
            };
            time::sleep(delay).await;
        }
    }
}

impl<C> fmt::Debug for Sampler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler")
            .field("node", &self.node.name())
            .field("gauges", &self.gauges)
            .field("interval", &self.interval)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Owns every node's sampling loop. Nothing is sampled until [`run`](Self::run).
pub struct Activation<C> {
    samplers: Vec<Sampler<C>>,
}

impl<C> Activation<C>
where
    C: ClusterMetadata,
{
    pub(crate) fn new(samplers: Vec<Sampler<C>>) -> Self {
        Self { samplers }
    }

    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }

    /// Runs one task per node until a loop aborts.
    ///
    /// Loops never block each other. When one of them gives up, the others
    /// are cancelled and its error is returned; the accessors keep their last
    /// values but see no further updates. Returns `Ok(())` only when there
    /// are no nodes.
    #[allow(tail_expr_drop_order)]
    pub async fn run(self) -> Result<()> {
        let mut loops = JoinSet::new();
        for sampler in self.samplers {
            loops.spawn(sampler.run());
        }
        tracing::info!(nodes = loops.len(), "Sampling started");

        while let Some(joined) = loops.join_next().await {
            let err = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(err) => Error::from(err),
            };
            loops.abort_all();
            return Err(err);
        }

        Ok(())
    }

    /// [`run`](Self::run) on a background task.
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }
}

impl<C> fmt::Debug for Activation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activation")
            .field("samplers", &self.samplers)
            .finish()
    }
}
