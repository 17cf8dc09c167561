use std::sync::Arc;

use k8s_metrics_ext as k8s;
use k8s_metrics_kubeapi::KubeApi;
use k8s_node_state::BoxError;
use k8s_node_state::Capacity;
use k8s_node_state::KubeCluster;
use k8s_node_state::NodeAccessor;
use k8s_node_state::NodeState;
use prometheus::Registry;
use prometheus::TextEncoder;
use serde::Deserialize;
use serde::Serialize;

use k8s::StatusExt as _;
use k8s::corev1;
use k8s::metav1;
use k8s::openapi::List;

use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http;
use axum::response::Response;
use axum::{Json, Router, response::IntoResponse, routing::get};

use settings::Settings;

mod settings;

type Node = NodeAccessor<KubeCluster>;

struct AppState {
    registry: Registry,
    nodes: Vec<Node>,
}

impl AppState {
    fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name() == name)
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    tracing::info!("Starting k8s-node-exporter");

    let settings = Settings::from_env()?;
    let cluster = KubeCluster::new(KubeApi::new().await?)
        .with_cadvisor_storage(settings.cadvisor_storage);
    let registry = Registry::new();
    let (nodes, activation) = k8s_node_state::start(cluster, &registry, settings.config).await?;
    if nodes.is_empty() {
        tracing::warn!("No nodes discovered, nothing will be sampled");
    }
    let state = Arc::new(AppState { registry, nodes });

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/nodes", get(all_nodes))
        .route("/nodes/{node}", get(node))
        .route("/nodes/{node}/pods", get(node_pods))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(settings.listen).await?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{addr}");
    }

    // Sampling errors end the process; the server alone never finishes first.
    let sampling = async { activation.run().await.map_err(BoxError::from) };
    let serving = async { axum::serve(listener, app).await.map_err(BoxError::from) };
    tokio::try_join!(sampling, serving)?;

    Ok(())
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match TextEncoder::new().encode_to_string(&state.registry.gather()) {
        Ok(text) => ([(http::header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], text).into_response(),
        Err(err) => {
            tracing::error!(?err, "Failed to encode metrics");
            failure(http::StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeView {
    name: String,
    capacity: Capacity,
    usage: NodeState,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        Self {
            name: node.name().to_string(),
            capacity: node.capacity(),
            usage: node.snapshot(),
        }
    }
}

async fn all_nodes(State(state): State<Arc<AppState>>) -> Json<Vec<NodeView>> {
    Json(state.nodes.iter().map(NodeView::from).collect())
}

async fn node(
    Path(node): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<NodeView>, NotFound<corev1::Node>> {
    state
        .node(&node)
        .map(NodeView::from)
        .map(Json)
        .ok_or(NotFound::<corev1::Node>::new(node))
}

#[derive(Debug, Deserialize)]
struct PodQuery {
    #[serde(default)]
    namespace: String,
}

async fn node_pods(
    Path(node): Path<String>,
    Query(query): Query<PodQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(accessor) = state.node(&node) else {
        return NotFound::<corev1::Node>::new(node).into_response();
    };

    match accessor.pods_on_node(&query.namespace).await {
        Ok(items) => {
            let list = List {
                metadata: metav1::ListMeta::default(),
                items,
            };
            Json(list).into_response()
        }
        Err(err) => {
            tracing::error!(
                node,
                namespace = query.namespace.as_str(),
                ?err,
                "Failed to list pods on node"
            );
            failure(http::StatusCode::BAD_GATEWAY, err.to_string()).into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

fn failure(code: http::StatusCode, message: String) -> impl IntoResponse {
    let status = metav1::Status {
        code: Some(code.as_u16() as i32),
        message: Some(message),
        reason: code.canonical_reason().map(str::to_string),
        status: Some("Failure".to_string()),
        ..k8s::default()
    };
    (code, Json(status))
}

struct NotFound<K> {
    name: String,
    resource: std::marker::PhantomData<K>,
}

impl<K> NotFound<K> {
    fn new(name: String) -> Self {
        Self {
            name,
            resource: std::marker::PhantomData,
        }
    }
}

impl<K> IntoResponse for NotFound<K>
where
    K: k8s::openapi::Resource,
{
    fn into_response(self) -> Response {
        let code = http::StatusCode::NOT_FOUND;
        let status = metav1::Status {
            code: Some(code.as_u16() as i32),
            ..metav1::Status::not_found::<K>(self.name)
        };
        (code, Json(status)).into_response()
    }
}
