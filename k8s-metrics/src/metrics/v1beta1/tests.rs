use std::time::Duration;

use k8s_openapi::Resource as _;

use super::*;

const NODE_METRICS: &str = r#"{
    "kind": "NodeMetrics",
    "apiVersion": "metrics.k8s.io/v1beta1",
    "metadata": {
        "name": "worker-1",
        "creationTimestamp": "2025-01-01T00:00:00Z"
    },
    "timestamp": "2025-01-01T00:00:00Z",
    "window": "20.052s",
    "usage": {
        "cpu": "2",
        "memory": "4Gi"
    }
}"#;

#[test]
fn node_metrics_from_metrics_server() {
    let metrics: NodeMetrics = serde_json::from_str(NODE_METRICS).unwrap();
    assert_eq!(metrics.metadata.name.as_deref(), Some("worker-1"));
    assert_eq!(metrics.window, Duration::from_millis(20_052));
    assert_eq!(metrics.cpu(), Ok(2.0));
    assert_eq!(metrics.memory(), Ok(4 * 1024 * 1024 * 1024));
    assert_eq!(metrics.storage(), Ok(0.0));
}

#[test]
fn storage_is_carried_when_reported() {
    let usage: Usage =
        serde_json::from_str(r#"{"cpu": "100m", "memory": "1Mi", "storage": "1Gi"}"#).unwrap();
    assert_eq!(usage.storage(), Ok(1_073_741_824.0));
}

#[test]
fn window_is_written_as_go_duration() {
    let metrics = NodeMetrics {
        window: Duration::from_secs(30),
        ..NodeMetrics::default()
    };
    let value = serde_json::to_value(&metrics).unwrap();
    assert_eq!(value["window"], "30s");
}

#[test]
fn rejects_malformed_window() {
    let text = NODE_METRICS.replace("20.052s", "soon");
    assert!(serde_json::from_str::<NodeMetrics>(&text).is_err());
}

#[test]
fn resource_constants() {
    assert_eq!(NodeMetrics::API_VERSION, "metrics.k8s.io/v1beta1");
    assert_eq!(NodeMetrics::URL_PATH_SEGMENT, "nodes");
}

#[test]
fn default_is_stamped_at_epoch() {
    let metrics = NodeMetrics::default();
    assert_eq!(metrics.timestamp, metav1::Time(Timestamp::UNIX_EPOCH));
    assert_eq!(metrics.window, Duration::ZERO);
}
