use super::*;

#[test]
fn node_capacity_lookup() {
    let node = corev1::Node::new("worker-1").with_capacity("4", "8Gi");
    assert_eq!(node.capacity(CPU), Some(&resource::Quantity("4".to_string())));
    assert_eq!(node.capacity(MEMORY), Some(&resource::Quantity("8Gi".to_string())));
    assert_eq!(node.allocatable(CPU), None);
}

#[test]
fn node_without_status_has_no_capacity() {
    let node = corev1::Node::new("worker-1");
    assert!(node.capacity(CPU).is_none());
    assert!(node.allocatable(MEMORY).is_none());
}

#[test]
fn pod_node_name() {
    let pod = corev1::Pod::new("web", "default");
    assert_eq!(pod.node_name(), None);
    let pod = pod.scheduled_on("worker-1");
    assert_eq!(pod.node_name(), Some("worker-1"));
    assert_eq!(pod.metadata.namespace.as_deref(), Some("default"));
}

#[test]
fn node_metrics_builder() {
    let metrics = metricsv1::NodeMetrics::new("worker-1")
        .with_usage("2", "4Gi")
        .with_storage("1Gi");
    assert_eq!(metrics.metadata.name.as_deref(), Some("worker-1"));
    assert_eq!(metrics.cpu(), Ok(2.0));
    assert_eq!(metrics.storage(), Ok(1_073_741_824.0));
}

#[test]
fn status_not_found() {
    let status = metav1::Status::not_found::<corev1::Node>("worker-9");
    assert_eq!(status.code, Some(404));
    assert_eq!(status.reason.as_deref(), Some("NotFound"));
    assert_eq!(status.message.as_deref(), Some(r#"nodes "worker-9" not found"#));
}

#[test]
fn new_node_metrics_are_stamped_now() {
    let metrics = metricsv1::NodeMetrics::new("worker-1");
    assert!(metrics.timestamp > metricsv1::NodeMetrics::default().timestamp);
}
