use super::*;

pub trait PodExt {
    fn new(name: impl ToString, namespace: impl ToString) -> Self;
    /// The node the scheduler assigned this pod to, if any.
    fn node_name(&self) -> Option<&str>;
    fn scheduled_on(self, node: impl ToString) -> Self;
}

impl PodExt for corev1::Pod {
    fn new(name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            metadata: metav1::ObjectMeta::with_namespace(name, namespace),
            ..default()
        }
    }

    fn node_name(&self) -> Option<&str> {
        self.spec.as_ref()?.node_name.as_deref()
    }

    fn scheduled_on(mut self, node: impl ToString) -> Self {
        self.spec.get_or_insert_with(default).node_name = Some(node.to_string());
        self
    }
}
