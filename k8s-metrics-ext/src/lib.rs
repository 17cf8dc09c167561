pub use k8s_metrics::metrics::v1beta1 as metricsv1;
pub use k8s_metrics::QuantityExt;
pub use k8s_openapi as openapi;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::api::resource;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

pub use node::{NodeExt, CPU, MEMORY};
pub use pod::PodExt;
pub use time::TimeExt;

use openapi::Resource;

mod node;
mod pod;
mod time;

pub trait NodeMetricsExt {
    fn new(name: impl ToString) -> Self;
    fn with_usage(self, cpu: &str, memory: &str) -> Self;
    fn with_storage(self, storage: &str) -> Self;
}

impl NodeMetricsExt for metricsv1::NodeMetrics {
    fn new(name: impl ToString) -> Self {
        let metadata = metav1::ObjectMeta::new(name).created(metav1::Time::now());
        Self {
            metadata,
            timestamp: metav1::Time::now(),
            ..default()
        }
    }

    fn with_usage(self, cpu: &str, memory: &str) -> Self {
        let usage = metricsv1::Usage {
            cpu: resource::Quantity(cpu.to_string()),
            memory: resource::Quantity(memory.to_string()),
            ..self.usage
        };
        Self { usage, ..self }
    }

    fn with_storage(self, storage: &str) -> Self {
        let usage = metricsv1::Usage {
            storage: Some(resource::Quantity(storage.to_string())),
            ..self.usage
        };
        Self { usage, ..self }
    }
}

pub trait ObjectMetaExt {
    fn new(name: impl ToString) -> Self;
    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self;
    fn created(self, ts: impl Into<Option<metav1::Time>>) -> Self;
}

impl ObjectMetaExt for metav1::ObjectMeta {
    fn new(name: impl ToString) -> Self {
        let name = Some(name.to_string());
        Self { name, ..default() }
    }

    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..Self::new(name)
        }
    }

    fn created(self, ts: impl Into<Option<metav1::Time>>) -> Self {
        Self {
            creation_timestamp: ts.into(),
            ..self
        }
    }
}

pub trait StatusExt {
    fn not_found<K>(name: impl ToString) -> Self
    where
        K: Resource;
}

impl StatusExt for metav1::Status {
    fn not_found<K>(name: impl ToString) -> Self
    where
        K: Resource,
    {
        let kind = K::URL_PATH_SEGMENT.to_string();
        let name = name.to_string();
        let code = 404;
        let message = format!(r#"{kind} "{name}" not found"#);
        let details = metav1::StatusDetails {
            name: Some(name),
            kind: Some(kind),
            ..default()
        };
        Self {
            code: Some(code),
            details: Some(details),
            message: Some(message),
            metadata: metav1::ListMeta::default(),
            reason: Some("NotFound".to_string()),
            status: Some("Failure".to_string()),
        }
    }
}

pub fn default<T: Default>() -> T {
    T::default()
}

#[cfg(test)]
mod tests;
