use std::collections::BTreeMap;

use super::*;

pub const CPU: &str = "cpu";
pub const MEMORY: &str = "memory";

/// Lookups into a node's `status.capacity` and `status.allocatable` lists.
pub trait NodeExt {
    fn new(name: impl ToString) -> Self;
    fn capacity(&self, resource: &str) -> Option<&resource::Quantity>;
    fn allocatable(&self, resource: &str) -> Option<&resource::Quantity>;
    fn with_capacity(self, cpu: &str, memory: &str) -> Self;
    fn with_allocatable(self, cpu: &str, memory: &str) -> Self;
}

impl NodeExt for corev1::Node {
    fn new(name: impl ToString) -> Self {
        Self {
            metadata: metav1::ObjectMeta::new(name),
            ..default()
        }
    }

    fn capacity(&self, resource: &str) -> Option<&resource::Quantity> {
        self.status.as_ref()?.capacity.as_ref()?.get(resource)
    }

    fn allocatable(&self, resource: &str) -> Option<&resource::Quantity> {
        self.status.as_ref()?.allocatable.as_ref()?.get(resource)
    }

    fn with_capacity(mut self, cpu: &str, memory: &str) -> Self {
        self.status.get_or_insert_with(default).capacity = Some(resource_list(cpu, memory));
        self
    }

    fn with_allocatable(mut self, cpu: &str, memory: &str) -> Self {
        self.status.get_or_insert_with(default).allocatable = Some(resource_list(cpu, memory));
        self
    }
}

fn resource_list(cpu: &str, memory: &str) -> BTreeMap<String, resource::Quantity> {
    BTreeMap::from([
        (CPU.to_string(), resource::Quantity(cpu.to_string())),
        (MEMORY.to_string(), resource::Quantity(memory.to_string())),
    ])
}
