use thiserror::Error;

use super::*;

/// Boxed error from a [`ClusterMetadata`] implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to discover cluster nodes")]
    Discovery(#[source] BoxError),

    #[error("failed to sample usage for node {node:?}")]
    Sample {
        node: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to list pods in namespace {namespace:?} for node {node:?}")]
    Pods {
        node: String,
        namespace: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid {resource} quantity for node {node:?}")]
    Quantity {
        node: String,
        resource: &'static str,
        #[source]
        source: QuantityParseError,
    },

    #[error("node {node:?} reports no {resource} in {list}")]
    MissingCapacity {
        node: String,
        resource: &'static str,
        list: CapacitySource,
    },

    #[error("node {node:?} reports zero {resource} capacity")]
    ZeroCapacity {
        node: String,
        resource: &'static str,
    },

    #[error("nodes {first:?} and {second:?} both map to gauge prefix {prefix:?}")]
    GaugeNameCollision {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("failed to register gauges")]
    Registry(#[from] prometheus::Error),

    #[error("invalid {key}={value:?}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("sampling loop for node {node:?} has stopped")]
    SamplerStopped { node: String },

    #[error("sampling task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn discovery(err: impl Into<BoxError>) -> Self {
        Self::Discovery(err.into())
    }

    pub(crate) fn sample(node: &str, err: impl Into<BoxError>) -> Self {
        Self::Sample {
            node: node.to_string(),
            source: err.into(),
        }
    }

    pub(crate) fn pods(node: &str, namespace: &str, err: impl Into<BoxError>) -> Self {
        Self::Pods {
            node: node.to_string(),
            namespace: namespace.to_string(),
            source: err.into(),
        }
    }

    pub(crate) fn config(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Config {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
