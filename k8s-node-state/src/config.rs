use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use time::ext::NumericalStdDuration as _;

use super::*;

pub const INTERVAL_ENV: &str = "NODE_STATE_INTERVAL";
pub const CAPACITY_ENV: &str = "NODE_STATE_CAPACITY";
pub const ON_ERROR_ENV: &str = "NODE_STATE_ON_ERROR";
pub const BACKOFF_MAX_ENV: &str = "NODE_STATE_BACKOFF_MAX";

/// Which node status list capacity is frozen from at discovery.
///
/// CPU capacity is kept in whole cores, rounded up, whichever list it comes
/// from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapacitySource {
    /// `status.capacity`, the node's total resources.
    #[default]
    Capacity,
    /// `status.allocatable`, what is left for pods after system reservations.
    ///
    /// Allocatable CPU is often fractional. `3920m` is frozen as 4 cores, so
    /// CPU percentages are taken against the rounded-up value and read
    /// slightly low.
    Allocatable,
}

impl CapacitySource {
    pub(crate) fn quantity<'a>(
        self,
        node: &'a corev1::Node,
        resource: &str,
    ) -> Option<&'a k8s::resource::Quantity> {
        match self {
            Self::Capacity => node.capacity(resource),
            Self::Allocatable => node.allocatable(resource),
        }
    }
}

impl fmt::Display for CapacitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capacity => f.write_str("status.capacity"),
            Self::Allocatable => f.write_str("status.allocatable"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Pause between two samples of the same node.
    pub interval: Duration,
    pub capacity_source: CapacitySource,
    pub policy: Arc<dyn ErrorPolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: 1.std_seconds(),
            capacity_source: CapacitySource::default(),
            policy: Arc::new(FailFast),
        }
    }
}

impl Config {
    /// Reads `NODE_STATE_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from `lookup`; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(INTERVAL_ENV) {
            config.interval = parse_duration(INTERVAL_ENV, &value)?;
        }

        if let Some(value) = lookup(CAPACITY_ENV) {
            config.capacity_source = match value.as_str() {
                "capacity" => CapacitySource::Capacity,
                "allocatable" => CapacitySource::Allocatable,
                _ => {
                    return Err(Error::config(
                        CAPACITY_ENV,
                        &value,
                        "expected capacity or allocatable",
                    ))
                }
            };
        }

        let backoff_max = match lookup(BACKOFF_MAX_ENV) {
            Some(value) => parse_duration(BACKOFF_MAX_ENV, &value)?,
            None => 30.std_seconds(),
        };

        if let Some(value) = lookup(ON_ERROR_ENV) {
            config.policy = match value.as_str() {
                "fail-fast" => Arc::new(FailFast),
                "backoff" => Arc::new(Backoff::new(config.interval, backoff_max)),
                _ => {
                    return Err(Error::config(
                        ON_ERROR_ENV,
                        &value,
                        "expected fail-fast or backoff",
                    ))
                }
            };
        }

        Ok(config)
    }

    pub fn with_interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    pub fn with_capacity_source(self, capacity_source: CapacitySource) -> Self {
        Self {
            capacity_source,
            ..self
        }
    }

    pub fn with_policy(self, policy: impl ErrorPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            ..self
        }
    }
}

/// Parses a positive Go-style duration such as `1s` or `500ms`.
pub(crate) fn parse_duration(key: &'static str, value: &str) -> Result<Duration> {
    let nanos = go_parse_duration::parse_duration(value)
        .map_err(|err| Error::config(key, value, format!("{err:?}")))?;
    u64::try_from(nanos)
        .ok()
        .filter(|nanos| *nanos > 0)
        .map(Duration::from_nanos)
        .ok_or_else(|| Error::config(key, value, "must be positive"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup<const N: usize>(
        vars: [(&'static str, &'static str); N],
    ) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup([])).unwrap();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.capacity_source, CapacitySource::Capacity);
        assert!(format!("{:?}", config.policy).contains("FailFast"));
    }

    #[test]
    fn reads_all_keys() {
        let config = Config::from_lookup(lookup([
            (INTERVAL_ENV, "500ms"),
            (CAPACITY_ENV, "allocatable"),
            (ON_ERROR_ENV, "backoff"),
            (BACKOFF_MAX_ENV, "1m"),
        ]))
        .unwrap();
        assert_eq!(config.interval, Duration::from_millis(500));
        assert_eq!(config.capacity_source, CapacitySource::Allocatable);
        assert!(format!("{:?}", config.policy).contains("Backoff"));
    }

    #[test]
    fn rejects_bad_values() {
        for (key, value) in [
            (INTERVAL_ENV, "often"),
            (INTERVAL_ENV, "0s"),
            (CAPACITY_ENV, "requests"),
            (ON_ERROR_ENV, "ignore"),
            (BACKOFF_MAX_ENV, "-1s"),
        ] {
            let err = Config::from_lookup(lookup([(key, value)])).unwrap_err();
            assert!(matches!(err, Error::Config { key: k, .. } if k == key), "{key}={value}");
        }
    }
}
