use std::fmt;
use std::time::Duration;

use super::*;

/// What a sampling loop does after a failed sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Stop this loop and, through [`Activation::run`], every other loop.
    Abort,
    /// Keep the last good state and try again after the delay.
    RetryAfter(Duration),
}

/// Decides how a sampling loop reacts to a failed sample.
///
/// `failures` counts consecutive failures for the node and starts at 1.
pub trait ErrorPolicy: fmt::Debug + Send + Sync + 'static {
    fn decide(&self, node: &str, error: &Error, failures: u32) -> Decision;
}

/// Any failed sample terminates the whole collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailFast;

impl ErrorPolicy for FailFast {
    fn decide(&self, _node: &str, _error: &Error, _failures: u32) -> Decision {
        Decision::Abort
    }
}

/// Failed samples are isolated to their node and retried with exponential backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
        }
    }

    pub fn delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(31);
        self.initial.saturating_mul(1 << exponent).min(self.max)
    }
}

impl ErrorPolicy for Backoff {
    fn decide(&self, _node: &str, _error: &Error, failures: u32) -> Decision {
        Decision::RetryAfter(self.delay(failures))
    }
}
