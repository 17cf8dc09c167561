use k8s_openapi::jiff::Timestamp;

use super::*;

pub trait TimeExt {
    fn now() -> metav1::Time;
}

impl TimeExt for metav1::Time {
    /// The current UTC time, the way the API server stamps objects.
    ///
    /// ```
    /// use k8s_metrics_ext::{metav1, TimeExt as _};
    ///
    /// let sampled = metav1::Time::now();
    /// assert!(sampled.0.as_second() > 0);
    /// ```
    fn now() -> metav1::Time {
        Self(Timestamp::now())
    }
}
