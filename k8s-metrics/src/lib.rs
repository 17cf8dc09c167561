use k8s_openapi::apimachinery::pkg::api::resource;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use k8s_openapi::jiff::Timestamp;
use serde::{Deserialize, Serialize};

pub use metrics::v1beta1;
pub use quantity::{QuantityExt, QuantityParseError};

pub mod metrics;

mod quantity;
