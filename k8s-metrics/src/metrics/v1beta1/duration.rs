//! `window` is a Go `time.Duration` on the wire, e.g. `"20.052s"` or `"1m0s"`.

use std::time::Duration;

use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serializer;

pub(super) fn serialize<S>(window: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = if window.subsec_nanos() == 0 {
        format!("{}s", window.as_secs())
    } else {
        format!("{}s", window.as_secs_f64())
    };
    serializer.serialize_str(&text)
}

pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = <String as Deserialize<'de>>::deserialize(deserializer)?;
    let nanos = go_parse_duration::parse_duration(&text)
        .map_err(|err| de::Error::custom(format!("invalid duration {text:?}: {err:?}")))?;
    u64::try_from(nanos)
        .map(Duration::from_nanos)
        .map_err(|_| de::Error::custom(format!("negative duration {text:?}")))
}
