use std::env;
use std::net::SocketAddr;

use k8s_node_state::Config;
use k8s_node_state::Error;

pub(crate) const LISTEN_ENV: &str = "NODE_STATE_LISTEN";
pub(crate) const CADVISOR_STORAGE_ENV: &str = "NODE_STATE_CADVISOR_STORAGE";

const DEFAULT_LISTEN: &str = "0.0.0.0:2112";

#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) listen: SocketAddr,
    pub(crate) cadvisor_storage: bool,
    pub(crate) config: Config,
}

impl Settings {
    pub(crate) fn from_env() -> k8s_node_state::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> k8s_node_state::Result<Self> {
        let listen = lookup(LISTEN_ENV).unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen.parse().map_err(|err| Error::Config {
            key: LISTEN_ENV,
            value: listen.clone(),
            reason: format!("{err}"),
        })?;

        let cadvisor_storage = match lookup(CADVISOR_STORAGE_ENV).as_deref() {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(Error::Config {
                    key: CADVISOR_STORAGE_ENV,
                    value: other.to_string(),
                    reason: "expected true or false".to_string(),
                });
            }
        };

        let config = Config::from_lookup(lookup)?;
        Ok(Self {
            listen,
            cadvisor_storage,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings.listen, DEFAULT_LISTEN.parse::<SocketAddr>().unwrap());
        assert!(!settings.cadvisor_storage);
    }

    #[test]
    fn overrides() {
        let settings = Settings::from_lookup(|key| match key {
            LISTEN_ENV => Some("127.0.0.1:9100".to_string()),
            CADVISOR_STORAGE_ENV => Some("true".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(settings.listen.port(), 9100);
        assert!(settings.cadvisor_storage);
    }

    #[test]
    fn rejects_bad_listen_address() {
        let err = Settings::from_lookup(|key| (key == LISTEN_ENV).then(|| "nowhere".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config { key: LISTEN_ENV, .. }), "{err:?}");
    }
}
