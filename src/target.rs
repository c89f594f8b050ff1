use std::fmt::Display;

use crate::{config::ProbeConfig, error::ConfigError};

/// One (host, port) pair to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
    pub id: String,
}

impl ProbeTarget {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_owned(),
            port,
            id: format!("tcp-tcp@{}:{}", host, port),
        }
    }
}

impl Display for ProbeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Expands `hosts x ports` host-major. Duplicates are kept.
pub fn expand(config: &ProbeConfig) -> Result<Vec<ProbeTarget>, ConfigError> {
    config.validate()?;

    Ok(config
        .hosts
        .iter()
        .flat_map(|host| config.ports.iter().map(move |&port| ProbeTarget::new(host, port)))
        .collect())
}
