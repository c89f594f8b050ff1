use std::{fmt::Display, time::Duration};

use crate::error::ConfigError;

/// Default per-phase bound for the resolve and dial steps.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(16);

/// Address family a resolved host must belong to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    Ipv4,
    Ipv6,
    /// First IPv4 address, falling back to the first IPv6 one.
    #[default]
    Any,
}

impl Display for IpFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                IpFamily::Ipv4 => "ipv4",
                IpFamily::Ipv6 => "ipv6",
                IpFamily::Any => "any",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub hosts: Vec<String>,
    pub ports: Vec<u16>,
    pub timeout: Duration,
    pub ip_family: IpFamily,
}

impl ProbeConfig {
    pub fn new(hosts: Vec<String>, ports: Vec<u16>) -> Self {
        Self {
            hosts,
            ports,
            timeout: DEFAULT_TIMEOUT,
            ip_family: IpFamily::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_ip_family(mut self, ip_family: IpFamily) -> Self {
        self.ip_family = ip_family;
        self
    }

    /// Rejects configurations that can't produce a runnable job.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.is_empty() {
            return Err(ConfigError::NoHosts);
        }
        if self.ports.is_empty() {
            return Err(ConfigError::NoPorts);
        }
        if self.hosts.iter().any(|h| h.trim().is_empty()) {
            return Err(ConfigError::EmptyHost);
        }
        if let Some(port) = self.ports.iter().find(|&&p| p == 0) {
            return Err(ConfigError::InvalidPort(port.to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }
}

/// Parses a textual port, accepting only 1-65535.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(ConfigError::InvalidPort(String::from(raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(hosts: &[&str], ports: &[u16]) -> ProbeConfig {
        ProbeConfig::new(hosts.iter().map(|h| h.to_string()).collect(), ports.to_vec())
    }

    #[test]
    fn defaults() {
        let cfg = config(&["localhost"], &[80]);
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
        assert_eq!(cfg.ip_family, IpFamily::Any);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_lists() {
        assert_eq!(config(&[], &[80]).validate(), Err(ConfigError::NoHosts));
        assert_eq!(config(&["a"], &[]).validate(), Err(ConfigError::NoPorts));
    }

    #[test]
    fn rejects_port_zero_and_blank_host() {
        assert_eq!(
            config(&["a"], &[22, 0]).validate(),
            Err(ConfigError::InvalidPort("0".into()))
        );
        assert_eq!(config(&["a", " "], &[22]).validate(), Err(ConfigError::EmptyHost));
    }

    #[test]
    fn rejects_zero_timeout() {
        let cfg = config(&["a"], &[22]).with_timeout(Duration::ZERO);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn port_parsing() {
        assert_eq!(parse_port("443"), Ok(443));
        assert_eq!(parse_port(" 65535 "), Ok(65535));
        assert!(matches!(parse_port("0"), Err(ConfigError::InvalidPort(_))));
        assert!(matches!(parse_port("65536"), Err(ConfigError::InvalidPort(_))));
        assert!(matches!(parse_port("http"), Err(ConfigError::InvalidPort(_))));
    }
}
