use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one host is required")]
    NoHosts,
    #[error("at least one port is required")]
    NoPorts,
    #[error("host entries can't be blank")]
    EmptyHost,
    #[error("port `{0}` is invalid (expected 1-65535)")]
    InvalidPort(String),
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}
