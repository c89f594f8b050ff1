//! TCP reachability checks for uptime monitoring.
//!
//! A [`config::ProbeConfig`] expands into one target per host and port. Each
//! target is resolved, dialed once and reported as a [`check::CheckResult`].

#[cfg(not(unix))]
std::compile_error!("only unix targets are supported");

pub mod check;
pub mod config;
pub mod error;
pub mod logger;
pub mod resolver;
pub mod target;

pub use check::{CheckResult, ErrorInfo, ErrorKind, Job, JobReport, Status};
pub use config::{IpFamily, ProbeConfig};
pub use error::ConfigError;
pub use target::ProbeTarget;
