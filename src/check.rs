use std::{
    fmt::Display,
    net::{IpAddr, SocketAddr},
    time::{Duration, Instant},
};

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;

use crate::{
    config::ProbeConfig,
    error::ConfigError,
    resolver::{self, ResolveOutcome},
    target::{self, ProbeTarget},
};

pub use self::dial::DialOutcome;

pub mod classify;
pub mod dial;
mod event;

/// Failure taxonomy exposed on results. Only `Io` is produced today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ErrorKind {
    Io,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ErrorKind::Io => "io",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub kind: ErrorKind,
}

impl ErrorInfo {
    pub fn io(message: String) -> Self {
        Self {
            message,
            kind: ErrorKind::Io,
        }
    }

    pub(crate) fn lookup(host: &str, cause: &str) -> Self {
        Self::io(format!("lookup {}: {}", host, cause))
    }

    pub(crate) fn no_address(host: &str) -> Self {
        Self::lookup(host, "no suitable address found")
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Status::Up => "up",
                Status::Down => "down",
            }
        )
    }
}

/// Result of one target's resolve and dial pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub target: ProbeTarget,
    pub status: Status,
    pub resolved_ip: Option<IpAddr>,
    pub resolve: ResolveOutcome,
    pub dial: Option<DialOutcome>,
    pub error: Option<ErrorInfo>,
    /// Sum of both phases.
    pub duration: Duration,
}

impl CheckResult {
    pub fn is_up(&self) -> bool {
        self.status == Status::Up
    }
}

/// Combines the phase outcomes of `target` into its result.
///
/// A failed resolve wins and any dial outcome is discarded. After a
/// successful resolve the dial outcome decides the status; a missing one
/// counts as a failed dial.
pub fn assemble(
    target: &ProbeTarget,
    resolve: ResolveOutcome,
    dial: Option<DialOutcome>,
) -> CheckResult {
    let ip = match resolve.ip() {
        Some(ip) => ip,
        None => {
            let error = resolve
                .error
                .clone()
                .unwrap_or_else(|| ErrorInfo::no_address(&target.host));
            return CheckResult {
                target: target.clone(),
                status: Status::Down,
                resolved_ip: None,
                duration: resolve.duration,
                resolve,
                dial: None,
                error: Some(error),
            };
        }
    };

    let (status, error) = match &dial {
        Some(d) if d.connected => (Status::Up, None),
        Some(d) => (Status::Down, d.error.clone()),
        None => (Status::Down, None),
    };
    let error = match (status, error) {
        (Status::Down, None) => Some(ErrorInfo::io(format!(
            "dial tcp {}: not attempted",
            SocketAddr::new(ip, target.port)
        ))),
        (_, error) => error,
    };

    CheckResult {
        target: target.clone(),
        status,
        resolved_ip: Some(ip),
        duration: resolve.duration + dial.as_ref().map_or(Duration::ZERO, |d| d.duration),
        resolve,
        dial,
        error,
    }
}

/// Results of one run over every target of a job.
#[derive(Debug)]
pub struct JobReport {
    pub elapsed: Duration,
    pub results: Vec<CheckResult>,
}

impl JobReport {
    #[inline]
    fn new(elapsed: Duration, results: Vec<CheckResult>) -> Self {
        Self { elapsed, results }
    }

    pub fn all_up(&self) -> bool {
        self.results.iter().all(CheckResult::is_up)
    }
}

/// A validated configuration and its expanded targets.
#[derive(Debug, Clone)]
pub struct Job {
    config: ProbeConfig,
    targets: Vec<ProbeTarget>,
}

impl Job {
    pub fn new(config: ProbeConfig) -> Result<Self, ConfigError> {
        let targets = target::expand(&config)?;
        Ok(Self { config, targets })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn targets(&self) -> &[ProbeTarget] {
        &self.targets
    }

    /// Runs a single resolve then dial attempt for `target`.
    pub fn run_target(&self, target: &ProbeTarget) -> CheckResult {
        let resolve = resolver::resolve(&target.host, self.config.ip_family, self.config.timeout);

        let dial = resolve
            .ip()
            .map(|ip| dial::dial(ip, target.port, self.config.timeout));

        let result = assemble(target, resolve, dial);

        log::debug!("Target `{}` is {}", target, result.status);

        result
    }

    /// Checks every target on the rayon pool; results keep target order.
    pub fn run(&self) -> JobReport {
        let now = Instant::now();
        let results = self
            .targets
            .par_iter()
            .map(|t| self.run_target(t))
            .collect();
        let elapsed = now.elapsed();

        JobReport::new(elapsed, results)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn resolved() -> ResolveOutcome {
        ResolveOutcome {
            resolved_ip: Some(LOCALHOST),
            duration: Duration::from_micros(5),
            looked_up: true,
            error: None,
        }
    }

    fn dialed(connected: bool) -> DialOutcome {
        DialOutcome {
            connected,
            duration: Duration::from_micros(7),
            error: (!connected).then(|| ErrorInfo::io("dial tcp 127.0.0.1:80: i/o timeout".into())),
        }
    }

    #[test]
    fn both_phases_ok_is_up() {
        let target = ProbeTarget::new("localhost", 80);
        let result = assemble(&target, resolved(), Some(dialed(true)));

        assert_eq!(result.status, Status::Up);
        assert_eq!(result.resolved_ip, Some(LOCALHOST));
        assert!(result.error.is_none());
        assert_eq!(result.duration, Duration::from_micros(12));
    }

    #[test]
    fn dial_failure_is_down_with_dial_error() {
        let target = ProbeTarget::new("localhost", 80);
        let result = assemble(&target, resolved(), Some(dialed(false)));

        assert_eq!(result.status, Status::Down);
        assert_eq!(result.resolved_ip, Some(LOCALHOST));
        assert_eq!(
            result.error.unwrap().message,
            "dial tcp 127.0.0.1:80: i/o timeout"
        );
    }

    #[test]
    fn resolve_failure_short_circuits() {
        let target = ProbeTarget::new("nope.invalid", 80);
        let failed = ResolveOutcome {
            resolved_ip: None,
            duration: Duration::from_micros(9),
            looked_up: true,
            error: Some(ErrorInfo::lookup("nope.invalid", "i/o timeout")),
        };
        let result = assemble(&target, failed, Some(dialed(true)));

        assert_eq!(result.status, Status::Down);
        assert!(result.dial.is_none());
        assert!(result.resolved_ip.is_none());
        assert_eq!(result.error.unwrap().message, "lookup nope.invalid: i/o timeout");
    }

    #[test]
    fn missing_dial_is_down() {
        let target = ProbeTarget::new("localhost", 80);
        let result = assemble(&target, resolved(), None);

        assert_eq!(result.status, Status::Down);
        assert_eq!(result.error.unwrap().kind, ErrorKind::Io);
    }

    #[test]
    fn job_rejects_bad_config() {
        let err = Job::new(ProbeConfig::new(vec!["localhost".into()], vec![])).unwrap_err();
        assert_eq!(err, ConfigError::NoPorts);
    }

    #[test]
    fn job_exposes_targets() {
        let cfg = ProbeConfig::new(vec!["a".into(), "b".into()], vec![1, 2]);
        let job = Job::new(cfg.clone()).unwrap();

        assert_eq!(job.config(), &cfg);
        assert_eq!(job.targets().len(), 4);
        assert_eq!(job.targets()[1].id, "tcp-tcp@a:2");
    }
}
