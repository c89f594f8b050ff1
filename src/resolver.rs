use std::{
    io,
    net::{IpAddr, ToSocketAddrs},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use url::Host;

use crate::{check::ErrorInfo, config::IpFamily};

/// Outcome of the resolve phase for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutcome {
    pub resolved_ip: Option<IpAddr>,
    pub duration: Duration,
    /// False when the host was a literal address and no query went out.
    pub looked_up: bool,
    pub error: Option<ErrorInfo>,
}

impl ResolveOutcome {
    fn literal(ip: IpAddr) -> Self {
        Self {
            resolved_ip: Some(ip),
            duration: Duration::ZERO,
            looked_up: false,
            error: None,
        }
    }

    fn failed(error: ErrorInfo, duration: Duration, looked_up: bool) -> Self {
        Self {
            resolved_ip: None,
            duration,
            looked_up,
            error: Some(error),
        }
    }

    /// The resolved address, if the phase succeeded.
    pub fn ip(&self) -> Option<IpAddr> {
        self.resolved_ip.filter(|_| self.error.is_none())
    }

    pub fn is_ok(&self) -> bool {
        self.ip().is_some()
    }
}

enum Parsed {
    Literal(IpAddr),
    Domain(String),
}

fn parse(host: &str) -> Result<Parsed, url::ParseError> {
    // Bare IPv6 literals are rejected by the URL host parser.
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(Parsed::Literal(ip));
    }

    Ok(match Host::parse(host)? {
        Host::Domain(dmn) => Parsed::Domain(dmn),
        Host::Ipv4(ip) => Parsed::Literal(IpAddr::V4(ip)),
        Host::Ipv6(ip) => Parsed::Literal(IpAddr::V6(ip)),
    })
}

/// Picks the first address allowed by `family`, in answer order.
fn pick(addrs: &[IpAddr], family: IpFamily) -> Option<IpAddr> {
    let first_v4 = || addrs.iter().find(|ip| ip.is_ipv4()).copied();
    let first_v6 = || addrs.iter().find(|ip| ip.is_ipv6()).copied();

    match family {
        IpFamily::Ipv4 => first_v4(),
        IpFamily::Ipv6 => first_v6(),
        IpFamily::Any => first_v4().or_else(first_v6),
    }
}

/// Address lookup performed off the caller's thread.
type Lookup = fn(&str) -> io::Result<Vec<IpAddr>>;

fn system_addrs(name: &str) -> io::Result<Vec<IpAddr>> {
    (name, 0 /* dummy port */)
        .to_socket_addrs()
        .map(|saddrs| saddrs.map(|saddr| saddr.ip()).collect())
}

/// Runs `lookup` on a helper thread and waits at most `timeout`.
///
/// A lookup that outlives the deadline is abandoned; its answer is dropped
/// together with the channel.
fn bounded_lookup(domain: &str, timeout: Duration, lookup: Lookup) -> Result<Vec<IpAddr>, String> {
    let (tx, rx) = mpsc::channel();
    let name = domain.to_owned();

    thread::Builder::new()
        .name(String::from("tcpmon-resolve"))
        .spawn(move || {
            let _ = tx.send(lookup(&name));
        })
        .map_err(|e| e.to_string())?;

    match rx.recv_timeout(timeout) {
        Ok(Ok(addrs)) => Ok(addrs),
        Ok(Err(e)) => Err(e.to_string()),
        Err(RecvTimeoutError::Timeout) => Err(String::from("i/o timeout")),
        Err(RecvTimeoutError::Disconnected) => Err(String::from("resolver exited unexpectedly")),
    }
}

/// Resolves `host` to a single address.
pub fn resolve(host: &str, family: IpFamily, timeout: Duration) -> ResolveOutcome {
    resolve_with(host, family, timeout, system_addrs)
}

fn resolve_with(host: &str, family: IpFamily, timeout: Duration, lookup: Lookup) -> ResolveOutcome {
    let start = Instant::now();

    let domain = match parse(host) {
        Ok(Parsed::Literal(ip)) => {
            return match pick(&[ip], family) {
                Some(ip) => ResolveOutcome::literal(ip),
                None => ResolveOutcome::failed(ErrorInfo::no_address(host), start.elapsed(), false),
            };
        }
        Ok(Parsed::Domain(dmn)) => dmn,
        Err(e) => {
            return ResolveOutcome::failed(
                ErrorInfo::lookup(host, &e.to_string()),
                start.elapsed(),
                false,
            );
        }
    };

    let answer = bounded_lookup(&domain, timeout, lookup);
    let duration = start.elapsed();

    match answer {
        Ok(addrs) => match pick(&addrs, family) {
            Some(ip) => {
                log::debug!("Resolved `{}` to `{}` in {:?}", host, ip, duration);

                ResolveOutcome {
                    resolved_ip: Some(ip),
                    duration,
                    looked_up: true,
                    error: None,
                }
            }
            None => {
                log::debug!("No {} address among {:?} for `{}`", family, addrs, host);
                ResolveOutcome::failed(ErrorInfo::no_address(host), duration, true)
            }
        },
        Err(cause) => {
            log::debug!("Lookup of `{}` failed: {}", host, cause);
            ResolveOutcome::failed(ErrorInfo::lookup(host, &cause), duration, true)
        }
    }
}
