use std::{
    io::{self, ErrorKind as IoKind},
    net::SocketAddr,
};

use super::ErrorInfo;

/// Closed set of transport failures a connect attempt can end in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialFailure {
    Refused,
    TimedOut,
    NetworkUnreachable,
    /// Rendered as `connect: no route to host`, apart from the refused,
    /// timeout and network-unreachable texts.
    HostUnreachable,
    Other(String),
}

impl From<&io::Error> for DialFailure {
    fn from(e: &io::Error) -> Self {
        match e.raw_os_error() {
            Some(libc::ECONNREFUSED) => DialFailure::Refused,
            Some(libc::ETIMEDOUT) => DialFailure::TimedOut,
            Some(libc::ENETUNREACH) => DialFailure::NetworkUnreachable,
            Some(libc::EHOSTUNREACH) => DialFailure::HostUnreachable,
            // connect_timeout reports its own deadline without an errno.
            _ => match e.kind() {
                IoKind::ConnectionRefused => DialFailure::Refused,
                IoKind::TimedOut | IoKind::WouldBlock => DialFailure::TimedOut,
                _ => DialFailure::Other(e.to_string()),
            },
        }
    }
}

impl DialFailure {
    fn cause(&self) -> &str {
        match self {
            DialFailure::Refused => "connect: connection refused",
            DialFailure::TimedOut => "i/o timeout",
            DialFailure::NetworkUnreachable => "connect: network is unreachable",
            DialFailure::HostUnreachable => "connect: no route to host",
            DialFailure::Other(native) => native,
        }
    }
}

/// Renders a failure against the address it happened on.
pub fn classify(failure: &DialFailure, addr: &SocketAddr) -> ErrorInfo {
    log::debug!("Dial to `{}` classified as {:?}", addr, failure);

    ErrorInfo::io(format!("dial tcp {}: {}", addr, failure.cause()))
}
