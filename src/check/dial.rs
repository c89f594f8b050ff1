use std::{
    net::{IpAddr, SocketAddr, TcpStream},
    time::{Duration, Instant},
};

use super::{
    classify::{classify, DialFailure},
    ErrorInfo,
};

/// Outcome of the dial phase for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialOutcome {
    pub connected: bool,
    pub duration: Duration,
    pub error: Option<ErrorInfo>,
}

/// Completes a TCP handshake with `ip:port` and closes it right away.
pub fn dial(ip: IpAddr, port: u16, timeout: Duration) -> DialOutcome {
    let addr = SocketAddr::new(ip, port);

    log::debug!("Dialing `{}` (timeout {:?})", addr, timeout);

    let start = Instant::now();
    let attempt = TcpStream::connect_timeout(&addr, timeout);
    let duration = start.elapsed();

    match attempt {
        Ok(stream) => {
            drop(stream);

            log::debug!("Connected to `{}` in {:?}", addr, duration);

            DialOutcome {
                connected: true,
                duration,
                error: None,
            }
        }
        Err(e) => DialOutcome {
            connected: false,
            duration,
            error: Some(classify(&DialFailure::from(&e), &addr)),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, TcpListener};

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(2);
    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn connects_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let out = dial(LOCALHOST, port, TIMEOUT);
        assert!(out.connected);
        assert!(out.error.is_none());
    }

    #[test]
    fn refused_when_nothing_listens() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let out = dial(LOCALHOST, port, TIMEOUT);
        assert!(!out.connected);
        assert_eq!(
            out.error.unwrap().message,
            format!("dial tcp 127.0.0.1:{}: connect: connection refused", port)
        );
    }
}
