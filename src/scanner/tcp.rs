//! TCP connect prober.
//!
//! Performs a bare connect/disconnect using the operating system's socket
//! API. No payload is exchanged.

use crate::error::ScanError;
use crate::scanner::traits::{ProbeOutcome, Prober};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// TCP connect prober.
///
/// Uses standard socket connect() calls to determine port status.
/// Does not require elevated privileges.
#[derive(Debug, Clone)]
pub struct TcpConnectProber {
    timeout: Duration,
}

impl TcpConnectProber {
    /// Default per-port connection timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    /// Create a new prober with the given per-port connection timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The configured per-port timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TcpConnectProber {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, target: IpAddr, port: Port) -> ProbeOutcome {
        let addr = SocketAddr::new(target, port.as_u16());

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                ProbeOutcome::Open
            }
            Ok(Err(e)) => classify_error(addr, e),
            Err(_) => {
                trace!(%addr, "connect timed out");
                ProbeOutcome::Filtered
            }
        }
    }
}

/// Map a connect error onto closed, filtered or failed.
fn classify_error(addr: SocketAddr, e: io::Error) -> ProbeOutcome {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => ProbeOutcome::Closed,
        io::ErrorKind::TimedOut => ProbeOutcome::Filtered,
        _ if is_unreachable(&e) => ProbeOutcome::Filtered,
        _ => ProbeOutcome::Failed(ScanError::ConnectionFailed {
            target: addr.ip().to_string(),
            port: addr.port(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(unix)]
fn is_unreachable(e: &io::Error) -> bool {
    matches!(
        e.raw_os_error(),
        Some(code) if code == libc::EHOSTUNREACH || code == libc::ENETUNREACH
    )
}

#[cfg(not(unix))]
fn is_unreachable(e: &io::Error) -> bool {
    e.to_string().to_lowercase().contains("unreachable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn addr() -> SocketAddr {
        SocketAddr::new(LOCALHOST, 8080)
    }

    #[test]
    fn test_prober_defaults() {
        assert_eq!(TcpConnectProber::default().timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_refused_is_closed() {
        let outcome = classify_error(addr(), io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(matches!(outcome, ProbeOutcome::Closed));
    }

    #[test]
    fn test_timed_out_is_filtered() {
        let outcome = classify_error(addr(), io::Error::from(io::ErrorKind::TimedOut));
        assert!(matches!(outcome, ProbeOutcome::Filtered));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreachable_is_filtered() {
        for code in [libc::EHOSTUNREACH, libc::ENETUNREACH] {
            let outcome = classify_error(addr(), io::Error::from_raw_os_error(code));
            assert!(matches!(outcome, ProbeOutcome::Filtered));
        }
    }

    #[test]
    fn test_other_errors_fail_with_port() {
        let outcome = classify_error(addr(), io::Error::from(io::ErrorKind::PermissionDenied));
        match outcome {
            ProbeOutcome::Failed(ScanError::ConnectionFailed { port, target, .. }) => {
                assert_eq!(port, 8080);
                assert_eq!(target, "127.0.0.1");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let prober = TcpConnectProber::new(Duration::from_secs(1));
        assert!(prober.probe(LOCALHOST, port).await.is_open());
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        drop(listener);

        let prober = TcpConnectProber::new(Duration::from_secs(1));
        let outcome = prober.probe(LOCALHOST, port).await;
        assert!(matches!(outcome, ProbeOutcome::Closed | ProbeOutcome::Filtered));
    }
}
