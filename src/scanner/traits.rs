//! Prober trait abstraction.
//!
//! A prober performs the single connection attempt for one port. Keeping it
//! behind a trait lets the engine run against instrumented probers in tests.

use crate::error::ScanError;
use crate::types::Port;
use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

/// Classified result of probing one port.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The connection was established within the timeout.
    Open,
    /// The connection was actively refused.
    Closed,
    /// The attempt timed out or the host/network was unreachable.
    Filtered,
    /// Any other failure. Reported with the port, never fatal to the scan.
    Failed(ScanError),
}

impl ProbeOutcome {
    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
            Self::Failed(e) => write!(f, "error: {}", e),
        }
    }
}

/// Trait for single-port probe implementations.
///
/// Implementations make exactly one attempt per call and must not retry.
///
/// # Example
///
/// ```ignore
/// use portsweep::scanner::{Prober, ProbeOutcome};
///
/// async fn is_open<P: Prober>(prober: &P, ip: IpAddr, port: Port) -> bool {
///     prober.probe(ip, port).await.is_open()
/// }
/// ```
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single port on the target address.
    async fn probe(&self, target: IpAddr, port: Port) -> ProbeOutcome;
}

/// A shared prober for dynamic dispatch.
pub type SharedProber = Arc<dyn Prober>;
