//! Scan target resolution.
//!
//! A target is resolved exactly once, before any port is probed, so that an
//! unresolvable host surfaces as a single scan-level error instead of a
//! connection failure on every port.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A scan target that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }

    /// Resolve a hostname or IP address string.
    ///
    /// IP literals are used as-is. Anything else goes through DNS and the
    /// first returned address is kept.
    pub async fn resolve(host: &str) -> Result<Self, TargetError> {
        let host = host.trim();

        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(Self::new(host, ip));
        }

        // Bracketed IPv6 literals, e.g. "[::1]".
        if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            if let Ok(ip) = inner.parse::<IpAddr>() {
                return Ok(Self::new(host, ip));
            }
        }

        check_hostname(host)?;

        let response = system_resolver()
            .lookup_ip(host)
            .await
            .map_err(|e| TargetError::DnsResolutionFailed(host.to_string(), e.to_string()))?;

        response
            .iter()
            .next()
            .map(|ip| Self::new(host, ip))
            .ok_or_else(|| TargetError::NoAddressesFound(host.to_string()))
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: '{0}'")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

/// Longest name DNS can carry in presentation form.
const MAX_HOSTNAME_LEN: usize = 253;

/// Reject only what can never be looked up. Label syntax is left to the
/// resolver, which accepts names like `my_service`.
fn check_hostname(host: &str) -> Result<(), TargetError> {
    if host.is_empty() || host.len() > MAX_HOSTNAME_LEN {
        return Err(TargetError::InvalidFormat(host.to_string()));
    }
    Ok(())
}

/// The system resolver configuration (`/etc/resolv.conf`, hosts file), or
/// the public defaults when none can be read.
fn system_resolver() -> TokioAsyncResolver {
    TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
        debug!(error = %e, "no usable system resolver config, using defaults");
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolve_ipv4_literal() {
        let target = ScanTarget::resolve("127.0.0.1").await.unwrap();
        assert_eq!(target.ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(target.to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_resolve_ipv6_literals() {
        let plain = ScanTarget::resolve("::1").await.unwrap();
        assert_eq!(plain.ip, IpAddr::V6(Ipv6Addr::LOCALHOST));

        let bracketed = ScanTarget::resolve("[::1]").await.unwrap();
        assert_eq!(bracketed.ip, IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(bracketed.to_string(), "[::1] (::1)");
    }

    #[tokio::test]
    async fn test_resolve_rejects_unusable_host() {
        let err = ScanTarget::resolve("   ").await.unwrap_err();
        assert!(matches!(err, TargetError::InvalidFormat(_)));

        let too_long = "a".repeat(MAX_HOSTNAME_LEN + 1);
        let err = ScanTarget::resolve(&too_long).await.unwrap_err();
        assert!(matches!(err, TargetError::InvalidFormat(_)));
    }

    #[test]
    fn test_hostname_syntax_is_left_to_resolver() {
        assert!(check_hostname("example.com").is_ok());
        assert!(check_hostname("my_service").is_ok());
        assert!(check_hostname("-leading-dash").is_ok());
        assert!(check_hostname("").is_err());
    }

    #[tokio::test]
    async fn test_underscore_hostname_is_looked_up() {
        // Offline runs may stall on the lookup; only a syntactic rejection fails.
        let result =
            tokio::time::timeout(Duration::from_secs(20), ScanTarget::resolve("my_service")).await;

        if let Ok(resolved) = result {
            assert!(
                !matches!(resolved, Err(TargetError::InvalidFormat(_))),
                "underscore name rejected before lookup: {:?}",
                resolved
            );
        }
    }
}
