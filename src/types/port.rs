//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` and `PortSpec` handle user-supplied port specifications.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::debug;

/// A validated network port number (1-65535).
///
/// Using a newtype prevents accidental misuse of raw u16 values
/// and ensures port numbers are always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u16),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// A range of ports (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start.0 > end.0 {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in this range, ascending.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// Parses one element of a port list.
///
/// Accepts `a..b` and `a-b` (inclusive), `a...b` (end excluded) and a bare
/// port number.
impl FromStr for PortRange {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        // "..." has to be tried before ".." since the latter is a prefix.
        if let Some((start, end)) = s.split_once("...") {
            let start = parse_port(start)?;
            let end = parse_port(end)?;
            if end.0 <= start.0 {
                return Err(PortError::InvalidRange(start.0, end.0));
            }
            return Self::new(start, Port(end.0 - 1));
        }

        if let Some((start, end)) = s.split_once("..").or_else(|| s.split_once('-')) {
            return Self::new(parse_port(start)?, parse_port(end)?);
        }

        parse_port(s).map(Self::single)
    }
}

fn parse_port(s: &str) -> Result<Port, PortError> {
    let s = s.trim();
    let value: u16 = s
        .parse()
        .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
    Port::try_from(value)
}

/// The ordered set of ports a scan will probe.
///
/// Ports are distinct and kept in specification order: comma lists keep the
/// order they were given in, ranges expand ascending. A `PortSpec` is never
/// empty.
///
/// Supported string formats:
/// - Single port: "80"
/// - Comma-separated: "22,80,443"
/// - Range: "1..1024", "1-1024", or "1...1025" (end excluded)
/// - Mixed: "22,80,8000..8010"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    ports: Vec<Port>,
}

impl PortSpec {
    /// First port of the fallback range.
    pub const DEFAULT_START: u16 = 1;
    /// Last port of the fallback range.
    pub const DEFAULT_END: u16 = 1024;

    /// The fallback range 1..=1024.
    pub fn default_range() -> Self {
        Self {
            ports: (Self::DEFAULT_START..=Self::DEFAULT_END).map(Port).collect(),
        }
    }

    /// Parse a port specification, substituting the default range when the
    /// input cannot be parsed.
    pub fn parse_or_default(spec: &str) -> Self {
        match spec.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(input = spec, error = %e, "unparseable port spec, using default range");
                Self::default_range()
            }
        }
    }

    /// Build a specification from a native inclusive range.
    ///
    /// Ranges that are empty or include port 0 yield the default range.
    pub fn from_range(range: RangeInclusive<u16>) -> Self {
        let (start, end) = (*range.start(), *range.end());
        match (Port::new(start), Port::new(end)) {
            (Some(start), Some(end)) if start <= end => Self {
                ports: (start.0..=end.0).map(Port).collect(),
            },
            _ => {
                debug!(start, end, "invalid port range, using default range");
                Self::default_range()
            }
        }
    }

    /// Build a specification from already-expanded port numbers.
    ///
    /// Duplicates are dropped, keeping the first occurrence. An empty list
    /// or one containing port 0 yields the default range.
    pub fn from_ports<I>(ports: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        let parsed: Result<Vec<Port>, PortError> =
            ports.into_iter().map(Port::try_from).collect();
        match parsed {
            Ok(ports) if !ports.is_empty() => Self {
                ports: distinct(ports),
            },
            Ok(_) => Self::default_range(),
            Err(e) => {
                debug!(error = %e, "invalid port list, using default range");
                Self::default_range()
            }
        }
    }

    /// Iterate over the ports in specification order.
    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }

    /// The ports in specification order.
    pub fn as_slice(&self) -> &[Port] {
        &self.ports
    }

    /// Number of distinct ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl Default for PortSpec {
    fn default() -> Self {
        Self::default_range()
    }
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut ports = Vec::new();
        for part in s.split(',') {
            let range: PortRange = part.parse()?;
            ports.extend(range.iter());
        }

        Ok(Self {
            ports: distinct(ports),
        })
    }
}

/// Renders consecutive ascending runs as `a..b`, joined by commas.
impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut runs: Vec<PortRange> = Vec::new();
        for &port in &self.ports {
            match runs.last_mut() {
                Some(run) if run.end.0.checked_add(1) == Some(port.0) => run.end = port,
                _ => runs.push(PortRange::single(port)),
            }
        }
        let parts: Vec<String> = runs.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

fn distinct(ports: Vec<Port>) -> Vec<Port> {
    let mut seen = HashSet::with_capacity(ports.len());
    ports.into_iter().filter(|p| seen.insert(*p)).collect()
}
