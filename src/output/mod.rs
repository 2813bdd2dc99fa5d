//! Result reporting.
//!
//! Workers report open ports and probe failures through a [`ScanReporter`]
//! as soon as they happen. Two reporters exist, matching the two output
//! modes: human-readable lines and structured JSON log records.

mod plain;
mod structured;

pub use plain::{print_error, print_warning, HumanReporter};
pub use structured::StructuredReporter;

use crate::error::ScanError;
use crate::scanner::ScanStats;
use crate::types::{Port, PortSpec, ScanTarget};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Receives scan events from concurrent workers.
///
/// `port_open` and `probe_failed` are called from many workers at once;
/// implementations must emit each event as one uninterrupted line. The
/// start and finish hooks are optional.
pub trait ScanReporter: Send + Sync {
    /// Called once before any port is probed.
    fn scan_started(&self, _target: &ScanTarget, _ports: &PortSpec, _concurrency: usize) {}

    /// Called as soon as a port is confirmed open.
    fn port_open(&self, target: &ScanTarget, port: Port);

    /// Called when a probe fails for a reason other than refused, timed out
    /// or unreachable.
    fn probe_failed(&self, target: &ScanTarget, port: Port, error: &ScanError);

    /// Called once after every worker has exited.
    fn scan_finished(&self, _target: &ScanTarget, _stats: &ScanStats) {}
}

/// A shared reporter for dynamic dispatch.
pub type SharedReporter = Arc<dyn ScanReporter>;

/// Output mode for scan events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// `Port <N> is open` lines on stdout
    #[default]
    Human,
    /// One JSON log record per event on stdout
    Structured,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

/// Build the reporter for an output mode.
pub fn reporter_for(mode: OutputMode, quiet: bool) -> SharedReporter {
    match mode {
        OutputMode::Human => Arc::new(HumanReporter::stdout(quiet)),
        OutputMode::Structured => Arc::new(StructuredReporter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_display() {
        assert_eq!(OutputMode::Human.to_string(), "human");
        assert_eq!(OutputMode::Structured.to_string(), "structured");
        assert_eq!(OutputMode::default(), OutputMode::Human);
    }

    #[test]
    fn test_output_mode_deserialize() {
        let mode: OutputMode = serde_json::from_str("\"structured\"").unwrap();
        assert_eq!(mode, OutputMode::Structured);
    }
}
