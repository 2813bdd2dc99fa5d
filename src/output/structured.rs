//! Structured output: every scan event becomes a `tracing` record.
//!
//! With the JSON subscriber installed by [`crate::logging`] each record is
//! one JSON object per line carrying the port as a field.

use super::ScanReporter;
use crate::error::ScanError;
use crate::scanner::ScanStats;
use crate::types::{Port, PortSpec, ScanTarget};
use tracing::{error, info};

/// Emits scan events as structured log records.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredReporter;

impl ScanReporter for StructuredReporter {
    fn scan_started(&self, target: &ScanTarget, ports: &PortSpec, concurrency: usize) {
        info!(
            host = %target.original,
            ip = %target.ip,
            ports = %ports,
            port_count = ports.len(),
            concurrency,
            "Scanning {} ports {} with concurrency={}",
            target,
            ports,
            concurrency
        );
    }

    fn port_open(&self, target: &ScanTarget, port: Port) {
        info!(host = %target.original, ip = %target.ip, port = port.as_u16(), "Port open");
    }

    fn probe_failed(&self, target: &ScanTarget, port: Port, err: &ScanError) {
        error!(
            host = %target.original,
            ip = %target.ip,
            port = port.as_u16(),
            error = %err,
            "Error scanning port"
        );
    }

    fn scan_finished(&self, target: &ScanTarget, stats: &ScanStats) {
        info!(
            host = %target.original,
            attempted = stats.attempted,
            open = stats.open,
            closed = stats.closed,
            filtered = stats.filtered,
            failed = stats.failed,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Scan complete"
        );
    }
}
