//! Plain text output.
//!
//! Produces human-readable lines, styled when the terminal supports it.

use super::ScanReporter;
use crate::error::ScanError;
use crate::scanner::ScanStats;
use crate::types::{Port, PortSpec, ScanTarget};
use console::style;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Writes one `Port <N> is open` line per open port.
///
/// Every line is written while holding the writer lock, so concurrent
/// workers never interleave partial lines.
pub struct HumanReporter<W = io::Stdout> {
    out: Mutex<W>,
    quiet: bool,
}

impl HumanReporter<io::Stdout> {
    /// Reporter writing to stdout. `quiet` suppresses the start banner.
    pub fn stdout(quiet: bool) -> Self {
        Self::new(io::stdout(), quiet)
    }
}

impl<W: Write + Send> HumanReporter<W> {
    /// Reporter writing to an arbitrary sink.
    pub fn new(out: W, quiet: bool) -> Self {
        Self {
            out: Mutex::new(out),
            quiet,
        }
    }

    /// Consume the reporter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, line: std::fmt::Arguments<'_>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_fmt(format_args!("{}\n", line)).and_then(|_| out.flush()) {
            debug!(error = %e, "failed to write scan output");
        }
    }
}

impl<W: Write + Send> ScanReporter for HumanReporter<W> {
    fn scan_started(&self, target: &ScanTarget, ports: &PortSpec, concurrency: usize) {
        if !self.quiet {
            self.write_line(format_args!(
                "Scanning {} ports {} with concurrency={}",
                style(target).bold(),
                ports,
                concurrency
            ));
        }
    }

    fn port_open(&self, _target: &ScanTarget, port: Port) {
        self.write_line(format_args!("Port {} is open", style(port).green().bold()));
    }

    fn probe_failed(&self, _target: &ScanTarget, port: Port, error: &ScanError) {
        print_error(&format!("Error scanning port {}: {}", port, error));
    }

    fn scan_finished(&self, target: &ScanTarget, stats: &ScanStats) {
        info!(
            attempted = stats.attempted,
            open = stats.open,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Finished scanning {}",
            target
        );
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;
    use std::thread;

    fn target() -> ScanTarget {
        ScanTarget::new("127.0.0.1", IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    fn output(reporter: HumanReporter<Vec<u8>>) -> String {
        console::strip_ansi_codes(&String::from_utf8(reporter.into_inner()).unwrap()).into_owned()
    }

    #[test]
    fn test_port_open_line() {
        let reporter = HumanReporter::new(Vec::new(), false);
        reporter.port_open(&target(), Port::new(22).unwrap());
        assert_eq!(output(reporter), "Port 22 is open\n");
    }

    #[test]
    fn test_banner_respects_quiet() {
        let spec = PortSpec::parse_or_default("22,80");

        let loud = HumanReporter::new(Vec::new(), false);
        loud.scan_started(&target(), &spec, 50);
        assert_eq!(output(loud), "Scanning 127.0.0.1 ports 22,80 with concurrency=50\n");

        let quiet = HumanReporter::new(Vec::new(), true);
        quiet.scan_started(&target(), &spec, 50);
        assert_eq!(output(quiet), "");
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let reporter = Arc::new(HumanReporter::new(Vec::new(), true));
        let handles: Vec<_> = (1..=8u16)
            .map(|worker| {
                let reporter = Arc::clone(&reporter);
                thread::spawn(move || {
                    for i in 0..50u16 {
                        let port = Port::new(worker * 1000 + i).unwrap();
                        reporter.port_open(&target(), port);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reporter = Arc::try_unwrap(reporter).ok().unwrap();
        let text = output(reporter);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("Port ") && l.ends_with(" is open")));
    }
}
