//! Command-line interface for portsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing. Every option
//! can also be supplied through the environment; anything left unset falls
//! back to the settings file and then to built-in defaults.

use crate::config::{AppSettings, Paths};
use crate::logging;
use crate::output::{self, print_warning, OutputMode};
use crate::scanner::{PortScanner, TcpConnectProber};
use crate::types::PortSpec;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A concurrent TCP connect port scanner.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan a host for open TCP ports", long_about = None)]
#[command(after_help = "Examples:\n  portsweep 192.168.1.1\n  portsweep example.com 22,80,443 100\n  portsweep 192.168.1.1 1..1024 200")]
pub struct Args {
    /// Target IP address or hostname to scan
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ports to scan (e.g. "1..1024", "22,80,443", "8080"); unparseable input scans 1..1024
    #[arg(value_name = "PORTS", env = "PORTSWEEP_PORTS")]
    pub ports: Option<String>,

    /// Number of concurrent workers (minimum 1)
    #[arg(value_name = "CONCURRENCY", env = "PORTSWEEP_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Per-port connection timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS", env = "PORTSWEEP_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Output mode
    #[arg(short, long, value_enum, env = "PORTSWEEP_OUTPUT")]
    pub output: Option<OutputMode>,

    /// Path to a settings file (defaults to the XDG config directory)
    #[arg(long, value_name = "PATH", env = "PORTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose diagnostics
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress the start banner and warnings
    #[arg(short, long)]
    pub quiet: bool,
}

/// Fully resolved options for one scan invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub target: String,
    pub ports: PortSpec,
    pub concurrency: usize,
    pub timeout: Duration,
    pub output: OutputMode,
}

impl Args {
    /// Output mode from the command line, else from `settings`.
    pub fn output_mode(&self, settings: &AppSettings) -> OutputMode {
        self.output.unwrap_or(settings.output)
    }

    /// Merge command-line values over `settings`.
    pub fn resolve(&self, settings: &AppSettings) -> ScanOptions {
        let ports = self.ports.as_deref().unwrap_or(settings.default_ports.as_str());

        ScanOptions {
            target: self.target.clone(),
            ports: PortSpec::parse_or_default(ports),
            concurrency: self.concurrency.unwrap_or(settings.default_concurrency).max(1),
            timeout: Duration::from_millis(self.timeout.unwrap_or(settings.default_timeout_ms)),
            output: self.output_mode(settings),
        }
    }

    /// Install logging for the chosen output mode, then resolve the options.
    ///
    /// Option resolution may log (a bad port spec falls back with a debug
    /// record), so `install` runs first.
    pub fn configure<F>(&self, settings: &AppSettings, install: F) -> anyhow::Result<ScanOptions>
    where
        F: FnOnce(OutputMode) -> anyhow::Result<()>,
    {
        install(self.output_mode(settings))?;
        Ok(self.resolve(settings))
    }

    /// Load the settings file, returning the path actually read (if any).
    fn load_settings(&self) -> anyhow::Result<(AppSettings, Option<PathBuf>)> {
        if let Some(path) = &self.config {
            let settings = AppSettings::load_from(path)
                .with_context(|| format!("loading settings from {}", path.display()))?;
            return Ok((settings, Some(path.clone())));
        }

        match Paths::discover() {
            Ok(paths) => {
                let file = paths.settings_file();
                let settings = AppSettings::load(&paths).context("loading settings")?;
                Ok((settings, file.exists().then_some(file)))
            }
            Err(e) => {
                if !self.quiet {
                    print_warning(&format!("{}; using default settings", e));
                }
                Ok((AppSettings::default(), None))
            }
        }
    }
}

/// Run one scan for the parsed arguments.
///
/// Returns an error only for systemic failures: a bad settings file or a
/// target that cannot be resolved.
pub async fn run(args: Args) -> anyhow::Result<()> {
    let (settings, source) = args.load_settings()?;
    let options = args.configure(&settings, |mode| logging::init(mode, args.verbose, args.quiet))?;

    match &source {
        Some(path) => debug!(path = %path.display(), "loaded settings"),
        None => debug!("no settings file, using defaults"),
    }
    debug!(?options, "resolved scan options");

    let scanner = PortScanner::new(
        Arc::new(TcpConnectProber::new(options.timeout)),
        output::reporter_for(options.output, args.quiet),
    )
    .with_concurrency(options.concurrency);

    scanner
        .scan(&options.target, &options.ports)
        .await
        .with_context(|| format!("scan of {} failed", options.target))?;

    Ok(())
}
