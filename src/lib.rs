//! # portsweep - a concurrent TCP connect port scanner
//!
//! portsweep probes every port of a port specification against one host,
//! using a bounded pool of concurrent workers, and reports each open port
//! the moment it is confirmed.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::output::HumanReporter;
//! use portsweep::scanner::{PortScanner, TcpConnectProber};
//! use portsweep::types::PortSpec;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scanner = PortScanner::new(
//!         Arc::new(TcpConnectProber::default()),
//!         Arc::new(HumanReporter::stdout(false)),
//!     )
//!     .with_concurrency(50);
//!
//!     scanner.scan("127.0.0.1", &PortSpec::parse_or_default("1..1024")).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - `Port`, `PortSpec` and target resolution
//! - [`scanner`] - the worker-pool engine and the `Prober` trait
//! - [`output`] - human and structured reporters
//! - [`config`] - settings file handling
//! - [`logging`] - tracing subscriber setup
//! - [`error`] - error types

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{ScanError, ScanResult};
pub use output::{OutputMode, ScanReporter};
pub use scanner::{PortScanner, ProbeOutcome, Prober, ScanStats, TcpConnectProber};
pub use types::{Port, PortSpec, ScanTarget};
