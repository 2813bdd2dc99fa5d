//! Log subscriber setup.
//!
//! Human mode writes compact, warn-and-above diagnostics to stderr so that
//! stdout carries only scan output. Structured mode writes one JSON object
//! per event to stdout. `RUST_LOG` overrides the default filter in both.

use crate::output::OutputMode;
use anyhow::anyhow;
use std::io;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber for `mode`.
pub fn init(mode: OutputMode, verbose: bool, quiet: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(mode, verbose, quiet)));

    let installed = match mode {
        OutputMode::Human => tracing_subscriber::fmt()
            .compact()
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
        OutputMode::Structured => tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_env_filter(filter)
            .with_writer(io::stdout)
            .try_init(),
    };

    installed.map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}

/// Default filter directive when `RUST_LOG` is unset.
///
/// Structured mode ignores `quiet`: open ports are info records there.
fn default_filter(mode: OutputMode, verbose: bool, quiet: bool) -> &'static str {
    match (mode, verbose, quiet) {
        (_, true, _) => "portsweep=debug",
        (OutputMode::Structured, false, _) => "info",
        (OutputMode::Human, false, true) => "error",
        (OutputMode::Human, false, false) => "warn",
    }
}

/// In-memory JSON log capture for tests.
#[cfg(test)]
pub(crate) mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Collects every record, down to `TRACE`, in the structured-mode format.
    #[derive(Clone, Default)]
    pub(crate) struct JsonCapture {
        buffer: Buffer,
    }

    impl JsonCapture {
        pub(crate) fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
            let buffer = self.buffer.clone();
            tracing_subscriber::fmt()
                .json()
                .flatten_event(true)
                .with_max_level(tracing::Level::TRACE)
                .with_writer(move || buffer.clone())
                .finish()
        }

        pub(crate) fn records(&self) -> Vec<serde_json::Value> {
            let bytes = self.buffer.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters() {
        assert_eq!(default_filter(OutputMode::Human, false, false), "warn");
        assert_eq!(default_filter(OutputMode::Human, false, true), "error");
        assert_eq!(default_filter(OutputMode::Human, true, false), "portsweep=debug");
        assert_eq!(default_filter(OutputMode::Structured, false, true), "info");
    }
}
