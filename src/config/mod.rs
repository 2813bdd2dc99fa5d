//! Configuration management for portsweep.
//!
//! Provides XDG-compliant settings storage. Paths and settings are built
//! once at startup and passed down explicitly.

mod settings;

pub use settings::{AppSettings, Paths};
