//! Ambient infrastructure shared by signet applications.
//!
//! Currently this is the [`logging`] setup; the library crates only emit
//! `tracing` events and leave subscriber installation to the application.

pub mod logging;

pub use logging::{LogFormat, LoggingConfig};
