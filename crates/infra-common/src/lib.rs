//! Common infrastructure shared by the hammer crates.
//!
//! - [`logging`]: subscriber installation and per-component log contexts
//! - [`errors`]: the infrastructure error type and context helpers

pub mod errors;
pub mod logging;

pub use errors::types::{Error, Result};
pub use errors::context::{ErrorContext, ErrorExt};
pub use logging::context::LogContext;
pub use logging::setup::{log_welcome, parse_log_level, setup_logging, LoggingConfig};
