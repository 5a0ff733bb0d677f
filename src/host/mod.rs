//! Host module for process management and platform checks

pub mod command_runner;
pub mod platform;

pub use command_runner::{CommandError, CommandOptions, CommandRunner, ProcessResult};
pub use platform::{ensure_supported_platform, PlatformError};
