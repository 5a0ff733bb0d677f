//! Platform guard
//!
//! Process handling relies on POSIX kill and pipe semantics.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("This program does not support {0}")]
    Unsupported(&'static str),
}

/// Fail early on anything that is not a Unix-like OS
pub fn ensure_supported_platform() -> Result<(), PlatformError> {
    check_platform(cfg!(unix), std::env::consts::OS)
}

fn check_platform(is_unix: bool, os: &'static str) -> Result<(), PlatformError> {
    if is_unix {
        Ok(())
    } else {
        Err(PlatformError::Unsupported(os))
    }
}
