//! Handshake probes
//!
//! A probe produces the raw handshake trace for a host. The pipeline only
//! sees the trace text, never how it was obtained.

mod ssh;

use async_trait::async_trait;

use crate::core::TargetHost;
use crate::host::{CommandError, ProcessResult};

pub use ssh::SshClientProbe;

/// Source of a verbose handshake trace for one host
#[async_trait]
pub trait HandshakeSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Capture the trace for a single connection attempt
    async fn capture(&self, host: &TargetHost) -> Result<ProcessResult, CommandError>;
}
