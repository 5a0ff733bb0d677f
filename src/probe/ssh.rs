//! OpenSSH client probe
//!
//! Runs `ssh -vvv <host>` and hands back what it wrote to stderr. The
//! verbose trace, including the peer's KEXINIT proposal, only ever goes to
//! stderr.

use std::time::Duration;

use async_trait::async_trait;

use super::HandshakeSource;
use crate::core::TargetHost;
use crate::host::{CommandError, CommandOptions, CommandRunner, ProcessResult};

pub const DEFAULT_SSH_BINARY: &str = "ssh";

/// Probe that shells out to an installed SSH client
#[derive(Debug, Clone)]
pub struct SshClientProbe {
    runner: CommandRunner,
    binary: String,
    extra_options: Vec<String>,
    port: Option<u16>,
    timeout: Duration,
}

impl SshClientProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            runner: CommandRunner::new(),
            binary: DEFAULT_SSH_BINARY.to_string(),
            extra_options: Vec::new(),
            port: None,
            timeout,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Options placed between `-vvv` and the host (e.g. `-o BatchMode=yes`)
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.extra_options = options;
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Full argument list for one connection attempt
    pub fn args(&self, host: &TargetHost) -> Vec<String> {
        let mut args = vec!["-vvv".to_string()];
        args.extend(self.extra_options.iter().cloned());
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push(host.as_str().to_string());
        args
    }
}

#[async_trait]
impl HandshakeSource for SshClientProbe {
    fn name(&self) -> &str {
        &self.binary
    }

    async fn capture(&self, host: &TargetHost) -> Result<ProcessResult, CommandError> {
        let options = CommandOptions::new(self.args(host), self.timeout);
        self.runner.run(&self.binary, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(name: &str) -> TargetHost {
        TargetHost::parse(name).unwrap()
    }

    #[test]
    fn test_default_args() {
        let probe = SshClientProbe::new(Duration::from_secs(2));
        assert_eq!(probe.args(&host("localhost")), vec!["-vvv", "localhost"]);
        assert_eq!(probe.name(), "ssh");
    }

    #[test]
    fn test_args_with_port_and_options() {
        let probe = SshClientProbe::new(Duration::from_secs(2))
            .with_binary("/usr/bin/ssh")
            .with_options(vec!["-o".to_string(), "BatchMode=yes".to_string()])
            .with_port(Some(2222));

        assert_eq!(
            probe.args(&host("10.0.0.1")),
            vec!["-vvv", "-o", "BatchMode=yes", "-p", "2222", "10.0.0.1"]
        );
        assert_eq!(probe.name(), "/usr/bin/ssh");
    }

    #[tokio::test]
    async fn test_missing_client_propagates() {
        let probe = SshClientProbe::new(Duration::from_secs(1)).with_binary("no-such-ssh-client-9f2e");
        let err = probe.capture(&host("localhost")).await.unwrap_err();
        assert!(matches!(err, CommandError::BinaryNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_is_the_trace() {
        // A stand-in client that prints its trace to stderr and noise to stdout
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ssh");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'stdout noise'\necho 'debug2: peer server KEXINIT proposal' >&2\n",
        )
        .unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let probe = SshClientProbe::new(Duration::from_secs(5))
            .with_binary(script.to_string_lossy().to_string());
        let result = probe.capture(&host("localhost")).await.unwrap();

        assert_eq!(
            result.stderr.as_deref(),
            Some("debug2: peer server KEXINIT proposal\n")
        );
        assert_eq!(result.stdout, "stdout noise\n");
    }
}
