//! The check pipeline: validate, probe, extract, report

use std::time::Duration;

use thiserror::Error;

use super::{Cli, OutputFormat, DEFAULT_HOSTNAME, DEFAULT_TIMEOUT_SECS};
use crate::core::{extract_proposal, HostError, OverlapReport, ProposalError, TargetHost};
use crate::host::{ensure_supported_platform, CommandError, PlatformError};
use crate::probe::{HandshakeSource, SshClientProbe};
use crate::settings::{Settings, SettingsError};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    InvalidHost(#[from] HostError),

    #[error(transparent)]
    Proposal(#[from] ProposalError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

impl CheckError {
    /// Conditions that end the run with a short message rather than a failure
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            CheckError::Platform(_) | CheckError::InvalidHost(_) | CheckError::Proposal(_)
        )
    }
}

/// Effective options after merging flags, settings file and defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub hostname: String,
    pub timeout_secs: u64,
    pub port: Option<u16>,
    pub ssh_binary: Option<String>,
    pub ssh_options: Vec<String>,
}

impl CheckRequest {
    pub fn resolve(cli: &Cli, settings: Settings) -> Self {
        Self {
            hostname: cli
                .hostname
                .clone()
                .or(settings.hostname)
                .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
            timeout_secs: cli
                .timeout
                .or(settings.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            port: cli.port.or(settings.port),
            ssh_binary: cli.ssh_binary.clone().or(settings.ssh_binary),
            ssh_options: settings.ssh_options,
        }
    }

    fn probe(&self) -> SshClientProbe {
        let probe = SshClientProbe::new(Duration::from_secs(self.timeout_secs))
            .with_options(self.ssh_options.clone())
            .with_port(self.port);
        match &self.ssh_binary {
            Some(binary) => probe.with_binary(binary.clone()),
            None => probe,
        }
    }
}

/// Probe one host and compute its overlap report
pub async fn check_host(
    source: &dyn HandshakeSource,
    host: &TargetHost,
) -> Result<OverlapReport, CheckError> {
    let result = source.capture(host).await?;

    if result.timed_out {
        tracing::debug!("{} was killed at the deadline, using partial output", source.name());
    }
    if result.stderr.is_none() {
        tracing::debug!(
            "{} wrote nothing to stderr (exit code {:?}, {} bytes on stdout)",
            source.name(),
            result.exit_code,
            result.stdout.len()
        );
    }

    let negotiation = extract_proposal(result.diagnostic_text())?;
    if negotiation.is_empty() {
        tracing::warn!("Proposal found but none of its fields were recognised");
    } else {
        tracing::debug!("Extracted {} proposal fields", negotiation.len());
    }

    let report = OverlapReport::compute(host.as_str(), &negotiation);
    if !report.is_compliant() {
        tracing::warn!(
            "{} offers no acceptable algorithm for {} field(s)",
            host,
            report.missing_overlap().count()
        );
    }
    Ok(report)
}

pub fn render(report: &OverlapReport, format: OutputFormat) -> Result<String, CheckError> {
    match format {
        OutputFormat::Text => Ok(format!("\n\n{}", report.render_text())),
        OutputFormat::Json => Ok(format!("{}\n", report.render_json()?)),
    }
}

/// Run a check from the command line
pub async fn run(cli: &Cli) -> Result<(), CheckError> {
    ensure_supported_platform()?;

    let settings = Settings::load(cli.config.as_deref())?;
    let request = CheckRequest::resolve(cli, settings);
    let host = TargetHost::parse(&request.hostname)?;

    let report = check_host(&request.probe(), &host).await?;
    print!("{}", render(&report, cli.format)?);

    Ok(())
}
