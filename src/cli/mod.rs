//! CLI argument definitions using clap

pub mod check;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// Process exit codes
pub mod exit_codes {
    /// Report printed, or a diagnostic stop (bad host, no proposal, unsupported OS)
    pub const SUCCESS: i32 = 0;
    /// The probe could not run at all
    pub const UNEXPECTED_FAILURE: i32 = 1;
}

#[derive(Parser, Debug)]
#[command(name = "sshd-algo-check")]
#[command(version)]
#[command(about = "Validate sshd algorithms against a compliance allow-list", long_about = None)]
pub struct Cli {
    /// Hostname or IP address [default: localhost]
    #[arg(short = 'H', long, value_name = "HOST")]
    pub hostname: Option<String>,

    /// Timeout seconds [default: 2]
    #[arg(short, long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// SSH port, passed to the client as -p
    #[arg(short, long)]
    pub port: Option<u16>,

    /// SSH client to run [default: ssh]
    #[arg(long, value_name = "PATH", env = "SSHD_ALGO_CHECK_SSH")]
    pub ssh_binary: Option<String>,

    /// Settings file
    #[arg(short, long, value_name = "FILE", env = "SSHD_ALGO_CHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
