//! Target host validation
//!
//! Pure syntax check for hostnames and IPv4 addresses. Nothing is resolved.
//! A rejected string is never repaired.

use regex_lite::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Longest hostname DNS allows, in characters
pub const MAX_HOSTNAME_LEN: usize = 253;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("Invalid host {0}")]
    Invalid(String),
}

fn ipv4_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
        )
        .expect("Invalid IPv4 regex")
    })
}

fn label_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // 1-63 chars, alphanumeric or hyphen, no hyphen at either end
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$")
            .expect("Invalid hostname label regex")
    })
}

/// Check for a dotted-quad IPv4 address
pub fn is_valid_ipv4(address: &str) -> bool {
    ipv4_regex().is_match(address)
}

/// Check for a DNS hostname
///
/// A single trailing dot is allowed. Dotted-quad shaped names (four labels,
/// the first three numeric) are left to [`is_valid_ipv4`], so `999.1.1.1`
/// and `1.2.3.4x` fail. Other numeric names such as `host.123` or `1.2.3`
/// are ordinary hostnames.
pub fn is_valid_hostname(address: &str) -> bool {
    if address.is_empty() || address.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    let name = address.strip_suffix('.').unwrap_or(address);
    if name.is_empty() {
        return false;
    }

    let labels: Vec<&str> = name.split('.').collect();
    if !labels.iter().all(|label| label_regex().is_match(label)) {
        return false;
    }

    !looks_like_ipv4(&labels)
}

fn is_numeric(label: &str) -> bool {
    label.chars().all(|c| c.is_ascii_digit())
}

fn looks_like_ipv4(labels: &[&str]) -> bool {
    labels.len() == 4 && labels[..3].iter().all(|label| is_numeric(label))
}

/// Check whether a string is a valid hostname or IPv4 address
pub fn is_valid_hostname_or_ip(address: &str) -> bool {
    if address.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    is_valid_hostname(address) || is_valid_ipv4(address)
}

/// A hostname or IPv4 address that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHost(String);

impl TargetHost {
    pub fn parse(address: &str) -> Result<Self, HostError> {
        if is_valid_hostname_or_ip(address) {
            Ok(Self(address.to_string()))
        } else {
            Err(HostError::Invalid(address.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
