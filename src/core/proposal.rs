//! KEXINIT proposal extraction from `ssh -vvv` output
//!
//! The verbose trace is unstructured text, so everything that knows its
//! layout lives here: raw text in, [`NegotiationReport`] out.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::algorithms::ProposalField;

/// Marker printed right before the server's proposal is dumped
pub const PROPOSAL_ANCHOR: &str = "peer server KEXINIT proposal";

/// Separator between the log prefix, the label and the algorithm list
const SEGMENT_SEPARATOR: &str = ": ";

/// Index of the algorithm list once a line is split on [`SEGMENT_SEPARATOR`]
const LIST_SEGMENT: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProposalError {
    #[error("Key Exchange proposals for sshd were not found.")]
    NotFound,
}

/// Algorithms the server offered, keyed by proposal field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegotiationReport {
    fields: BTreeMap<ProposalField, BTreeSet<String>>,
}

impl NegotiationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field; the first occurrence wins
    pub fn insert(&mut self, field: ProposalField, algorithms: BTreeSet<String>) -> bool {
        if self.fields.contains_key(&field) {
            return false;
        }
        self.fields.insert(field, algorithms);
        true
    }

    pub fn get(&self, field: ProposalField) -> Option<&BTreeSet<String>> {
        self.fields.get(&field)
    }

    /// Iterate fields in the order the client prints them
    pub fn iter(&self) -> impl Iterator<Item = (ProposalField, &BTreeSet<String>)> {
        self.fields.iter().map(|(field, algos)| (*field, algos))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Extract the server's proposal from captured client output
pub fn extract_proposal(text: &str) -> Result<NegotiationReport, ProposalError> {
    let start = text.find(PROPOSAL_ANCHOR).ok_or(ProposalError::NotFound)?;
    let mut report = NegotiationReport::new();

    for line in text[start..].lines() {
        for field in ProposalField::ALL {
            if !line.contains(field.label()) || report.get(field).is_some() {
                continue;
            }

            match parse_algorithm_list(line) {
                Some(algorithms) => {
                    tracing::debug!("{}: {} algorithms offered", field, algorithms.len());
                    report.insert(field, algorithms);
                }
                None => {
                    tracing::debug!("Skipping malformed '{}' line: {}", field, line.trim_end());
                }
            }
        }
    }

    Ok(report)
}

/// Parse the comma separated list from a line like
/// `debug2: ciphers ctos: aes128-ctr,aes256-ctr`
fn parse_algorithm_list(line: &str) -> Option<BTreeSet<String>> {
    let list = line.split(SEGMENT_SEPARATOR).nth(LIST_SEGMENT)?;

    Some(
        list.split(',')
            .map(str::trim)
            .filter(|algo| !algo.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENSSH_TRACE: &str = "\
debug1: Local version string SSH-2.0-OpenSSH_9.6p1
debug2: local client KEXINIT proposal
debug2: KEX algorithms: sntrup761x25519-sha512@openssh.com,curve25519-sha256
debug2: host key algorithms: ssh-ed25519
debug2: ciphers ctos: chacha20-poly1305@openssh.com
debug2: peer server KEXINIT proposal
debug2: KEX algorithms: curve25519-sha256,diffie-hellman-group14-sha1
debug2: host key algorithms: rsa-sha2-512,ssh-ed25519
debug2: ciphers ctos: chacha20-poly1305@openssh.com,aes256-ctr
debug2: ciphers stoc: chacha20-poly1305@openssh.com,aes256-ctr
debug2: MACs ctos: umac-64-etm@openssh.com,hmac-sha2-256
debug2: MACs stoc: umac-64-etm@openssh.com,hmac-sha2-256
debug2: compression ctos: none,zlib@openssh.com
debug2: compression stoc: none,zlib@openssh.com
debug1: kex: algorithm: curve25519-sha256
debug1: kex: host key algorithm: ssh-ed25519
";

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_all_fields() {
        let report = extract_proposal(OPENSSH_TRACE).unwrap();
        assert_eq!(report.len(), 6);
        assert_eq!(
            report.get(ProposalField::KexAlgorithms),
            Some(&set(&["curve25519-sha256", "diffie-hellman-group14-sha1"]))
        );
        assert_eq!(
            report.get(ProposalField::HostKeyAlgorithms),
            Some(&set(&["rsa-sha2-512", "ssh-ed25519"]))
        );
        assert_eq!(
            report.get(ProposalField::MacsServerToClient),
            Some(&set(&["umac-64-etm@openssh.com", "hmac-sha2-256"]))
        );
    }

    #[test]
    fn test_ignores_local_proposal() {
        // The client's own proposal precedes the anchor and must not leak in
        let report = extract_proposal(OPENSSH_TRACE).unwrap();
        let kex = report.get(ProposalField::KexAlgorithms).unwrap();
        assert!(!kex.contains("sntrup761x25519-sha512@openssh.com"));
    }

    #[test]
    fn test_kex_line_with_extra_segments() {
        let text = "peer server KEXINIT proposal\n\
                    x KEX algorithms ctos: ...: aes128-ctr,diffie-hellman-group14-sha1,foo-bar\n";
        let report = extract_proposal(text).unwrap();
        assert_eq!(
            report.get(ProposalField::KexAlgorithms),
            Some(&set(&["aes128-ctr", "diffie-hellman-group14-sha1", "foo-bar"]))
        );
    }

    #[test]
    fn test_missing_anchor() {
        let text = "debug1: connect to address 10.0.0.1 port 22: Connection refused\n";
        assert_eq!(extract_proposal(text), Err(ProposalError::NotFound));
        assert_eq!(extract_proposal(""), Err(ProposalError::NotFound));
    }

    #[test]
    fn test_missing_field_is_omitted() {
        let text = "debug2: peer server KEXINIT proposal\n\
                    debug2: ciphers ctos: rc4\n";
        let report = extract_proposal(text).unwrap();
        assert_eq!(report.len(), 1);
        assert!(report.get(ProposalField::KexAlgorithms).is_none());
        assert_eq!(report.get(ProposalField::CiphersClientToServer), Some(&set(&["rc4"])));
    }

    #[test]
    fn test_trims_whitespace_and_crlf() {
        let text = "debug2: peer server KEXINIT proposal\r\n\
                    debug2: MACs ctos:  hmac-sha1 , hmac-md5 ,\r\n";
        let report = extract_proposal(text).unwrap();
        assert_eq!(
            report.get(ProposalField::MacsClientToServer),
            Some(&set(&["hmac-sha1", "hmac-md5"]))
        );
    }

    #[test]
    fn test_malformed_line_skipped() {
        let text = "peer server KEXINIT proposal\nKEX algorithms truncated\n";
        let report = extract_proposal(text).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let text = "debug2: peer server KEXINIT proposal\n\
                    debug2: ciphers stoc: aes128-ctr\n\
                    debug2: ciphers stoc: rc4\n";
        let report = extract_proposal(text).unwrap();
        assert_eq!(
            report.get(ProposalField::CiphersServerToClient),
            Some(&set(&["aes128-ctr"]))
        );
    }

    #[test]
    fn test_report_iterates_in_field_order() {
        let report = extract_proposal(OPENSSH_TRACE).unwrap();
        let fields: Vec<ProposalField> = report.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, ProposalField::ALL.to_vec());
    }
}
