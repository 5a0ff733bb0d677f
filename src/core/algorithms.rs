//! Algorithm categories and the compliance allow-list
//!
//! The accepted algorithms come from the Foglight security and compliance
//! guide. They are compiled in and never change at runtime.

use serde::Serialize;

/// Algorithm category an sshd negotiates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AlgorithmCategory {
    /// Key exchange
    #[serde(rename = "kexalgorithms")]
    Kex,
    /// Server host key
    #[serde(rename = "hostkeyalgorithms")]
    HostKey,
    /// Symmetric ciphers
    #[serde(rename = "ciphers")]
    Cipher,
    /// Message authentication codes
    #[serde(rename = "macs")]
    Mac,
}

const ACCEPTED_KEX: &[&str] = &[
    "diffie-hellman-group14-sha1",
    "diffie-hellman-group-exchange-sha256",
    "diffie-hellman-group-exchange-sha1",
    "diffie-hellman-group1-sha1",
];

const ACCEPTED_HOST_KEY: &[&str] = &["ssh-rsa", "ssh-dss"];

const ACCEPTED_CIPHERS: &[&str] = &[
    "aes128-ctr",
    "aes192-ctr",
    "aes256-ctr",
    "aes128-cbc",
    "aes192-cbc",
    "aes256-cbc",
    "3des-ctr",
    "3des-cbc",
    "blowfish-ctr",
    "blowfish-cbc",
];

const ACCEPTED_MACS: &[&str] = &[
    "hmac-sha1",
    "hmac-sha2-256",
    "hmac-sha2-512",
    "hmac-sha1-96",
    "hmac-md5-96",
    "hmac-md5",
];

impl AlgorithmCategory {
    /// All categories, in report order
    #[cfg(test)]
    pub const ALL: [AlgorithmCategory; 4] = [
        AlgorithmCategory::Kex,
        AlgorithmCategory::HostKey,
        AlgorithmCategory::Cipher,
        AlgorithmCategory::Mac,
    ];

    /// Short name used in reports (matches the sshd_config keyword, lowercased)
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmCategory::Kex => "kexalgorithms",
            AlgorithmCategory::HostKey => "hostkeyalgorithms",
            AlgorithmCategory::Cipher => "ciphers",
            AlgorithmCategory::Mac => "macs",
        }
    }

    /// Algorithms the compliance guide accepts for this category
    pub fn accepted(&self) -> &'static [&'static str] {
        match self {
            AlgorithmCategory::Kex => ACCEPTED_KEX,
            AlgorithmCategory::HostKey => ACCEPTED_HOST_KEY,
            AlgorithmCategory::Cipher => ACCEPTED_CIPHERS,
            AlgorithmCategory::Mac => ACCEPTED_MACS,
        }
    }

    /// Check whether an algorithm identifier is on the allow-list
    pub fn accepts(&self, algorithm: &str) -> bool {
        self.accepted().iter().any(|accepted| *accepted == algorithm)
    }
}

impl std::fmt::Display for AlgorithmCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A negotiation field the SSH client prints for the peer's KEXINIT proposal
///
/// Several fields map onto one category: ciphers and MACs are proposed once
/// per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProposalField {
    KexAlgorithms,
    HostKeyAlgorithms,
    CiphersClientToServer,
    CiphersServerToClient,
    MacsClientToServer,
    MacsServerToClient,
}

impl ProposalField {
    /// All fields, in the order the client prints them
    pub const ALL: [ProposalField; 6] = [
        ProposalField::KexAlgorithms,
        ProposalField::HostKeyAlgorithms,
        ProposalField::CiphersClientToServer,
        ProposalField::CiphersServerToClient,
        ProposalField::MacsClientToServer,
        ProposalField::MacsServerToClient,
    ];

    /// Label text as it appears in `ssh -vvv` output
    ///
    /// Labels are matched by substring, so none may contain another.
    pub fn label(&self) -> &'static str {
        match self {
            ProposalField::KexAlgorithms => "KEX algorithms",
            ProposalField::HostKeyAlgorithms => "host key algorithms",
            ProposalField::CiphersClientToServer => "ciphers ctos",
            ProposalField::CiphersServerToClient => "ciphers stoc",
            ProposalField::MacsClientToServer => "MACs ctos",
            ProposalField::MacsServerToClient => "MACs stoc",
        }
    }

    pub fn category(&self) -> AlgorithmCategory {
        match self {
            ProposalField::KexAlgorithms => AlgorithmCategory::Kex,
            ProposalField::HostKeyAlgorithms => AlgorithmCategory::HostKey,
            ProposalField::CiphersClientToServer | ProposalField::CiphersServerToClient => {
                AlgorithmCategory::Cipher
            }
            ProposalField::MacsClientToServer | ProposalField::MacsServerToClient => {
                AlgorithmCategory::Mac
            }
        }
    }
}

impl std::fmt::Display for ProposalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
