//! Core data models: allow-list, target validation, proposal parsing, overlap

mod algorithms;
mod overlap;
mod proposal;
mod target;

pub use overlap::OverlapReport;
pub use proposal::{extract_proposal, ProposalError};
pub use target::{HostError, TargetHost};
