use crate::account::AccountId;
use crate::proposal::ProposalStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GovError {
    #[error("Parallel array length mismatch: {field} has {actual} entries, expected {expected}")]
    ArityMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Account {0} is not authorized to publish weights")]
    Unauthorized(AccountId),

    #[error("Proposal {id} is {state}: cannot {action}")]
    InvalidStateTransition {
        id: u64,
        state: ProposalStatus,
        action: &'static str,
    },

    #[error("Account {voter} has already voted on proposal {id}")]
    DuplicateVote { id: u64, voter: AccountId },

    #[error("Unknown proposal id: {0}")]
    UnknownProposal(u64),

    #[error("Arithmetic overflow while tallying proposal {0}")]
    Overflow(u64),
}
