use crate::account::AccountId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Vote choices, in support-code order (0 = Against, 1 = For, 2 = Abstain)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteChoice {
    Against,
    For,
    Abstain,
}

impl VoteChoice {
    /// Map a numeric support code to a choice
    pub fn from_support(support: u64) -> Option<Self> {
        match support {
            0 => Some(Self::Against),
            1 => Some(Self::For),
            2 => Some(Self::Abstain),
            _ => None,
        }
    }

    pub fn support(&self) -> u64 {
        match self {
            Self::Against => 0,
            Self::For => 1,
            Self::Abstain => 2,
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Against => "Against",
            Self::For => "For",
            Self::Abstain => "Abstain",
        };
        f.write_str(name)
    }
}

impl FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "against" | "no" => Ok(Self::Against),
            "for" | "yes" => Ok(Self::For),
            "abstain" => Ok(Self::Abstain),
            other => Err(format!(
                "Invalid vote choice: {other}. Valid options: for, against, abstain"
            )),
        }
    }
}

/// Per-choice totals of effective vote weight.
///
/// This is a fold over the recorded votes, not an independent source of
/// truth: `fold` over the vote set must always reproduce the live value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRecord {
    pub against_votes: u64,
    pub for_votes: u64,
    pub abstain_votes: u64,
}

impl TallyRecord {
    /// Return a copy with `weight` added to the bucket for `choice`,
    /// or `None` on overflow
    pub fn accumulate(&self, choice: VoteChoice, weight: u64) -> Option<TallyRecord> {
        let mut next = *self;
        let bucket = match choice {
            VoteChoice::Against => &mut next.against_votes,
            VoteChoice::For => &mut next.for_votes,
            VoteChoice::Abstain => &mut next.abstain_votes,
        };
        *bucket = bucket.checked_add(weight)?;
        Some(next)
    }

    /// Total cast weight across all three buckets
    pub fn total(&self) -> u64 {
        self.against_votes
            .saturating_add(self.for_votes)
            .saturating_add(self.abstain_votes)
    }

    /// Recompute a tally from a vote set
    pub fn fold<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> TallyRecord {
        votes.into_iter().fold(TallyRecord::default(), |tally, vote| {
            tally
                .accumulate(vote.choice, vote.effective_weight)
                .unwrap_or(tally)
        })
    }
}

/// A recorded vote; immutable once created, at most one per (proposal, voter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: u64,
    pub voter: AccountId,
    pub choice: VoteChoice,
    pub effective_weight: u64,
    pub reason: Option<String>,
    /// Unix timestamp at which the vote was cast
    pub cast_at: u64,
}

/// One action a proposal will take on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalAction {
    pub target: AccountId,
    pub value: u64,
    /// Opaque call payload, hex-encoded
    pub calldata: String,
}

/// Proposal lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Canceled => "Canceled",
            Self::Defeated => "Defeated",
            Self::Succeeded => "Succeeded",
            Self::Queued => "Queued",
            Self::Expired => "Expired",
            Self::Executed => "Executed",
        };
        f.write_str(name)
    }
}

/// A governance proposal; created once, never deleted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Content-addressed id derived from topic, actions, and description
    pub id: u64,
    pub proposer: AccountId,
    pub topic_id: u32,
    pub actions: Vec<ProposalAction>,
    pub description: String,
    /// Block/time marker at which voting power is frozen
    pub snapshot: u64,
    pub window_start: u64,
    pub window_end: u64,
    pub created_at: u64,
    pub canceled: bool,
    /// Execution eta, set when the proposal is queued
    pub queued_eta: Option<u64>,
    pub executed_at: Option<u64>,
    pub tally: TallyRecord,
    pub votes: BTreeMap<AccountId, Vote>,
}

impl Proposal {
    /// Derive the content-addressed proposal id.
    ///
    /// Identical (topic, targets, values, calldatas, description) inputs
    /// always collide to the same id, which makes creation idempotent.
    pub fn derive_id(
        topic_id: u32,
        targets: &[AccountId],
        values: &[u64],
        calldatas: &[String],
        description: &str,
    ) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(b"merit-gov:proposal:v1");
        hasher.update(topic_id.to_be_bytes());

        for target in targets {
            hasher.update((target.as_str().len() as u64).to_be_bytes());
            hasher.update(target.as_str().as_bytes());
        }
        for value in values {
            hasher.update(value.to_be_bytes());
        }
        for calldata in calldatas {
            hasher.update((calldata.len() as u64).to_be_bytes());
            hasher.update(calldata.as_bytes());
        }
        hasher.update(Sha256::digest(description.as_bytes()));

        let digest = hasher.finalize();
        u64::from_be_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
    }

    /// Pure projection of the proposal state at `now`.
    ///
    /// Depends only on (now, window bounds, tally, quorum, cancellation and
    /// queue/execute marks); two evaluations with identical inputs yield
    /// identical results.
    pub fn status(&self, now: u64, quorum: u64, grace_period_secs: u64) -> ProposalStatus {
        if self.canceled {
            return ProposalStatus::Canceled;
        }
        if self.executed_at.is_some() {
            return ProposalStatus::Executed;
        }
        if let Some(eta) = self.queued_eta {
            return if now > eta.saturating_add(grace_period_secs) {
                ProposalStatus::Expired
            } else {
                ProposalStatus::Queued
            };
        }
        if now < self.window_start {
            return ProposalStatus::Pending;
        }
        if now < self.window_end {
            return ProposalStatus::Active;
        }

        let quorum_met = self.tally.total() >= quorum;
        if quorum_met && self.tally.for_votes > self.tally.against_votes {
            ProposalStatus::Succeeded
        } else {
            ProposalStatus::Defeated
        }
    }

    pub fn has_voted(&self, voter: &AccountId) -> bool {
        self.votes.contains_key(voter)
    }
}
