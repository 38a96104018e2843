use crate::account::AccountId;
use crate::governor::Governor;
use crate::proposal::{TallyRecord, VoteChoice};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Positional fallback slot inside a record's `args` array
#[derive(Debug, Clone, Copy)]
enum Slot {
    FromStart(usize),
    FromEnd(usize),
}

/// Ordered lookup strategies for one logical event field.
///
/// Different producer versions place the same logical value under different
/// names, or only positionally inside an `args` array. Names are tried in
/// priority order; the positional slot is the fallback when no name matches.
#[derive(Debug, Clone, Copy)]
pub struct FieldProbe {
    names: &'static [&'static str],
    slot: Option<Slot>,
}

impl FieldProbe {
    const fn named(names: &'static [&'static str]) -> Self {
        Self { names, slot: None }
    }

    const fn with_start(names: &'static [&'static str], index: usize) -> Self {
        Self {
            names,
            slot: Some(Slot::FromStart(index)),
        }
    }

    const fn with_end(names: &'static [&'static str], index_from_end: usize) -> Self {
        Self {
            names,
            slot: Some(Slot::FromEnd(index_from_end)),
        }
    }

    /// Try each strategy in order against a raw record
    pub fn extract<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        for name in self.names {
            if let Some(value) = record.get(name) {
                if !value.is_null() {
                    return Some(value);
                }
            }
        }

        let args = record.get("args")?.as_array()?;
        match self.slot? {
            Slot::FromStart(i) => args.get(i),
            Slot::FromEnd(i) => {
                if args.len() > i {
                    args.get(args.len() - 1 - i)
                } else {
                    None
                }
            }
        }
    }
}

// Creation-event fields. Positional layout follows the widest known producer
// shape: [id, proposer, targets, values, signatures, calldatas, start, end,
// description], so the tail fields anchor from the end.
const CREATED_ID: FieldProbe = FieldProbe::with_start(&["id", "proposal_id", "proposalId"], 0);
const CREATED_PROPOSER: FieldProbe = FieldProbe::with_start(&["proposer"], 1);
const CREATED_START: FieldProbe =
    FieldProbe::with_end(&["window_start", "vote_start", "voteStart", "startBlock"], 2);
const CREATED_END: FieldProbe =
    FieldProbe::with_end(&["window_end", "vote_end", "voteEnd", "endBlock"], 1);
const CREATED_DESCRIPTION: FieldProbe = FieldProbe::with_end(&["description"], 0);
const TOPIC_ID: FieldProbe = FieldProbe::named(&["topic_id", "topicId", "topic"]);

// Vote-event fields: [voter, proposalId, support, weight, reason]
const VOTE_VOTER: FieldProbe = FieldProbe::with_start(&["voter"], 0);
const VOTE_PROPOSAL: FieldProbe = FieldProbe::with_start(&["proposal_id", "proposalId"], 1);
const VOTE_SUPPORT: FieldProbe = FieldProbe::with_start(&["choice", "support"], 2);
const VOTE_WEIGHT: FieldProbe =
    FieldProbe::with_start(&["effective_weight", "weight", "votes"], 3);
const VOTE_REASON: FieldProbe = FieldProbe::with_start(&["reason"], 4);

// Weight-batch fields
const WEIGHTS_DAY: FieldProbe = FieldProbe::with_start(&["day"], 0);
const WEIGHTS_TOPIC: FieldProbe = FieldProbe::with_start(&["topic_id", "topicId", "topic"], 1);
const WEIGHTS_ACCOUNTS: FieldProbe = FieldProbe::with_start(&["accounts", "addresses"], 2);
const WEIGHTS_CAPS: FieldProbe = FieldProbe::with_start(&["caps", "weights"], 3);

const CANCELED_ID: FieldProbe = FieldProbe::with_start(&["id", "proposal_id", "proposalId"], 0);

fn coerce_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn coerce_u32(value: &Value) -> Option<u32> {
    coerce_u64(value).and_then(|n| u32::try_from(n).ok())
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_choice(value: &Value) -> Option<VoteChoice> {
    if let Some(code) = value.as_u64() {
        return VoteChoice::from_support(code);
    }
    let s = value.as_str()?;
    if let Ok(code) = s.trim().parse::<u64>() {
        return VoteChoice::from_support(code);
    }
    VoteChoice::from_str(s).ok()
}

/// Normalized event kind: alphanumerics only, lowercase
fn event_kind(record: &Value) -> Option<String> {
    for key in ["type", "event", "name"] {
        if let Some(s) = record.get(key).and_then(Value::as_str) {
            let kind: String = s
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase();
            return Some(kind);
        }
    }
    None
}

/// A vote as rebuilt from the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledVote {
    pub voter: AccountId,
    pub choice: VoteChoice,
    pub weight: u64,
    pub reason: Option<String>,
    /// Log position of the originating record, the audit correlation handle
    pub log_seq: u64,
}

/// A proposal as rebuilt from the log; fields missing from a degraded
/// creation record stay `None`
#[derive(Debug, Clone)]
pub struct ReconciledProposal {
    pub id: u64,
    pub proposer: Option<AccountId>,
    pub topic_id: Option<u32>,
    pub window_start: Option<u64>,
    pub window_end: Option<u64>,
    pub description: String,
    pub canceled: bool,
    pub queued: bool,
    pub executed: bool,
    pub votes: Vec<ReconciledVote>,
}

impl ReconciledProposal {
    fn new(id: u64) -> Self {
        Self {
            id,
            proposer: None,
            topic_id: None,
            window_start: None,
            window_end: None,
            description: String::new(),
            canceled: false,
            queued: false,
            executed: false,
            votes: Vec::new(),
        }
    }

    /// Derived tally: a fold over the reconciled votes
    pub fn tally(&self) -> TallyRecord {
        self.votes.iter().fold(TallyRecord::default(), |tally, vote| {
            tally.accumulate(vote.choice, vote.weight).unwrap_or(tally)
        })
    }
}

/// A vote whose proposal never appeared in the log
#[derive(Debug, Clone)]
pub struct OrphanVote {
    pub proposal_id: u64,
    pub voter: Option<AccountId>,
    pub log_seq: u64,
}

/// A record the reconciler could not fully interpret; non-fatal
#[derive(Debug, Clone)]
pub struct DegradedRecord {
    pub seq: u64,
    pub reason: String,
}

/// Difference between the replayed view and live state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    TallyMismatch {
        id: u64,
        live: TallyRecord,
        replayed: TallyRecord,
    },
    MissingFromReplay { id: u64 },
    MissingFromLive { id: u64 },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TallyMismatch { id, live, replayed } => write!(
                f,
                "Proposal {id}: live tally {live:?} != replayed tally {replayed:?}"
            ),
            Self::MissingFromReplay { id } => {
                write!(f, "Proposal {id} exists live but not in the replayed log")
            }
            Self::MissingFromLive { id } => {
                write!(f, "Proposal {id} was replayed but does not exist live")
            }
        }
    }
}

/// State rebuilt purely from an ordered event log.
///
/// A single forward pass with no backtracking; safe to re-run from scratch
/// at any time. Malformed records are isolated and flagged, never fatal.
#[derive(Debug, Default)]
pub struct ReconciledState {
    pub proposals: BTreeMap<u64, ReconciledProposal>,
    /// Caps view keyed (day, topic, account), last write in log order wins
    pub caps: BTreeMap<(u64, u32, AccountId), u64>,
    pub orphan_votes: Vec<OrphanVote>,
    pub degraded: Vec<DegradedRecord>,
}

impl ReconciledState {
    /// Replay an ordered sequence of raw event records
    pub fn replay(records: &[Value]) -> Self {
        let mut state = Self::default();

        for (index, record) in records.iter().enumerate() {
            let seq = record
                .get("seq")
                .and_then(coerce_u64)
                .unwrap_or(index as u64);

            let Some(kind) = event_kind(record) else {
                state.degrade(seq, "record has no type/event/name field");
                continue;
            };

            if kind == "proposalcreated" {
                state.apply_created(seq, record);
            } else if kind.starts_with("votecast") {
                state.apply_vote(seq, record);
            } else if kind.contains("weight") {
                state.apply_weights(seq, record);
            } else if kind.contains("cancel") {
                state.apply_canceled(seq, record);
            } else if kind.contains("queued") {
                state.apply_mark(seq, record, |p| p.queued = true);
            } else if kind.contains("executed") {
                state.apply_mark(seq, record, |p| p.executed = true);
            } else {
                state.degrade(seq, format!("unrecognized event kind: {kind}"));
            }
        }

        state
    }

    fn degrade(&mut self, seq: u64, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Degraded record at seq {}: {}", seq, reason);
        self.degraded.push(DegradedRecord { seq, reason });
    }

    fn apply_created(&mut self, seq: u64, record: &Value) {
        let Some(id) = CREATED_ID.extract(record).and_then(coerce_u64) else {
            self.degrade(seq, "creation event without an extractable proposal id");
            return;
        };

        // First occurrence wins, matching the live idempotent-create contract
        if self.proposals.contains_key(&id) {
            return;
        }

        let mut proposal = ReconciledProposal::new(id);
        proposal.proposer = CREATED_PROPOSER
            .extract(record)
            .and_then(coerce_string)
            .map(AccountId::new);
        proposal.topic_id = TOPIC_ID.extract(record).and_then(coerce_u32);
        proposal.window_start = CREATED_START.extract(record).and_then(coerce_u64);
        proposal.window_end = CREATED_END.extract(record).and_then(coerce_u64);
        proposal.description = CREATED_DESCRIPTION
            .extract(record)
            .and_then(coerce_string)
            .unwrap_or_default();

        if proposal.window_start.is_none() || proposal.window_end.is_none() {
            self.degrade(seq, format!("proposal {id} created without window bounds"));
        }

        self.proposals.insert(id, proposal);
    }

    fn apply_vote(&mut self, seq: u64, record: &Value) {
        let Some(proposal_id) = VOTE_PROPOSAL.extract(record).and_then(coerce_u64) else {
            self.degrade(seq, "vote event without an extractable proposal id");
            return;
        };
        let voter = VOTE_VOTER
            .extract(record)
            .and_then(coerce_string)
            .map(AccountId::new);

        if !self.proposals.contains_key(&proposal_id) {
            // An orphan signals a schema or ordering gap; report, never drop
            self.orphan_votes.push(OrphanVote {
                proposal_id,
                voter,
                log_seq: seq,
            });
            return;
        }

        let Some(voter) = voter else {
            self.degrade(seq, format!("vote on proposal {proposal_id} without a voter"));
            return;
        };
        let Some(choice) = VOTE_SUPPORT.extract(record).and_then(coerce_choice) else {
            self.degrade(
                seq,
                format!("vote by {voter} on proposal {proposal_id} with unreadable support"),
            );
            return;
        };

        let duplicate = self
            .proposals
            .get(&proposal_id)
            .is_some_and(|p| p.votes.iter().any(|v| v.voter == voter));
        if duplicate {
            // Live casting rejects duplicates, so a second vote in the log is
            // itself a sign of damage; keep the first, flag the second
            self.degrade(
                seq,
                format!("duplicate vote by {voter} on proposal {proposal_id}"),
            );
            return;
        }

        let weight = match VOTE_WEIGHT.extract(record).and_then(coerce_u64) {
            Some(weight) => weight,
            None => {
                self.degrade(
                    seq,
                    format!("vote by {voter} on proposal {proposal_id} without a weight"),
                );
                0
            }
        };
        let reason = VOTE_REASON
            .extract(record)
            .and_then(coerce_string)
            .filter(|r| !r.is_empty());

        if let Some(proposal) = self.proposals.get_mut(&proposal_id) {
            proposal.votes.push(ReconciledVote {
                voter,
                choice,
                weight,
                reason,
                log_seq: seq,
            });
        }
    }

    fn apply_weights(&mut self, seq: u64, record: &Value) {
        let day = WEIGHTS_DAY.extract(record).and_then(coerce_u64);
        let topic_id = WEIGHTS_TOPIC.extract(record).and_then(coerce_u32);
        let (Some(day), Some(topic_id)) = (day, topic_id) else {
            self.degrade(seq, "weight batch without day/topic");
            return;
        };

        let accounts: Vec<AccountId> = WEIGHTS_ACCOUNTS
            .extract(record)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(coerce_string)
                    .map(AccountId::new)
                    .collect()
            })
            .unwrap_or_default();
        let caps: Vec<u64> = WEIGHTS_CAPS
            .extract(record)
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(coerce_u64).collect())
            .unwrap_or_default();

        if accounts.len() != caps.len() {
            self.degrade(
                seq,
                format!(
                    "weight batch for day {day} topic {topic_id}: {} accounts vs {} caps",
                    accounts.len(),
                    caps.len()
                ),
            );
        }

        for (account, cap) in accounts.into_iter().zip(caps) {
            self.caps.insert((day, topic_id, account), cap);
        }
    }

    fn apply_canceled(&mut self, seq: u64, record: &Value) {
        let Some(id) = CANCELED_ID.extract(record).and_then(coerce_u64) else {
            self.degrade(seq, "cancellation event without a proposal id");
            return;
        };
        match self.proposals.get_mut(&id) {
            Some(proposal) => proposal.canceled = true,
            None => self.degrade(seq, format!("cancellation of unknown proposal {id}")),
        }
    }

    fn apply_mark(&mut self, seq: u64, record: &Value, mark: impl FnOnce(&mut ReconciledProposal)) {
        let Some(id) = CANCELED_ID.extract(record).and_then(coerce_u64) else {
            self.degrade(seq, "lifecycle event without a proposal id");
            return;
        };
        match self.proposals.get_mut(&id) {
            Some(proposal) => mark(proposal),
            None => self.degrade(seq, format!("lifecycle event for unknown proposal {id}")),
        }
    }

    /// Cap view lookup, mirroring the live oracle's exact-key semantics
    pub fn cap_for(&self, day: u64, topic_id: u32, account: &AccountId) -> u64 {
        self.caps
            .get(&(day, topic_id, account.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Compare the replayed view against live state.
    ///
    /// After all events have been observed, every replayed tally must equal
    /// the live tally; any divergence is returned for diagnosis.
    pub fn diff_against(&self, governor: &Governor) -> Vec<Divergence> {
        let mut divergences = Vec::new();

        for live in governor.proposals() {
            match self.proposals.get(&live.id) {
                Some(replayed) => {
                    let replayed_tally = replayed.tally();
                    if replayed_tally != live.tally {
                        divergences.push(Divergence::TallyMismatch {
                            id: live.id,
                            live: live.tally,
                            replayed: replayed_tally,
                        });
                    }
                }
                None => divergences.push(Divergence::MissingFromReplay { id: live.id }),
            }
        }

        for id in self.proposals.keys() {
            if governor.proposal(*id).is_err() {
                divergences.push(Divergence::MissingFromLive { id: *id });
            }
        }

        divergences
    }
}
