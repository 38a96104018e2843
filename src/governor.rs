use crate::account::{AccountId, ContextHash};
use crate::config::GovConfig;
use crate::errors::GovError;
use crate::events::{EventLog, GovEvent};
use crate::oracle::WeightOracle;
use crate::power::VotingPower;
use crate::proposal::{Proposal, ProposalAction, ProposalStatus, TallyRecord, Vote, VoteChoice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Core governance engine: proposal lifecycle, capped vote tallying, and the
/// durable event log that serializes every state transition.
///
/// All operations are synchronous computations over already-available state;
/// every validation error is detected before the first mutation, so a failed
/// call never leaves partial state behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Governor {
    config: GovConfig,
    oracle: WeightOracle,
    proposals: BTreeMap<u64, Proposal>,
    log: EventLog,
}

impl Governor {
    pub fn new(config: GovConfig) -> Self {
        let oracle = WeightOracle::new(config.publisher.clone(), config.seconds_per_day);
        Self {
            config,
            oracle,
            proposals: BTreeMap::new(),
            log: EventLog::new(),
        }
    }

    pub fn config(&self) -> &GovConfig {
        &self.config
    }

    pub fn oracle(&self) -> &WeightOracle {
        &self.oracle
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn proposal(&self, id: u64) -> Result<&Proposal, GovError> {
        self.proposals.get(&id).ok_or(GovError::UnknownProposal(id))
    }

    /// Create a proposal against a topic.
    ///
    /// The id is content-addressed, so re-proposing identical content is
    /// idempotent: the existing id is returned and no second creation event
    /// is appended.
    pub fn propose(
        &mut self,
        proposer: &AccountId,
        topic_id: u32,
        targets: Vec<AccountId>,
        values: Vec<u64>,
        calldatas: Vec<String>,
        description: String,
        now: u64,
    ) -> Result<u64, GovError> {
        if targets.len() != values.len() {
            return Err(GovError::ArityMismatch {
                field: "values",
                expected: targets.len(),
                actual: values.len(),
            });
        }
        if targets.len() != calldatas.len() {
            return Err(GovError::ArityMismatch {
                field: "calldatas",
                expected: targets.len(),
                actual: calldatas.len(),
            });
        }

        let id = Proposal::derive_id(topic_id, &targets, &values, &calldatas, &description);
        if self.proposals.contains_key(&id) {
            info!("Proposal {} already exists, returning existing id", id);
            return Ok(id);
        }

        let snapshot = now + self.config.voting_delay_secs;
        let window_start = snapshot;
        let window_end = snapshot + self.config.voting_period_secs;

        let actions = targets
            .into_iter()
            .zip(values)
            .zip(calldatas)
            .map(|((target, value), calldata)| ProposalAction {
                target,
                value,
                calldata,
            })
            .collect();

        let proposal = Proposal {
            id,
            proposer: proposer.clone(),
            topic_id,
            actions,
            description: description.clone(),
            snapshot,
            window_start,
            window_end,
            created_at: now,
            canceled: false,
            queued_eta: None,
            executed_at: None,
            tally: TallyRecord::default(),
            votes: BTreeMap::new(),
        };
        self.proposals.insert(id, proposal);

        self.log.append(GovEvent::ProposalCreated {
            id,
            proposer: proposer.clone(),
            topic_id,
            window_start,
            window_end,
            description,
        });

        info!(
            "Proposal {} created by {} on topic {} (window {}..{})",
            id, proposer, topic_id, window_start, window_end
        );

        Ok(id)
    }

    /// Proposal state at `now`; a pure projection, safe to re-evaluate
    pub fn state(&self, id: u64, now: u64) -> Result<ProposalStatus, GovError> {
        let proposal = self.proposal(id)?;
        Ok(proposal.status(now, self.config.quorum, self.config.grace_period_secs))
    }

    /// Cancel a proposal; permitted only while it is still `Pending`
    pub fn cancel(&mut self, id: u64, now: u64) -> Result<(), GovError> {
        let state = self.state(id, now)?;
        if state != ProposalStatus::Pending {
            return Err(GovError::InvalidStateTransition {
                id,
                state,
                action: "cancel",
            });
        }

        let proposal = self.proposals.get_mut(&id).ok_or(GovError::UnknownProposal(id))?;
        proposal.canceled = true;
        self.log.append(GovEvent::ProposalCanceled { id });

        info!("Proposal {} canceled", id);
        Ok(())
    }

    /// Cast a vote on an active proposal.
    ///
    /// The counted weight is `min(raw power at the snapshot, oracle cap for
    /// the topic today)`: the registry can restrict but never inflate an
    /// account's influence. Returns the effective weight.
    pub fn cast_vote(
        &mut self,
        power: &dyn VotingPower,
        voter: &AccountId,
        id: u64,
        choice: VoteChoice,
        reason: Option<String>,
        now: u64,
    ) -> Result<u64, GovError> {
        let state = self.state(id, now)?;
        if state != ProposalStatus::Active {
            return Err(GovError::InvalidStateTransition {
                id,
                state,
                action: "cast a vote",
            });
        }

        let proposal = self.proposal(id)?;
        if proposal.has_voted(voter) {
            return Err(GovError::DuplicateVote {
                id,
                voter: voter.clone(),
            });
        }

        let raw_power = power.power_at(voter, proposal.snapshot);
        let cap = self.oracle.weight_at(voter, now, proposal.topic_id);
        let effective_weight = raw_power.min(cap);

        // All checks passed; mutate tally and vote set together
        let tally = proposal
            .tally
            .accumulate(choice, effective_weight)
            .ok_or(GovError::Overflow(id))?;

        let proposal = self.proposals.get_mut(&id).ok_or(GovError::UnknownProposal(id))?;
        proposal.tally = tally;
        proposal.votes.insert(
            voter.clone(),
            Vote {
                proposal_id: id,
                voter: voter.clone(),
                choice,
                effective_weight,
                reason: reason.clone(),
                cast_at: now,
            },
        );

        self.log.append(GovEvent::VoteCast {
            proposal_id: id,
            voter: voter.clone(),
            choice,
            effective_weight,
            reason,
        });

        info!(
            "Vote cast on proposal {}: {} with weight {} by {} (raw {}, cap {})",
            id, choice, effective_weight, voter, raw_power, cap
        );

        Ok(effective_weight)
    }

    /// Queue a succeeded proposal for execution after the timelock delay
    pub fn queue(&mut self, id: u64, now: u64) -> Result<u64, GovError> {
        let state = self.state(id, now)?;
        if state != ProposalStatus::Succeeded {
            return Err(GovError::InvalidStateTransition {
                id,
                state,
                action: "queue",
            });
        }

        let eta = now + self.config.timelock_delay_secs;
        let proposal = self.proposals.get_mut(&id).ok_or(GovError::UnknownProposal(id))?;
        proposal.queued_eta = Some(eta);
        self.log.append(GovEvent::ProposalQueued { id, eta });

        info!("Proposal {} queued, eta {}", id, eta);
        Ok(eta)
    }

    /// Execute a queued proposal once its eta has passed
    pub fn execute(&mut self, id: u64, now: u64) -> Result<(), GovError> {
        let state = self.state(id, now)?;
        if state != ProposalStatus::Queued {
            return Err(GovError::InvalidStateTransition {
                id,
                state,
                action: "execute",
            });
        }

        let Some(eta) = self.proposal(id)?.queued_eta else {
            return Err(GovError::InvalidStateTransition {
                id,
                state,
                action: "execute",
            });
        };
        if now < eta {
            return Err(GovError::InvalidStateTransition {
                id,
                state,
                action: "execute before the eta",
            });
        }

        let proposal = self.proposals.get_mut(&id).ok_or(GovError::UnknownProposal(id))?;
        proposal.executed_at = Some(now);
        self.log.append(GovEvent::ProposalExecuted { id });

        info!("Proposal {} executed", id);
        Ok(())
    }

    /// Publish a batch of daily topic caps through the weight oracle
    pub fn publish_weights(
        &mut self,
        caller: &AccountId,
        day: u64,
        topic_id: u32,
        accounts: Vec<AccountId>,
        caps: Vec<u64>,
        context: ContextHash,
    ) -> Result<(), GovError> {
        self.oracle
            .publish(caller, day, topic_id, &accounts, &caps, context)?;

        self.log.append(GovEvent::WeightsPublished {
            day,
            topic_id,
            accounts,
            caps,
            context,
        });

        Ok(())
    }

    /// Live tally for a proposal
    pub fn proposal_votes(&self, id: u64) -> Result<TallyRecord, GovError> {
        Ok(self.proposal(id)?.tally)
    }
}
