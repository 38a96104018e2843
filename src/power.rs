use crate::account::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only point-in-time source of raw delegated voting power.
///
/// Implementations must be deterministic for a fixed snapshot: re-querying
/// later returns the same value as of that point.
pub trait VotingPower {
    fn power_at(&self, account: &AccountId, snapshot: u64) -> u64;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Checkpoint {
    at: u64,
    power: u64,
}

/// Checkpointed voting-power ledger.
///
/// Stand-in for the external token ledger: each `set_power` records a
/// checkpoint, and historical queries resolve to the last checkpoint at or
/// before the snapshot. Later writes never disturb earlier snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointLedger {
    checkpoints: BTreeMap<AccountId, Vec<Checkpoint>>,
}

impl CheckpointLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an account's power as of `now`.
    ///
    /// A second write at the same timestamp overwrites; writes keep the
    /// checkpoint list sorted by timestamp.
    pub fn set_power(&mut self, account: &AccountId, power: u64, now: u64) {
        let checkpoints = self.checkpoints.entry(account.clone()).or_default();
        let pos = checkpoints.partition_point(|c| c.at < now);

        if pos < checkpoints.len() && checkpoints[pos].at == now {
            checkpoints[pos].power = power;
        } else {
            checkpoints.insert(pos, Checkpoint { at: now, power });
        }
    }

    /// Latest recorded power for an account (zero if never set)
    pub fn current_power(&self, account: &AccountId) -> u64 {
        self.checkpoints
            .get(account)
            .and_then(|checkpoints| checkpoints.last())
            .map(|c| c.power)
            .unwrap_or(0)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &AccountId> {
        self.checkpoints.keys()
    }
}

impl VotingPower for CheckpointLedger {
    fn power_at(&self, account: &AccountId, snapshot: u64) -> u64 {
        let Some(checkpoints) = self.checkpoints.get(account) else {
            return 0;
        };

        let pos = checkpoints.partition_point(|c| c.at <= snapshot);
        if pos == 0 {
            0
        } else {
            checkpoints[pos - 1].power
        }
    }
}
