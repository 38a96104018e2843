use crate::account::{AccountId, ContextHash};
use crate::errors::GovError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A recorded voting-weight cap for one (day, topic, account) key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub day: u64,
    pub topic_id: u32,
    pub account: AccountId,
    pub cap: u64,
    pub context: ContextHash,
}

/// Day-keyed, topic-keyed, account-keyed registry of voting-weight caps.
///
/// Caps are strictly daily facts: a lookup for a day that was never published
/// returns zero, with no interpolation from neighboring days. Publishing the
/// same key twice overwrites (last-write-wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightOracle {
    publisher: AccountId,
    seconds_per_day: u64,
    entries: BTreeMap<u64, BTreeMap<u32, BTreeMap<AccountId, WeightEntry>>>,
}

impl WeightOracle {
    pub fn new(publisher: AccountId, seconds_per_day: u64) -> Self {
        Self {
            publisher,
            seconds_per_day,
            entries: BTreeMap::new(),
        }
    }

    pub fn publisher(&self) -> &AccountId {
        &self.publisher
    }

    /// Day index containing the given timestamp (floor division)
    pub fn day_of(&self, timestamp: u64) -> u64 {
        timestamp / self.seconds_per_day
    }

    /// Record a batch of caps for one day and topic.
    ///
    /// `accounts` and `caps` are parallel arrays; every entry overwrites any
    /// prior cap for its (day, topic, account) key. All validation happens
    /// before the first write, so a failed call leaves the registry untouched.
    pub fn publish(
        &mut self,
        caller: &AccountId,
        day: u64,
        topic_id: u32,
        accounts: &[AccountId],
        caps: &[u64],
        context: ContextHash,
    ) -> Result<Vec<WeightEntry>, GovError> {
        if caller != &self.publisher {
            return Err(GovError::Unauthorized(caller.clone()));
        }
        if accounts.len() != caps.len() {
            return Err(GovError::ArityMismatch {
                field: "caps",
                expected: accounts.len(),
                actual: caps.len(),
            });
        }

        let by_account = self
            .entries
            .entry(day)
            .or_default()
            .entry(topic_id)
            .or_default();

        let mut batch = Vec::with_capacity(accounts.len());
        for (account, &cap) in accounts.iter().zip(caps) {
            let entry = WeightEntry {
                day,
                topic_id,
                account: account.clone(),
                cap,
                context,
            };
            by_account.insert(account.clone(), entry.clone());
            batch.push(entry);
        }

        info!(
            "Published {} weight caps for day {} topic {}",
            batch.len(),
            day,
            topic_id
        );

        Ok(batch)
    }

    /// Cap recorded for the day containing `timestamp`, or zero if none.
    ///
    /// Read-only; always reflects the latest publish for the key.
    pub fn weight_at(&self, account: &AccountId, timestamp: u64, topic_id: u32) -> u64 {
        let day = self.day_of(timestamp);
        let cap = self
            .entries
            .get(&day)
            .and_then(|topics| topics.get(&topic_id))
            .and_then(|accounts| accounts.get(account))
            .map(|entry| entry.cap)
            .unwrap_or(0);

        debug!(
            "weight_at({}, day {}, topic {}) = {}",
            account, day, topic_id, cap
        );

        cap
    }

    /// Current day index for a wall-clock timestamp
    pub fn current_day(&self, now: u64) -> u64 {
        self.day_of(now)
    }
}
