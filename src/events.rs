use crate::account::{AccountId, ContextHash};
use crate::proposal::VoteChoice;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Durable governance events, the sole input of the log reconciler.
///
/// Consumers must tolerate extra fields and name variants from other
/// producer versions, so the reconciler reads raw JSON rather than this enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GovEvent {
    ProposalCreated {
        id: u64,
        proposer: AccountId,
        topic_id: u32,
        window_start: u64,
        window_end: u64,
        description: String,
    },
    VoteCast {
        proposal_id: u64,
        voter: AccountId,
        choice: VoteChoice,
        effective_weight: u64,
        reason: Option<String>,
    },
    WeightsPublished {
        day: u64,
        topic_id: u32,
        accounts: Vec<AccountId>,
        caps: Vec<u64>,
        context: ContextHash,
    },
    ProposalCanceled {
        id: u64,
    },
    ProposalQueued {
        id: u64,
        eta: u64,
    },
    ProposalExecuted {
        id: u64,
    },
}

/// One event with its position in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub seq: u64,
    #[serde(flatten)]
    pub event: GovEvent,
}

/// Ordered, append-only event log.
///
/// Positions are assigned on append and never reused; the log is the total
/// order that serializes all state transitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<LogRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number
    pub fn append(&mut self, event: GovEvent) -> u64 {
        let seq = self.records.len() as u64;
        debug!("Event {}: {:?}", seq, event);
        self.records.push(LogRecord { seq, event });
        seq
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the log as JSON Lines, one record per line
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }

        std::fs::write(path, out).context("Failed to write event log")?;
        Ok(())
    }

    /// Read a JSONL log written by `save`
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).context("Failed to read event log")?;

        let mut records = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let record: LogRecord =
                serde_json::from_str(line).context("Failed to parse event log record")?;
            records.push(record);
        }

        Ok(Self { records })
    }

    /// Read a JSONL log as raw JSON values, preserving unknown shapes.
    ///
    /// This is the reconciler's entry point: foreign producers may use
    /// different field names or positional argument arrays.
    pub fn load_raw(path: &Path) -> Result<Vec<Value>> {
        let contents =
            std::fs::read_to_string(path).context("Failed to read event log")?;

        let mut values = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value =
                serde_json::from_str(line).context("Failed to parse event log line")?;
            values.push(value);
        }

        Ok(values)
    }

    /// The log as raw JSON values, for in-process reconciliation
    pub fn to_raw(&self) -> Result<Vec<Value>> {
        self.records
            .iter()
            .map(|record| serde_json::to_value(record).context("Failed to encode record"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_events() -> Vec<GovEvent> {
        vec![
            GovEvent::ProposalCreated {
                id: 42,
                proposer: AccountId::new("alice"),
                topic_id: 1,
                window_start: 1_000,
                window_end: 2_000,
                description: "Fund the counter".to_string(),
            },
            GovEvent::VoteCast {
                proposal_id: 42,
                voter: AccountId::new("bob"),
                choice: VoteChoice::For,
                effective_weight: 100_000,
                reason: Some("looks good".to_string()),
            },
            GovEvent::WeightsPublished {
                day: 5,
                topic_id: 1,
                accounts: vec![AccountId::new("bob")],
                caps: vec![100_000],
                context: ContextHash::from_label("ctx"),
            },
            GovEvent::ProposalCanceled { id: 42 },
        ]
    }

    #[test]
    fn test_append_assigns_sequential_positions() {
        let mut log = EventLog::new();
        for (i, event) in sample_events().into_iter().enumerate() {
            assert_eq!(log.append(event), i as u64);
        }
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_jsonl_roundtrip_preserves_seq_and_payload() {
        let mut log = EventLog::new();
        for event in sample_events() {
            log.append(event);
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        log.save(&path).unwrap();

        let loaded = EventLog::load(&path).unwrap();
        assert_eq!(loaded, log);
    }

    #[test]
    fn test_records_carry_type_tag() {
        let mut log = EventLog::new();
        log.append(GovEvent::ProposalExecuted { id: 7 });

        let raw = log.to_raw().unwrap();
        assert_eq!(raw[0]["type"], "ProposalExecuted");
        assert_eq!(raw[0]["seq"], 0);
        assert_eq!(raw[0]["id"], 7);
    }

    #[test]
    fn test_load_raw_tolerates_foreign_shapes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        std::fs::write(
            &path,
            "{\"type\":\"VoteCast\",\"args\":[\"bob\",\"42\",1,\"100000\",\"\"]}\n\n",
        )
        .unwrap();

        let values = EventLog::load_raw(&path).unwrap();
        assert_eq!(values.len(), 1);
        assert!(values[0].get("args").is_some());
    }
}
