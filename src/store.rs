use crate::config::GovConfig;
use crate::governor::Governor;
use crate::power::CheckpointLedger;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment override for the state directory, used by tests and scripts
pub const STATE_DIR_ENV: &str = "MERIT_GOV_DIR";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    governor: Governor,
    ledger: CheckpointLedger,
}

/// On-disk state directory: `config.toml`, `state.json`, `events.jsonl`.
///
/// `state.json` is the live engine snapshot; `events.jsonl` is the durable
/// append-only history the replay command audits against.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the state directory: env override first, then the platform
    /// data directory
    pub fn resolve() -> Result<Self> {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            return Ok(Self::at(dir));
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find data directory"))?;
        Ok(Self::at(data_dir.join("merit-gov")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join("state.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join("events.jsonl")
    }

    pub fn load_config(&self) -> Result<GovConfig> {
        GovConfig::load(&self.dir)
    }

    /// Load the engine and ledger, or start fresh from config on first use
    pub fn load(&self) -> Result<(Governor, CheckpointLedger)> {
        let path = self.state_path();

        if !path.exists() {
            let config = self.load_config()?;
            debug!("No state at {:?}, starting fresh", path);
            return Ok((Governor::new(config), CheckpointLedger::new()));
        }

        let contents =
            std::fs::read_to_string(&path).context("Failed to read state file")?;
        let state: PersistedState =
            serde_json::from_str(&contents).context("Failed to parse state file")?;

        Ok((state.governor, state.ledger))
    }

    /// Persist the engine snapshot and rewrite the event log file
    pub fn save(&self, governor: &Governor, ledger: &CheckpointLedger) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        governor.log().save(&self.log_path())?;

        let state = PersistedState {
            governor: governor.clone(),
            ledger: ledger.clone(),
        };
        let contents = serde_json::to_string_pretty(&state)?;
        std::fs::write(self.state_path(), contents).context("Failed to write state file")?;

        Ok(())
    }
}
