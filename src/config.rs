use crate::account::AccountId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Governance parameters, loaded once at process start and immutable after.
///
/// All durations are in seconds; `quorum` is an absolute weight that the
/// combined tally (for + against + abstain) must reach for a proposal to
/// succeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovConfig {
    /// Delay between proposal creation and the start of voting
    pub voting_delay_secs: u64,
    /// Length of the voting window
    pub voting_period_secs: u64,
    /// Minimum total cast weight for a proposal to succeed
    pub quorum: u64,
    /// Delay between queueing a succeeded proposal and its execution eta
    pub timelock_delay_secs: u64,
    /// Window after the eta during which a queued proposal may execute
    pub grace_period_secs: u64,
    /// Day granularity used by the weight oracle
    pub seconds_per_day: u64,
    /// Sole account allowed to publish weight batches
    pub publisher: AccountId,
}

impl Default for GovConfig {
    fn default() -> Self {
        Self {
            voting_delay_secs: 60,
            voting_period_secs: 1200,
            quorum: 100,
            timelock_delay_secs: 3600,
            grace_period_secs: 7 * 24 * 60 * 60,
            seconds_per_day: 86_400,
            publisher: AccountId::new("admin"),
        }
    }
}

impl GovConfig {
    /// Config file path inside a state directory
    pub fn path(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    /// Load config from a state directory, creating the default on first use
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::path(dir);

        if !path.exists() {
            let config = Self::default();
            config.save(dir)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&path).context("Failed to read config file")?;

        let config: GovConfig =
            toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to a state directory
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::path(dir);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        Ok(())
    }
}
