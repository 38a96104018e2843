mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "merit-gov")]
#[command(author = "Merit Governance Team")]
#[command(version = "0.1.0")]
#[command(about = "Topic-capped snapshot governance engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a proposal against a topic
    Propose {
        /// Account acting as the proposer
        #[arg(long = "as")]
        proposer: String,

        /// Topic the proposal is classified under
        #[arg(long)]
        topic: u32,

        /// Action target (repeatable)
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Action value (repeatable, parallel to --target)
        #[arg(long = "value")]
        values: Vec<u64>,

        /// Action calldata as hex (repeatable, parallel to --target)
        #[arg(long = "calldata")]
        calldatas: Vec<String>,

        /// Proposal description
        #[arg(long)]
        description: String,

        /// Simulated timestamp (defaults to wall clock)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Cast a vote on an active proposal
    Vote {
        /// Account casting the vote
        #[arg(long = "as")]
        voter: String,

        /// Proposal id
        #[arg(long)]
        proposal: u64,

        /// Vote choice: for, against, or abstain
        #[arg(long)]
        choice: String,

        /// Optional reason attached to the vote
        #[arg(long)]
        reason: Option<String>,

        /// Simulated timestamp (defaults to wall clock)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Publish daily voting-weight caps for a topic
    PublishWeights {
        /// Account publishing the batch (must be the authorized publisher)
        #[arg(long = "as")]
        publisher: String,

        /// Day index (defaults to the current day)
        #[arg(long)]
        day: Option<u64>,

        /// Topic the caps apply to
        #[arg(long)]
        topic: u32,

        /// Capped account (repeatable)
        #[arg(long = "account")]
        accounts: Vec<String>,

        /// Cap value (repeatable, parallel to --account)
        #[arg(long = "cap")]
        caps: Vec<u64>,

        /// Correlation label, hashed into the batch context
        #[arg(long, default_value = "manual")]
        context: String,

        /// Simulated timestamp (defaults to wall clock)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Record an account's raw voting power in the checkpoint ledger
    SetPower {
        /// Account to update
        #[arg(long)]
        account: String,

        /// Raw voting power
        #[arg(long)]
        power: u64,

        /// Simulated timestamp (defaults to wall clock)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Show proposal states and tallies
    Status {
        /// Proposal id (defaults to all proposals)
        #[arg(long)]
        proposal: Option<u64>,

        /// Simulated timestamp (defaults to wall clock)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Cancel a pending proposal
    Cancel {
        /// Proposal id
        #[arg(long)]
        proposal: u64,

        /// Simulated timestamp (defaults to wall clock)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Queue a succeeded proposal for execution
    Queue {
        /// Proposal id
        #[arg(long)]
        proposal: u64,

        /// Simulated timestamp (defaults to wall clock)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Execute a queued proposal after its eta
    Execute {
        /// Proposal id
        #[arg(long)]
        proposal: u64,

        /// Simulated timestamp (defaults to wall clock)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Rebuild state from the event log and audit it against live state
    Replay {
        /// Log file to replay (defaults to the state directory's log)
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Run the scripted capped-voting demo scenario
    Demo {
        /// Simulated timestamp (defaults to wall clock)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the active governance parameters
    Show,

    /// Update parameters (applies to a fresh state directory)
    Set {
        #[arg(long)]
        voting_delay: Option<u64>,

        #[arg(long)]
        voting_period: Option<u64>,

        #[arg(long)]
        quorum: Option<u64>,

        #[arg(long)]
        publisher: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("{}", "╔════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║   MERIT-GOV - Topic-Capped Governance      ║".bright_cyan());
    println!("{}", "╚════════════════════════════════════════════╝".bright_cyan());
    println!();

    let cli = Cli::parse();

    match cli.command {
        Commands::Propose {
            proposer,
            topic,
            targets,
            values,
            calldatas,
            description,
            now,
        } => {
            commands::propose::execute(proposer, topic, targets, values, calldatas, description, now)
                .await?;
        }
        Commands::Vote {
            voter,
            proposal,
            choice,
            reason,
            now,
        } => {
            commands::vote::execute(voter, proposal, choice, reason, now).await?;
        }
        Commands::PublishWeights {
            publisher,
            day,
            topic,
            accounts,
            caps,
            context,
            now,
        } => {
            commands::publish::execute(publisher, day, topic, accounts, caps, context, now).await?;
        }
        Commands::SetPower { account, power, now } => {
            commands::set_power::execute(account, power, now).await?;
        }
        Commands::Status { proposal, now } => {
            commands::status::execute(proposal, now).await?;
        }
        Commands::Cancel { proposal, now } => {
            commands::lifecycle::cancel(proposal, now).await?;
        }
        Commands::Queue { proposal, now } => {
            commands::lifecycle::queue(proposal, now).await?;
        }
        Commands::Execute { proposal, now } => {
            commands::lifecycle::execute(proposal, now).await?;
        }
        Commands::Replay { log } => {
            commands::replay::execute(log).await?;
        }
        Commands::Demo { now } => {
            commands::demo::execute(now).await?;
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show => commands::config::show().await?,
            ConfigCommands::Set {
                voting_delay,
                voting_period,
                quorum,
                publisher,
            } => {
                commands::config::set(voting_delay, voting_period, quorum, publisher).await?;
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verification() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_has_version() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version().unwrap(), "0.1.0");
    }
}
