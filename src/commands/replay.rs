use anyhow::{bail, Result};
use colored::Colorize;
use merit_gov::events::EventLog;
use merit_gov::reconcile::ReconciledState;
use merit_gov::store::Store;
use std::path::PathBuf;

/// Rebuild governance state from the event log alone and audit it against
/// the live engine
pub async fn execute(log: Option<PathBuf>) -> Result<()> {
    let store = Store::resolve()?;
    let log_path = log.unwrap_or_else(|| store.log_path());

    if !log_path.exists() {
        bail!("Event log not found: {}", log_path.display());
    }

    let records = EventLog::load_raw(&log_path)?;
    println!("Replaying {} log records from {}", records.len(), log_path.display());

    let state = ReconciledState::replay(&records);

    for proposal in state.proposals.values() {
        println!();
        println!("{}", "========================================".bright_cyan());
        println!("Proposal: {}", proposal.id.to_string().bright_yellow());
        if let Some(proposer) = &proposal.proposer {
            println!("Proposer: {proposer}");
        }
        if let Some(topic) = proposal.topic_id {
            println!("Topic:    {topic}");
        }
        println!(
            "Window:   {} → {}",
            proposal
                .window_start
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string()),
            proposal
                .window_end
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
        println!("Description: {}", proposal.description);
        if proposal.canceled {
            println!("{}", "Canceled".bright_red());
        }

        let tally = proposal.tally();
        println!(
            "Tally:    for={} against={} abstain={}",
            tally.for_votes.to_string().bright_green(),
            tally.against_votes.to_string().bright_red(),
            tally.abstain_votes.to_string().dimmed()
        );

        println!("Votes:    {}", proposal.votes.len());
        for vote in &proposal.votes {
            println!(
                " - {:<8} voter={} weight={} seq={}",
                vote.choice.to_string(),
                vote.voter,
                vote.weight,
                vote.log_seq
            );
            if let Some(reason) = &vote.reason {
                println!("   reason: {reason}");
            }
        }
    }

    if !state.orphan_votes.is_empty() {
        println!();
        println!(
            "{}",
            format!("⚠ {} orphaned vote(s): proposal never seen in the log", state.orphan_votes.len()).yellow()
        );
        for orphan in &state.orphan_votes {
            println!(
                "   seq={} proposal={} voter={}",
                orphan.log_seq,
                orphan.proposal_id,
                orphan
                    .voter
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "?".to_string())
            );
        }
    }

    if !state.degraded.is_empty() {
        println!();
        println!(
            "{}",
            format!("⚠ {} degraded record(s)", state.degraded.len()).yellow()
        );
        for record in &state.degraded {
            println!("   seq={}: {}", record.seq, record.reason);
        }
    }

    // Audit the replayed view against live state when one exists
    if store.state_path().exists() {
        let (gov, _ledger) = store.load()?;
        let divergences = state.diff_against(&gov);

        println!();
        if divergences.is_empty() {
            println!("{}", "✓ Replayed tallies match live state".green());
        } else {
            for divergence in &divergences {
                println!("{}", format!("✗ {divergence}").bright_red());
            }
            bail!("Replay diverged from live state");
        }
    } else {
        println!();
        println!("{}", "No live state to compare against".dimmed());
    }

    Ok(())
}
