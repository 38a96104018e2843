use anyhow::Result;
use colored::{ColoredString, Colorize};
use merit_gov::proposal::{Proposal, ProposalStatus};
use merit_gov::store::Store;

use super::{format_time, resolve_now};

fn colored_status(status: ProposalStatus) -> ColoredString {
    match status {
        ProposalStatus::Pending => status.to_string().yellow(),
        ProposalStatus::Active => status.to_string().bright_green(),
        ProposalStatus::Succeeded | ProposalStatus::Executed => status.to_string().green(),
        ProposalStatus::Queued => status.to_string().bright_cyan(),
        ProposalStatus::Defeated | ProposalStatus::Canceled => status.to_string().bright_red(),
        ProposalStatus::Expired => status.to_string().dimmed(),
    }
}

fn print_proposal(proposal: &Proposal, status: ProposalStatus) {
    println!("{}", "═══════════════════════════════════════════════════".bright_cyan());
    println!("  Proposal:  {}", proposal.id.to_string().bright_yellow());
    println!("  Proposer:  {}", proposal.proposer);
    println!("  Topic:     {}", proposal.topic_id);
    println!("  State:     {}", colored_status(status));
    println!("  Snapshot:  {}", format_time(proposal.snapshot).dimmed());
    println!(
        "  Voting:    {} → {}",
        format_time(proposal.window_start),
        format_time(proposal.window_end)
    );
    println!("  Description: {}", proposal.description);
    println!();
    println!("  For:      {}", proposal.tally.for_votes.to_string().bright_green());
    println!("  Against:  {}", proposal.tally.against_votes.to_string().bright_red());
    println!("  Abstain:  {}", proposal.tally.abstain_votes.to_string().dimmed());

    if !proposal.votes.is_empty() {
        println!();
        println!("  Votes ({}):", proposal.votes.len());
        for vote in proposal.votes.values() {
            println!(
                "   - {:<8} voter={} weight={}",
                vote.choice.to_string(),
                vote.voter,
                vote.effective_weight
            );
            if let Some(reason) = &vote.reason {
                println!("     reason: {}", reason.dimmed());
            }
        }
    }
}

/// Show the state and tally of one proposal, or all of them
pub async fn execute(proposal: Option<u64>, now: Option<u64>) -> Result<()> {
    let store = Store::resolve()?;
    let (gov, _ledger) = store.load()?;
    let now = resolve_now(now);

    match proposal {
        Some(id) => {
            let status = gov.state(id, now)?;
            print_proposal(gov.proposal(id)?, status);
        }
        None => {
            let mut count = 0;
            for proposal in gov.proposals() {
                let status = gov.state(proposal.id, now)?;
                print_proposal(proposal, status);
                count += 1;
            }
            if count == 0 {
                println!("{}", "No proposals yet".yellow());
                println!("  {}", "Use 'merit-gov propose' to create one".dimmed());
            }
        }
    }

    Ok(())
}
