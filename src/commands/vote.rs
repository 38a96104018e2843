use anyhow::Result;
use colored::Colorize;
use merit_gov::account::AccountId;
use merit_gov::proposal::VoteChoice;
use merit_gov::store::Store;

use super::resolve_now;

/// Cast a vote on an active proposal
pub async fn execute(
    voter: String,
    proposal: u64,
    choice: String,
    reason: Option<String>,
    now: Option<u64>,
) -> Result<()> {
    let choice: VoteChoice = choice.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let store = Store::resolve()?;
    let (mut gov, ledger) = store.load()?;
    let now = resolve_now(now);

    let voter = AccountId::new(voter);
    let weight = gov.cast_vote(&ledger, &voter, proposal, choice, reason, now)?;

    println!(
        "{}",
        format!("✓ Vote cast: {choice} with effective weight {weight}").green()
    );

    let tally = gov.proposal_votes(proposal)?;
    println!("  For:      {}", tally.for_votes.to_string().bright_green());
    println!("  Against:  {}", tally.against_votes.to_string().bright_red());
    println!("  Abstain:  {}", tally.abstain_votes.to_string().dimmed());

    store.save(&gov, &ledger)?;
    Ok(())
}
