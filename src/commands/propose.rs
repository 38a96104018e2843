use anyhow::{Context, Result};
use colored::Colorize;
use merit_gov::account::AccountId;
use merit_gov::store::Store;

use super::{format_time, resolve_now};

/// Create a proposal against a topic
pub async fn execute(
    proposer: String,
    topic: u32,
    targets: Vec<String>,
    values: Vec<u64>,
    calldatas: Vec<String>,
    description: String,
    now: Option<u64>,
) -> Result<()> {
    for calldata in &calldatas {
        let stripped = calldata.strip_prefix("0x").unwrap_or(calldata);
        hex::decode(stripped)
            .with_context(|| format!("Invalid calldata (expected hex): {calldata}"))?;
    }

    let store = Store::resolve()?;
    let (mut gov, ledger) = store.load()?;
    let now = resolve_now(now);

    let id = gov.propose(
        &AccountId::new(proposer),
        topic,
        targets.into_iter().map(AccountId::new).collect(),
        values,
        calldatas,
        description,
        now,
    )?;

    let proposal = gov.proposal(id)?;
    println!("{}", format!("✓ Proposal created: {id}").green());
    println!("  Topic:     {}", proposal.topic_id);
    println!("  Snapshot:  {}", format_time(proposal.snapshot).dimmed());
    println!(
        "  Voting:    {} → {}",
        format_time(proposal.window_start),
        format_time(proposal.window_end)
    );

    store.save(&gov, &ledger)?;
    Ok(())
}
