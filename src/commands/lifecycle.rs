use anyhow::Result;
use colored::Colorize;
use merit_gov::store::Store;

use super::{format_time, resolve_now};

/// Cancel a pending proposal
pub async fn cancel(proposal: u64, now: Option<u64>) -> Result<()> {
    let store = Store::resolve()?;
    let (mut gov, ledger) = store.load()?;

    gov.cancel(proposal, resolve_now(now))?;
    println!("{}", format!("✓ Proposal {proposal} canceled").green());

    store.save(&gov, &ledger)?;
    Ok(())
}

/// Queue a succeeded proposal for execution
pub async fn queue(proposal: u64, now: Option<u64>) -> Result<()> {
    let store = Store::resolve()?;
    let (mut gov, ledger) = store.load()?;

    let eta = gov.queue(proposal, resolve_now(now))?;
    println!("{}", format!("✓ Proposal {proposal} queued").green());
    println!("  Executable from: {}", format_time(eta));

    store.save(&gov, &ledger)?;
    Ok(())
}

/// Execute a queued proposal after its eta
pub async fn execute(proposal: u64, now: Option<u64>) -> Result<()> {
    let store = Store::resolve()?;
    let (mut gov, ledger) = store.load()?;

    gov.execute(proposal, resolve_now(now))?;
    println!("{}", format!("✓ Proposal {proposal} executed").green());

    store.save(&gov, &ledger)?;
    Ok(())
}
