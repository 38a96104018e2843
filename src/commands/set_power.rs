use anyhow::Result;
use colored::Colorize;
use merit_gov::account::AccountId;
use merit_gov::store::Store;

use super::resolve_now;

/// Record an account's raw voting power in the checkpoint ledger
pub async fn execute(account: String, power: u64, now: Option<u64>) -> Result<()> {
    let store = Store::resolve()?;
    let (gov, mut ledger) = store.load()?;
    let now = resolve_now(now);

    let account = AccountId::new(account);
    ledger.set_power(&account, power, now);

    println!(
        "{}",
        format!("✓ Voting power of {account} set to {power}").green()
    );

    store.save(&gov, &ledger)?;
    Ok(())
}
