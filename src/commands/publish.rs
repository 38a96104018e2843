use anyhow::Result;
use colored::Colorize;
use merit_gov::account::{AccountId, ContextHash};
use merit_gov::store::Store;

use super::resolve_now;

/// Publish a batch of daily voting-weight caps
pub async fn execute(
    publisher: String,
    day: Option<u64>,
    topic: u32,
    accounts: Vec<String>,
    caps: Vec<u64>,
    context: String,
    now: Option<u64>,
) -> Result<()> {
    let store = Store::resolve()?;
    let (mut gov, ledger) = store.load()?;
    let now = resolve_now(now);

    let day = day.unwrap_or_else(|| gov.oracle().current_day(now));
    let count = accounts.len();

    gov.publish_weights(
        &AccountId::new(publisher),
        day,
        topic,
        accounts.into_iter().map(AccountId::new).collect(),
        caps,
        ContextHash::from_label(&context),
    )?;

    println!(
        "{}",
        format!("✓ Published {count} weight caps for day {day}, topic {topic}").green()
    );
    println!("  Context: {}", ContextHash::from_label(&context).to_string().dimmed());

    store.save(&gov, &ledger)?;
    Ok(())
}
