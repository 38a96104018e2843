use anyhow::{bail, Result};
use colored::Colorize;
use merit_gov::account::{AccountId, ContextHash};
use merit_gov::proposal::{ProposalStatus, VoteChoice};
use merit_gov::store::Store;

use super::resolve_now;

const CAP_TOPIC1: u64 = 100_000;
const CAP_TOPIC2: u64 = 1_000_000;
const VOTER_POWER: u64 = 1_000_000;

/// Scripted end-to-end scenario: one voter with 1M raw power, capped to
/// 100k on topic 1 and 1M on topic 2, voting For on one proposal per topic.
pub async fn execute(now: Option<u64>) -> Result<()> {
    let store = Store::resolve()?;
    let (mut gov, mut ledger) = store.load()?;

    let base = resolve_now(now);
    let voter = AccountId::new("demo-voter");
    let admin = gov.config().publisher.clone();

    println!("{}", "═══ Demo: topic-capped voting ═══".bright_cyan());
    println!("  Voter:      {voter}");
    println!("  Raw power:  {VOTER_POWER}");
    println!();

    // Delegate-equivalent: checkpoint the voter's raw power before the snapshot
    ledger.set_power(&voter, VOTER_POWER, base);

    // Votes land after the voting delay; caps are daily facts, so publish
    // for the day the votes will be cast on
    let vote_time = base + gov.config().voting_delay_secs + 1;
    let day = gov.oracle().current_day(vote_time);

    gov.publish_weights(
        &admin,
        day,
        1,
        vec![voter.clone()],
        vec![CAP_TOPIC1],
        ContextHash::from_label("ctx-topic1"),
    )?;
    gov.publish_weights(
        &admin,
        day,
        2,
        vec![voter.clone()],
        vec![CAP_TOPIC2],
        ContextHash::from_label("ctx-topic2"),
    )?;
    println!("  Published caps for day {day}: topic1={CAP_TOPIC1}, topic2={CAP_TOPIC2}");

    let propose = |gov: &mut merit_gov::governor::Governor, topic: u32| {
        gov.propose(
            &voter,
            topic,
            vec![AccountId::new("counter")],
            vec![0],
            vec!["d09de08a".to_string()],
            format!("Demo: topic {topic} #{base}"),
            base,
        )
    };
    let p1 = propose(&mut gov, 1)?;
    let p2 = propose(&mut gov, 2)?;
    println!("  Proposal on topic 1: {p1}");
    println!("  Proposal on topic 2: {p2}");

    for id in [p1, p2] {
        let state = gov.state(id, vote_time)?;
        if state != ProposalStatus::Active {
            bail!("Proposal {id} should be Active at vote time, found {state}");
        }
    }

    let used1 = gov.cast_vote(
        &ledger,
        &voter,
        p1,
        VoteChoice::For,
        Some("demo says FOR".to_string()),
        vote_time,
    )?;
    let used2 = gov.cast_vote(
        &ledger,
        &voter,
        p2,
        VoteChoice::For,
        Some("demo says FOR".to_string()),
        vote_time,
    )?;

    println!();
    println!("{}", "═══ Results ═══".bright_cyan());
    println!(
        "  Topic 1: used={} (expected {})",
        used1.to_string().bright_yellow(),
        CAP_TOPIC1
    );
    println!(
        "  Topic 2: used={} (expected {})",
        used2.to_string().bright_yellow(),
        CAP_TOPIC2
    );

    store.save(&gov, &ledger)?;

    if used1 != CAP_TOPIC1 {
        bail!("Topic 1 mismatch: got {used1}");
    }
    if used2 != CAP_TOPIC2 {
        bail!("Topic 2 mismatch: got {used2}");
    }

    println!();
    println!(
        "{}",
        format!("✓ OK: topic 1 capped to {CAP_TOPIC1}, topic 2 capped to {CAP_TOPIC2}").green()
    );
    println!("  {}", "Now run: merit-gov replay".dimmed());

    Ok(())
}
