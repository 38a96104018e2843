use anyhow::Result;
use colored::Colorize;
use merit_gov::account::AccountId;
use merit_gov::store::Store;

/// Show the active governance parameters
pub async fn show() -> Result<()> {
    let store = Store::resolve()?;

    // The engine snapshot carries the parameters it was created with;
    // config.toml only seeds a fresh state directory
    let config = if store.state_path().exists() {
        let (gov, _ledger) = store.load()?;
        gov.config().clone()
    } else {
        store.load_config()?
    };

    println!("{}", "Merit Governance Configuration".bright_cyan().bold());
    println!("  Voting delay:    {}s", config.voting_delay_secs);
    println!("  Voting period:   {}s", config.voting_period_secs);
    println!("  Quorum:          {}", config.quorum);
    println!("  Timelock delay:  {}s", config.timelock_delay_secs);
    println!("  Grace period:    {}s", config.grace_period_secs);
    println!("  Seconds per day: {}", config.seconds_per_day);
    println!("  Publisher:       {}", config.publisher.to_string().bright_yellow());
    println!("  State dir:       {}", store.dir().display().to_string().dimmed());

    Ok(())
}

/// Update governance parameters in config.toml.
///
/// Parameters are loaded once when a state directory is initialized, so
/// changes here apply to a fresh state, not an existing one.
pub async fn set(
    voting_delay: Option<u64>,
    voting_period: Option<u64>,
    quorum: Option<u64>,
    publisher: Option<String>,
) -> Result<()> {
    let store = Store::resolve()?;
    let mut config = store.load_config()?;

    if let Some(delay) = voting_delay {
        config.voting_delay_secs = delay;
        println!("{}", format!("✓ Voting delay set to {delay}s").green());
    }
    if let Some(period) = voting_period {
        config.voting_period_secs = period;
        println!("{}", format!("✓ Voting period set to {period}s").green());
    }
    if let Some(quorum) = quorum {
        config.quorum = quorum;
        println!("{}", format!("✓ Quorum set to {quorum}").green());
    }
    if let Some(publisher) = publisher {
        config.publisher = AccountId::new(publisher);
        println!("{}", format!("✓ Publisher set to {}", config.publisher).green());
    }

    config.save(store.dir())?;

    if store.state_path().exists() {
        println!(
            "  {}",
            "Note: an existing state keeps the parameters it was created with".yellow()
        );
    }

    Ok(())
}
