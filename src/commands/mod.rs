pub mod config;
pub mod demo;
pub mod lifecycle;
pub mod propose;
pub mod publish;
pub mod replay;
pub mod set_power;
pub mod status;
pub mod vote;

/// Wall-clock now unless a simulated timestamp was supplied
pub fn resolve_now(now: Option<u64>) -> u64 {
    now.unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64)
}

/// Render a Unix timestamp for display
pub fn format_time(timestamp: u64) -> String {
    chrono::DateTime::from_timestamp(timestamp as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_now_honors_override() {
        assert_eq!(resolve_now(Some(123)), 123);
    }

    #[test]
    fn test_resolve_now_defaults_to_wall_clock() {
        assert!(resolve_now(None) > 1_700_000_000);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "1970-01-01 00:00:00 UTC");
    }
}
