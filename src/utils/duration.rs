use crate::error::{LockError, Result};
use crate::lock::Span;
use std::time::Duration;

/// Parse a duration string like "250ms", "30s", "5m", "2h", "7d"
/// Defaults to seconds if no unit specified
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if s.is_empty() {
        return Err(LockError::InvalidDuration {
            input: s.to_string(),
            message: "empty string".to_string(),
        });
    }

    // "ms" must be checked before the single-letter units
    let (num_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, "s")
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, "m")
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, "h")
    } else if let Some(stripped) = s.strip_suffix('d') {
        (stripped, "d")
    } else {
        // No unit, assume seconds
        (s, "s")
    };

    let value: u64 = num_str.parse().map_err(|_| LockError::InvalidDuration {
        input: s.to_string(),
        message: "expected format: NUMBER[ms|s|m|h|d] (e.g., '250ms', '30s', '5m') or 'inf'"
            .to_string(),
    })?;

    let overflow = || LockError::InvalidDuration {
        input: s.to_string(),
        message: "value is too large".to_string(),
    };

    let duration = match unit {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(overflow)?),
        "h" => Duration::from_secs(value.checked_mul(60 * 60).ok_or_else(overflow)?),
        "d" => Duration::from_secs(value.checked_mul(60 * 60 * 24).ok_or_else(overflow)?),
        _ => unreachable!(),
    };

    Ok(duration)
}

/// Parse a duration string, additionally accepting "inf", "infinite" or "never"
/// for the infinite sentinel
pub fn parse_span(s: &str) -> Result<Span> {
    match s.trim().to_ascii_lowercase().as_str() {
        "inf" | "infinite" | "never" => Ok(Span::Infinite),
        _ => parse_duration(s).map(Span::Finite),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_units() {
        assert_eq!(parse_duration("1ms").unwrap().as_millis(), 1);
        assert_eq!(parse_duration("1s").unwrap().as_secs(), 1);
        assert_eq!(parse_duration("1m").unwrap().as_secs(), 60);
        assert_eq!(parse_duration("1h").unwrap().as_secs(), 3600);
        assert_eq!(parse_duration("1d").unwrap().as_secs(), 86400);
    }

    #[test]
    fn test_infinite_aliases() {
        assert_eq!(parse_span("inf").unwrap(), Span::Infinite);
        assert_eq!(parse_span(" Never ").unwrap(), Span::Infinite);
        assert_eq!(
            parse_span("200ms").unwrap(),
            Span::Finite(Duration::from_millis(200))
        );
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(parse_duration(&format!("{}d", u64::MAX)).is_err());
    }
}
