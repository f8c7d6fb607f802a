use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").unwrap()
});

/// Formats an ISO-8601 duration such as `PT1H2M3S` as a clock string:
/// `H:MM:SS` when there is at least one hour, `M:SS` otherwise.
pub fn format_duration(iso: &str) -> Result<String> {
    let caps = ISO_DURATION
        .captures(iso.trim())
        .ok_or_else(|| anyhow::anyhow!("Unsupported duration format: {:?}", iso))?;

    let component = |index: usize| -> Result<u64> {
        caps.get(index)
            .map(|m| m.as_str().parse::<u64>())
            .transpose()
            .with_context(|| format!("Duration component out of range in {:?}", iso))
            .map(|value| value.unwrap_or(0))
    };

    // days are folded into the hour field
    let days = component(1)?;
    let hours = days
        .checked_mul(24)
        .and_then(|h| h.checked_add(component(2).ok()?))
        .ok_or_else(|| anyhow::anyhow!("Duration out of range: {:?}", iso))?;
    let minutes = component(3)?;
    let seconds = component(4)?;

    if hours > 0 {
        Ok(format!("{}:{:02}:{:02}", hours, minutes, seconds))
    } else {
        Ok(format!("{}:{:02}", minutes, seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration("PT1H2M3S").unwrap(), "1:02:03");
        assert_eq!(format_duration("PT5M9S").unwrap(), "5:09");
        assert_eq!(format_duration("PT45S").unwrap(), "0:45");
        assert_eq!(format_duration("PT2H").unwrap(), "2:00:00");
        assert_eq!(format_duration("PT0S").unwrap(), "0:00");
        assert_eq!(format_duration("PT3M20S").unwrap(), "3:20");
    }

    #[test]
    fn test_minutes_not_padded_without_hours() {
        assert_eq!(format_duration("PT59M59S").unwrap(), "59:59");
        assert_eq!(format_duration("PT12M").unwrap(), "12:00");
    }

    #[test]
    fn test_hours_not_padded() {
        assert_eq!(format_duration("PT10H5S").unwrap(), "10:00:05");
    }

    #[test]
    fn test_days_fold_into_hours() {
        assert_eq!(format_duration("P1DT2H3M4S").unwrap(), "26:03:04");
        assert_eq!(format_duration("P0D").unwrap(), "0:00");
    }

    #[test]
    fn test_invalid_durations() {
        assert!(format_duration("").is_err());
        assert!(format_duration("1:02:03").is_err());
        assert!(format_duration("PT1.5S").is_err());
        assert!(format_duration("PT99999999999999999999S").is_err());
    }
}
