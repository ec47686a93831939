use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISO_DURATION: Regex =
        Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap();
}

/// Parses an ISO-8601 period of the `PT[nH][nM][nS]` shape into whole seconds. Missing
/// components default to 0; an unrecognized string also yields 0 rather than erroring, since a
/// malformed `duration` field should not fail the whole enrichment batch.
pub fn parse_iso8601_duration(raw: &str) -> i32 {
    let Some(caps) = ISO_DURATION.captures(raw) else {
        return 0;
    };

    let hours: i32 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let minutes: i32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let seconds: i32 = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);

    hours * 3600 + minutes * 60 + seconds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), 3723);
    }

    #[test]
    fn parses_minutes_only() {
        assert_eq!(parse_iso8601_duration("PT4M13S"), 253);
    }

    #[test]
    fn parses_seconds_only() {
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
    }

    #[test]
    fn missing_components_default_to_zero() {
        assert_eq!(parse_iso8601_duration("PT1H"), 3600);
    }

    #[test]
    fn malformed_duration_yields_zero() {
        assert_eq!(parse_iso8601_duration("not-a-duration"), 0);
    }
}
