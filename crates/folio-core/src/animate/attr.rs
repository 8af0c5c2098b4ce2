//! Lenient parsing of numeric data attributes
//!
//! Malformed values never surface as errors; they degrade to zero so the
//! display never shows a non-numeric value.

use tracing::debug;

/// Largest count shown exactly; integers above 2^53 - 1 lose precision as f64
pub const MAX_COUNT: u64 = (1 << 53) - 1;

/// Parse a counter target the way `parseInt` reads a leading integer
///
/// `"1200"` and `"42+"` parse; missing, empty, negative or non-numeric
/// values yield 0. Values are capped at [`MAX_COUNT`].
pub fn parse_count(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        debug!("Counter target attribute missing, using 0");
        return 0;
    };
    let trimmed = raw.trim_start();
    let digits: &str = {
        let end = trimmed
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && *c == '+')))
            .map(|(i, _)| i)
            .unwrap_or(trimmed.len());
        trimmed[..end].trim_start_matches('+')
    };

    if digits.is_empty() {
        debug!(value = raw, "Counter target is not a number, using 0");
        return 0;
    }

    // Saturate rather than fail on absurdly long digit runs
    let count = digits.parse::<u64>().unwrap_or(MAX_COUNT);
    if count > MAX_COUNT {
        debug!(value = raw, "Counter target too large, capping");
    }
    count.min(MAX_COUNT)
}

/// Parse a progress percentage the way `parseFloat` reads a leading number,
/// clamped to 0-100
pub fn parse_percent(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        debug!("Progress width attribute missing, using 0");
        return 0.0;
    };
    let trimmed = raw.trim();

    // Longest prefix that parses as a float, e.g. "85%" -> 85
    let value = (1..=trimmed.len())
        .rev()
        .filter(|&end| trimmed.is_char_boundary(end))
        .find_map(|end| trimmed[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite());

    match value {
        Some(v) => v.clamp(0.0, 100.0),
        None => {
            debug!(value = raw, "Progress width is not a number, using 0");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(Some("1200")), 1200);
        assert_eq!(parse_count(Some("  42+ projects")), 42);
        assert_eq!(parse_count(Some("+7")), 7);
        assert_eq!(parse_count(Some("0")), 0);
    }

    #[test]
    fn test_parse_count_caps_at_exact_f64_range() {
        assert_eq!(parse_count(Some("9007199254740991")), MAX_COUNT);
        assert_eq!(parse_count(Some("9007199254740993")), MAX_COUNT);
        assert_eq!(parse_count(Some("99999999999999999999")), MAX_COUNT);
    }

    #[test]
    fn test_parse_count_invalid_is_zero() {
        assert_eq!(parse_count(None), 0);
        assert_eq!(parse_count(Some("")), 0);
        assert_eq!(parse_count(Some("abc")), 0);
        assert_eq!(parse_count(Some("-5")), 0);
        assert_eq!(parse_count(Some("NaN")), 0);
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent(Some("85")), 85.0);
        assert_eq!(parse_percent(Some("72.5%")), 72.5);
        assert_eq!(parse_percent(Some("150")), 100.0);
        assert_eq!(parse_percent(Some("-3")), 0.0);
    }

    #[test]
    fn test_parse_percent_invalid_is_zero() {
        assert_eq!(parse_percent(None), 0.0);
        assert_eq!(parse_percent(Some("wide")), 0.0);
        assert_eq!(parse_percent(Some("inf")), 0.0);
    }
}
