//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use chrono::NaiveDate;

/// Validate issue ID prefix format.
///
/// Delegates to the domain validator in `commands::init` to maintain
/// a single source of truth for validation rules.
pub fn validate_prefix(s: &str) -> Result<String, String> {
    use crate::commands::init;

    let trimmed = s.trim();
    init::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate title length and shape.
///
/// Titles must be non-blank, single-line and at most
/// [`MAX_TITLE_LENGTH`](crate::domain::MAX_TITLE_LENGTH) characters.
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();
    crate::domain::validate_title(s)?;

    if s.contains('\n') || s.contains('\r') {
        return Err("Title cannot contain newline characters".to_string());
    }

    Ok(s.to_string())
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{s}'. Expected YYYY-MM-DD (e.g., 2024-03-15)"))
}

/// Parse a duration into whole seconds.
///
/// Accepts bare seconds (`5400`) or unit groups in descending order
/// (`1h30m`, `90m`, `2h`, `45s`, `1h 5m 30s`).
pub fn parse_duration(s: &str) -> Result<u64, String> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err("Duration cannot be empty".to_string());
    }

    if let Ok(seconds) = compact.parse::<u64>() {
        return Ok(seconds);
    }

    let invalid = || format!("Invalid duration '{s}'. Use seconds or a form like 1h30m, 45m, 90s");
    let mut total: u64 = 0;
    let mut digits = String::new();
    let mut last_unit = u64::MAX;

    for c in compact.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c.to_ascii_lowercase() {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid()),
        };
        if digits.is_empty() || unit >= last_unit {
            return Err(invalid());
        }
        let value: u64 = digits.parse().map_err(|_| invalid())?;
        total = value
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(invalid)?;
        digits.clear();
        last_unit = unit;
    }

    if !digits.is_empty() {
        return Err(invalid());
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bare_seconds("5400", 5400)]
    #[case::zero("0", 0)]
    #[case::hours_minutes("1h30m", 5400)]
    #[case::minutes("90m", 5400)]
    #[case::hours("2h", 7200)]
    #[case::seconds("45s", 45)]
    #[case::spaced("1h 5m 30s", 3930)]
    #[case::uppercase("1H", 3600)]
    fn test_parse_duration_valid(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(parse_duration(input), Ok(expected));
    }

    #[rstest]
    #[case::empty("")]
    #[case::unit_only("h")]
    #[case::trailing_digits("1h30")]
    #[case::unknown_unit("3d")]
    #[case::out_of_order("30m1h")]
    #[case::repeated_unit("1h1h")]
    #[case::negative("-5m")]
    fn test_parse_duration_invalid(#[case] input: &str) {
        assert!(parse_duration(input).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-15"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert!(parse_date("15/03/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[rstest]
    #[case::trims("  Fix login  ", Ok("Fix login".to_string()))]
    #[case::blank("   ", Err(()))]
    fn test_validate_title(#[case] input: &str, #[case] expected: Result<String, ()>) {
        assert_eq!(validate_title(input).map_err(|_| ()), expected);
    }

    #[test]
    fn test_validate_title_rejects_long_titles() {
        assert!(validate_title(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_prefix() {
        assert_eq!(validate_prefix(" proj ").unwrap(), "proj");
        assert!(validate_prefix("a").is_err());
    }
}
