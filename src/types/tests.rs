use super::{format_reading_timestamp, parse_reading_timestamp, ReadValue, TypesError};
use anyhow::Result;
use std::str::FromStr;

#[test]
fn test_read_value_successfully_parses_valid_strings() -> Result<()> {
    let test_cases = vec![
        ("0", 0),
        ("1", 1),
        ("00001", 1),
        ("12345", 12345),
        ("99999", 99999),
        ("10001", 10001),
    ];

    for (input_string, expected_value) in test_cases {
        assert_eq!(ReadValue::from_str(input_string)?.value(), expected_value);
    }

    Ok(())
}

#[test]
fn test_read_value_fails_to_parse_invalid_strings() {
    assert!(ReadValue::from_str("").is_err());
    assert!(ReadValue::from_str("12345A").is_err());
    assert!(ReadValue::from_str("123456").is_err());
    assert!(ReadValue::from_str("-1").is_err());
    assert!(ReadValue::from_str("+1").is_err());
    assert!(ReadValue::from_str("1.5").is_err());
    assert!(ReadValue::from_str(" 123").is_err());
    assert!(ReadValue::from_str("VOID").is_err());
    assert!(ReadValue::from_str("١٢٣").is_err());
}

#[test]
fn test_read_value_error_message_names_the_raw_text() {
    let error = ReadValue::from_str("12345A").err();

    assert!(matches!(error, Some(TypesError::InvalidReadValue(ref raw)) if raw == "12345A"));
    assert_eq!(
        error.map(|error| error.to_string()),
        Some("Invalid meter read value format: '12345A'. Must be NNNNN (1-5 digits).".to_string())
    );
}

#[test]
fn test_read_value_display_drops_leading_zeros() -> Result<()> {
    assert_eq!(ReadValue::from_str("00042")?.to_string(), "42");

    Ok(())
}

#[test]
fn test_read_value_conversion_enforces_upper_bound() {
    assert!(ReadValue::try_from(99_999).is_ok());
    assert!(ReadValue::try_from(100_000).is_err());
}

#[test]
fn test_timestamp_parses_fixed_format() -> Result<()> {
    let timestamp = parse_reading_timestamp("22/05/2025 05:24")?;

    assert_eq!(format_reading_timestamp(&timestamp), "22/05/2025 05:24");

    Ok(())
}

#[test]
fn test_timestamp_rejects_anything_but_an_exact_match() {
    assert!(parse_reading_timestamp("2/05/2025 05:24").is_err());
    assert!(parse_reading_timestamp("22/5/2025 05:24").is_err());
    assert!(parse_reading_timestamp("22/05/2025 5:24").is_err());
    assert!(parse_reading_timestamp("22/05/2025 05:24:00").is_err());
    assert!(parse_reading_timestamp("2025-05-22 05:24").is_err());
    assert!(parse_reading_timestamp("31/02/2025 05:24").is_err());
    assert!(parse_reading_timestamp("22/05/2025 24:00").is_err());
    assert!(parse_reading_timestamp("22/05/2025 05:24 ").is_err());
    assert!(parse_reading_timestamp("").is_err());
}

#[test]
fn test_timestamp_ordering_follows_calendar() -> Result<()> {
    let earlier = parse_reading_timestamp("22/05/2025 05:24")?;
    let later = parse_reading_timestamp("23/05/2025 05:30")?;

    assert!(earlier < later);

    Ok(())
}
