use crate::types::errors::TypesError;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

pub type ReadingTimestamp = NaiveDateTime;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

//NOTE: chrono accepts unpadded numeric fields when parsing, the shape check keeps the match exact.
static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4} [0-9]{2}:[0-9]{2}$").expect("timestamp pattern is valid")
});

/// Parses a reading timestamp in the fixed `dd/MM/yyyy HH:mm` (24-hour) format.
pub fn parse_reading_timestamp(value: &str) -> Result<ReadingTimestamp, TypesError> {
    if !TIMESTAMP_PATTERN.is_match(value) {
        return Err(TypesError::InvalidTimestamp(value.to_string()));
    }

    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|_| TypesError::InvalidTimestamp(value.to_string()))
}

pub fn format_reading_timestamp(timestamp: &ReadingTimestamp) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
