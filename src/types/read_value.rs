use crate::types::errors::TypesError;
use regex::Regex;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

//NOTE: `\d` would also accept non-ASCII digits, so the class is spelled out.
static READ_VALUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,5}$").expect("read value pattern is valid")
});

/// A meter register value in the range `[0, 99999]`.
///
/// Leading zeros in the source text are accepted but not retained.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ReadValue(u32);

impl ReadValue {
    pub const MAX: u32 = 99_999;

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Display for ReadValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for ReadValue {
    type Err = TypesError;

    /// Parses the raw CSV text exactly as given; no trimming is performed here.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if !READ_VALUE_PATTERN.is_match(value) {
            return Err(TypesError::InvalidReadValue(value.to_string()));
        }

        let parsed: u32 = value.parse().map_err(|source| TypesError::ReadValueNotInteger {
            value: value.to_string(),
            source
        })?;

        ReadValue::try_from(parsed)
    }
}

impl TryFrom<u32> for ReadValue {
    type Error = TypesError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value > Self::MAX {
            return Err(TypesError::InvalidReadValue(value.to_string()));
        }

        Ok(ReadValue(value))
    }
}
