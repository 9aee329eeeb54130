use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("Invalid meter read value format: '{0}'. Must be NNNNN (1-5 digits).")]
    InvalidReadValue(String),
    #[error("Meter read value '{value}' is not an integer.")]
    ReadValueNotInteger {
        value: String,
        #[source]
        source: ParseIntError
    },
    #[error("Invalid Meter Reading Date Time format [{0}]. Expected dd/MM/yyyy HH:mm.")]
    InvalidTimestamp(String)
}
