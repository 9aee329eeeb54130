mod errors;
mod read_value;
#[cfg(test)]
mod tests;
mod timestamp;

pub use errors::TypesError;
pub use read_value::ReadValue;
pub use timestamp::{format_reading_timestamp, parse_reading_timestamp, ReadingTimestamp};

pub type AccountId = u32;
