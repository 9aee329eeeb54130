use crate::models::errors::AccountError;
use crate::models::MeterReading;
use crate::types::{AccountId, ReadValue, ReadingTimestamp};
use std::str::FromStr;

/// Aggregate root for a single customer account and the meter readings it owns.
///
/// All meter reading rules live here: readings are accepted in non-decreasing
/// timestamp order, values must be 1-5 ASCII digits, and the same
/// (account, timestamp, value) reading may only be held once.
#[derive(Debug, Clone)]
pub struct Account {
    /// Positive, externally assigned account identifier.
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    /// Accepted readings in acceptance order (not necessarily timestamp order
    /// for readings loaded from storage).
    readings: Vec<MeterReading>
}

impl Account {
    /// Creates an account with no readings.
    ///
    /// # Errors
    /// Returns `AccountError` if the id is zero or either name is blank.
    pub fn new(account_id: AccountId, first_name: impl Into<String>, last_name: impl Into<String>) -> Result<Self, AccountError> {
        let first_name = first_name.into();
        let last_name = last_name.into();

        if account_id == 0 {
            return Err(AccountError::invalid_account_id(account_id))
        }

        if first_name.trim().is_empty() || last_name.trim().is_empty() {
            return Err(AccountError::missing_name(account_id))
        }

        Ok(Self {
            account_id,
            first_name,
            last_name,
            readings: Vec::new()
        })
    }

    pub fn readings(&self) -> &[MeterReading] {
        &self.readings
    }

    /// The held reading with the greatest timestamp, if any.
    pub fn latest_reading(&self) -> Option<&MeterReading> {
        self.readings.iter().max_by_key(|reading| reading.timestamp())
    }

    /// Validates and appends a new reading taken from raw CSV text.
    ///
    /// Rules are checked in order and the first failure is returned:
    /// 1. the timestamp must not be earlier than the latest held reading (ties pass),
    /// 2. the raw value must be 1-5 ASCII digits,
    /// 3. the typed reading must not already be held.
    ///
    /// A rejected reading leaves the account untouched, so later readings are
    /// checked against the last *accepted* one.
    pub fn add_meter_reading(&mut self, timestamp: ReadingTimestamp, raw_value: &str) -> Result<MeterReading, AccountError> {
        self.check_order(timestamp)?;

        #[cfg(test)]
        if raw_value == FAULT_VALUE {
            panic!("reading history is corrupted");
        }

        let value = ReadValue::from_str(raw_value)
            .map_err(|error| AccountError::invalid_value(self.account_id, error))?;

        let reading = MeterReading::new(self.account_id, timestamp, value);

        self.check_duplicate(&reading)?;
        self.readings.push(reading);

        Ok(reading)
    }

    /// Appends an already typed reading under the same ordering and duplicate rules.
    ///
    /// Used when merging staged readings into the committed copy of an account.
    pub fn append_reading(&mut self, reading: MeterReading) -> Result<(), AccountError> {
        self.check_order(reading.timestamp())?;
        self.check_duplicate(&reading)?;
        self.readings.push(reading);

        Ok(())
    }

    fn check_order(&self, timestamp: ReadingTimestamp) -> Result<(), AccountError> {
        let Some(latest) = self.latest_reading() else {
            return Ok(())
        };

        if timestamp < latest.timestamp() {
            return Err(AccountError::out_of_order(self.account_id, timestamp, latest.timestamp()))
        }

        Ok(())
    }

    fn check_duplicate(&self, reading: &MeterReading) -> Result<(), AccountError> {
        if self.readings.contains(reading) {
            return Err(AccountError::duplicate_reading(self.account_id, reading.timestamp(), reading.value()))
        }

        Ok(())
    }
}

/// Raw value that makes `add_meter_reading` panic, for exercising unexpected failures.
#[cfg(test)]
pub const FAULT_VALUE: &str = "FAULT";
