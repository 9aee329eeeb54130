use crate::types::{AccountId, ReadValue, ReadingTimestamp};

/// A single accepted meter reading.
///
/// Readings are only ever created by [`crate::models::Account`] and are never
/// mutated afterwards. Two readings are the same reading when account,
/// timestamp and value all match; there is no surrogate identity.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct MeterReading {
    account_id: AccountId,
    timestamp: ReadingTimestamp,
    value: ReadValue
}

impl MeterReading {
    pub(super) fn new(account_id: AccountId, timestamp: ReadingTimestamp, value: ReadValue) -> Self {
        Self {
            account_id,
            timestamp,
            value
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn timestamp(&self) -> ReadingTimestamp {
        self.timestamp
    }

    pub fn value(&self) -> ReadValue {
        self.value
    }
}
