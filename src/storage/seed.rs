use crate::models::Account;
use crate::storage::{AccountStorage, StorageError};
use crate::types::AccountId;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;
use tracing::{debug, info, warn};

/// A row of the account seed file (`AccountId,FirstName,LastName`).
#[derive(Debug, Deserialize)]
struct SeedAccount {
    #[serde(rename = "AccountId")]
    account_id: AccountId,
    #[serde(rename = "FirstName")]
    first_name: String,
    #[serde(rename = "LastName")]
    last_name: String
}

/// Populates the store from an account seed CSV and returns how many accounts were added.
///
/// Rows that cannot be deserialized or that fail account construction are skipped.
pub fn load_accounts<R: Read>(storage: &AccountStorage, reader: R) -> Result<usize, StorageError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut loaded = 0;

    for result in reader.deserialize::<SeedAccount>() {
        let seed = match result {
            Ok(seed) => seed,
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                warn!("Skipping account seed row: {error}");
                continue;
            }
        };

        match Account::new(seed.account_id, seed.first_name, seed.last_name) {
            Ok(account) => {
                debug!("Seeding account [{}] for [{} {}]", account.account_id, account.first_name, account.last_name);
                storage.add(account)?;
                loaded += 1;
            }
            Err(error) => warn!("Skipping account seed [{}]: {error}", seed.account_id)
        }
    }

    info!("Loaded [{loaded}] accounts from seed, store holds [{}]", storage.account_count());

    Ok(loaded)
}
