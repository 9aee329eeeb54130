use crate::engine::{RowReader, UploadError};
use crate::models::{Account, RowRecord, UploadResult};
use crate::storage::{AccountRepository, StorageError};
use crate::types::{parse_reading_timestamp, AccountId, ReadingTimestamp};
use std::any::Any;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Read;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A row that passed the syntactic checks and is ready for the account aggregate.
struct ValidRow {
    account_id: AccountId,
    timestamp: ReadingTimestamp,
    raw_value: String
}

/// Working set for a single upload. Nothing in here outlives the call.
#[derive(Default)]
struct UploadBatch {
    /// Every account looked up so far, including ids the repository did not know.
    accounts: HashMap<AccountId, Option<Account>>,
    /// Accounts with at least one accepted reading, committed in id order.
    dirty: BTreeSet<AccountId>,
    seen: HashSet<(AccountId, ReadingTimestamp, String)>,
    errors: Vec<String>,
    total_rows: usize,
    syntax_failures: usize,
    domain_failures: usize,
    saved: usize
}

impl UploadBatch {
    fn failed(&self) -> usize {
        self.syntax_failures + self.domain_failures
    }

    fn reject_syntax(&mut self, record: &RowRecord, message: impl AsRef<str>) {
        self.syntax_failures += 1;
        self.errors.push(format!("{} | {}", record.error_prefix(), message.as_ref()));
    }

    fn reject_domain(&mut self, record: &RowRecord, message: impl AsRef<str>) {
        self.domain_failures += 1;
        self.errors.push(format!("{} | {}", record.error_prefix(), message.as_ref()));
    }
}

/// Turns an uploaded meter reading CSV into committed account readings.
pub struct UploadService<R: AccountRepository> {
    repository: Arc<R>,
    backpressure: usize
}

impl<R: AccountRepository> UploadService<R> {
    /// Creates a new service instance backed by the provided repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            backpressure: 256
        }
    }

    /// Sets how many parsed rows may be buffered ahead of validation.
    pub fn with_backpressure(mut self, backpressure: usize) -> Self {
        self.backpressure = backpressure;
        self
    }

    /// Validates every row of `input`, applies the valid readings to their accounts
    /// and commits all touched accounts as one batch.
    ///
    /// Row-level failures never abort the upload; they are counted and reported in
    /// the returned [`UploadResult`]. A failed commit is reported in the result as
    /// well, with every row counted as failed.
    ///
    /// # Errors
    /// Returns `UploadError::Canceled` if `cancellation` fires before the commit,
    /// and `UploadError::Storage` if an account lookup fails. Nothing is persisted
    /// in either case.
    pub async fn process_upload<I: Read + Send + 'static>(
        &self,
        input: I,
        file_name: &str,
        cancellation: &CancellationToken
    ) -> Result<UploadResult, UploadError> {
        let mut rows = RowReader::spawn(input, self.backpressure);
        let mut batch = UploadBatch::default();

        loop {
            let record = select! {
                biased;
                _ = cancellation.cancelled() => return Err(Self::canceled(file_name, &batch)),
                record = rows.next() => record
            };

            let Some(record) = record else {
                break;
            };

            batch.total_rows += 1;

            if let Err(source) = self.process_row(&mut batch, &record, file_name).await {
                return Err(UploadError::Storage {
                    file_name: file_name.to_string(),
                    source
                })
            }
        }

        rows.finish().await;

        if cancellation.is_cancelled() {
            return Err(Self::canceled(file_name, &batch))
        }

        let result = self.commit(batch, file_name).await;

        info!(
            "[{}] processed. Saved readings: [{}], failed readings: [{}]",
            file_name, result.saved_readings, result.failed_readings
        );

        Ok(result)
    }

    async fn process_row(&self, batch: &mut UploadBatch, record: &RowRecord, file_name: &str) -> Result<(), StorageError> {
        if !record.is_parsed() {
            let parse_error = record.parse_error.as_deref().unwrap_or_default();
            warn!("Parsing failed for row [{}] in [{file_name}]: {parse_error}", record.row_number);
            batch.reject_syntax(record, format!("Parse Error - {parse_error}"));
            return Ok(())
        }

        let row = match Self::validate(record) {
            Ok(row) => row,
            Err(message) => {
                debug!("Row [{}] in [{file_name}] failed validation: {message}", record.row_number);
                batch.reject_syntax(record, message);
                return Ok(())
            }
        };

        if !batch.seen.insert((row.account_id, row.timestamp, row.raw_value.clone())) {
            debug!("Row [{}] in [{file_name}] repeats an earlier row", record.row_number);
            batch.reject_syntax(record, "Duplicate entry within this batch.");
            return Ok(())
        }

        if !batch.accounts.contains_key(&row.account_id) {
            let account = self.repository.fetch_account(row.account_id).await?;
            batch.accounts.insert(row.account_id, account);
        }

        let Some(Some(account)) = batch.accounts.get_mut(&row.account_id) else {
            debug!("Row [{}] in [{file_name}] references unknown account [{}]", record.row_number, row.account_id);
            batch.reject_syntax(record, format!("Invalid Account ID [{}]", row.account_id));
            return Ok(())
        };

        //NOTE: The aggregate only appends after every rule has passed, so a panic cannot leave it half updated
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            account.add_meter_reading(row.timestamp, &row.raw_value).map(|_| ())
        }));

        match outcome {
            Ok(Ok(())) => {
                batch.saved += 1;
                batch.dirty.insert(row.account_id);
                debug!("Row [{}] in [{file_name}] accepted for account [{}]", record.row_number, row.account_id);
            }
            Ok(Err(error)) => {
                warn!(
                    "Domain validation failed for row [{}], account [{}] in [{file_name}]: {error}",
                    record.row_number, row.account_id
                );
                batch.reject_domain(record, error.to_string());
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    "Unexpected domain error for row [{}], account [{}] in [{file_name}]: {message}",
                    record.row_number, row.account_id
                );
                batch.reject_domain(record, format!("Unexpected domain error: {message}"));
            }
        }

        Ok(())
    }

    /// Syntactic checks, in order: account id, timestamp, value presence.
    fn validate(record: &RowRecord) -> Result<ValidRow, String> {
        let account_text = record.account_id.as_deref().unwrap_or_default();
        let account_id = account_text.parse::<AccountId>().ok()
            .filter(|account_id| *account_id > 0)
            .ok_or_else(|| format!("Invalid Account ID format [{account_text}]."))?;

        let timestamp_text = record.reading_date_time.as_deref().unwrap_or_default();
        let timestamp = parse_reading_timestamp(timestamp_text).map_err(|error| error.to_string())?;

        let raw_value = match record.read_value.as_deref() {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => return Err("Meter Read Value is missing.".to_string())
        };

        Ok(ValidRow {
            account_id,
            timestamp,
            raw_value
        })
    }

    /// Hands every dirty account to the repository and commits them together.
    ///
    /// The returned counts always reconcile with the number of rows read.
    async fn commit(&self, mut batch: UploadBatch, file_name: &str) -> UploadResult {
        let mut result = UploadResult::new(file_name);
        result.failed_readings = batch.failed();

        if batch.dirty.is_empty() {
            info!("No accounts required updates after processing [{file_name}]");
            result.saved_readings = batch.saved;
            result.errors = batch.errors;
            return result;
        }

        info!("Saving changes for [{}] accounts from [{file_name}]", batch.dirty.len());

        match self.save_accounts(&mut batch).await {
            Ok(written) => {
                info!("Saved changes for accounts from [{file_name}]. Readings written: [{written}]");
                result.saved_readings = batch.saved;
            }
            Err(error) => {
                error!("Failed to save batch for accounts from [{file_name}]: {error}");
                batch.errors.push(format!(
                    "Critical Error: Failed to save meter readings to the database due to a batch update failure: {error}"
                ));
                result.saved_readings = 0;
                result.failed_readings = batch.total_rows;
            }
        }

        result.errors = batch.errors;
        result
    }

    async fn save_accounts(&self, batch: &mut UploadBatch) -> Result<usize, StorageError> {
        for account_id in &batch.dirty {
            if let Some(Some(account)) = batch.accounts.remove(account_id) {
                self.repository.mark_dirty(account).await?;
            }
        }

        self.repository.commit().await
    }

    fn canceled(file_name: &str, batch: &UploadBatch) -> UploadError {
        warn!("Upload of [{file_name}] was canceled after [{}] rows, nothing was saved", batch.total_rows);

        UploadError::Canceled {
            file_name: file_name.to_string()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown failure".to_string()
    }
}
