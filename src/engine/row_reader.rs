use crate::models::RowRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use tokio::sync::mpsc;
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{debug, error, warn};

pub const ACCOUNT_ID_COLUMN: &str = "AccountId";
pub const READING_DATE_TIME_COLUMN: &str = "MeterReadingDateTime";
pub const READ_VALUE_COLUMN: &str = "MeterReadValue";

pub const EMPTY_FIELDS_ERROR: &str = "one or more fields are empty";

/// Positions of the required columns in the header, matched case-insensitively.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    account_id: Option<usize>,
    reading_date_time: Option<usize>,
    read_value: Option<usize>
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|header| header.eq_ignore_ascii_case(name));

        Self {
            account_id: position(ACCOUNT_ID_COLUMN),
            reading_date_time: position(READING_DATE_TIME_COLUMN),
            read_value: position(READ_VALUE_COLUMN)
        }
    }

    fn missing_column(&self) -> Option<&'static str> {
        [
            (self.account_id, ACCOUNT_ID_COLUMN),
            (self.reading_date_time, READING_DATE_TIME_COLUMN),
            (self.read_value, READ_VALUE_COLUMN)
        ]
        .into_iter()
        .find_map(|(position, name)| position.is_none().then_some(name))
    }

    fn extract(&self, row_number: usize, record: &StringRecord) -> RowRecord {
        if let Some(name) = self.missing_column() {
            return RowRecord::failed(row_number, format!("Missing field: column '{name}' not found in header"))
        }

        //NOTE: Short rows are allowed, absent trailing fields read as missing rather than as a structural error
        let field = |position: Option<usize>| position.and_then(|index| record.get(index)).map(str::to_string);

        let account_id = field(self.account_id);
        let reading_date_time = field(self.reading_date_time);
        let read_value = field(self.read_value);

        match (account_id, reading_date_time, read_value) {
            (Some(account_id), Some(reading_date_time), Some(read_value))
                if ![&account_id, &reading_date_time, &read_value].iter().any(|text| text.trim().is_empty()) =>
            {
                RowRecord::parsed(row_number, account_id, reading_date_time, read_value)
            }
            (account_id, reading_date_time, read_value) => RowRecord {
                row_number,
                account_id,
                reading_date_time,
                read_value,
                parse_error: Some(EMPTY_FIELDS_ERROR.to_string())
            }
        }
    }
}

/// Lazy, ordered sequence of CSV data rows.
///
/// Parsing runs on a blocking thread and hands rows over a bounded channel, so
/// the consumer suspends on `next` until the next row has been read. The
/// sequence never ends early because of a bad row; only the end of input (or
/// an unreadable stream) finishes it.
pub struct RowReader {
    receiver: mpsc::Receiver<RowRecord>,
    handle: JoinHandle<()>
}

impl RowReader {
    /// Starts reading `input` in the background.
    pub fn spawn<R: Read + Send + 'static>(input: R, backpressure: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<RowRecord>(backpressure.max(1));
        let handle = spawn_blocking(move || read_rows(input, sender));

        Self { receiver, handle }
    }

    /// Waits for the next row; `None` once the input is exhausted.
    pub async fn next(&mut self) -> Option<RowRecord> {
        self.receiver.recv().await
    }

    /// Stops consuming and waits for the background reader to exit.
    pub async fn finish(self) {
        drop(self.receiver);

        if let Err(error) = self.handle.await {
            error!("CSV ingestion failed: {error}");
        }
    }
}

fn read_rows<R: Read>(input: R, sender: mpsc::Sender<RowRecord>) {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let layout = match reader.headers() {
        Ok(headers) if headers.iter().all(|header| header.is_empty()) => {
            debug!("CSV input has no header, no rows to read");
            return;
        }
        Ok(headers) => ColumnLayout::from_headers(headers),
        Err(error) => {
            error!("CSV header could not be read: {error}");
            return;
        }
    };

    // Row 1 is the header.
    for (index, result) in reader.records().enumerate() {
        let row_number = index + 2;

        let row = match result {
            Ok(record) => layout.extract(row_number, &record),
            Err(error) if error.is_io_error() => {
                error!("CSV input stopped at row [{row_number}]: {error}");
                break;
            }
            Err(error) => RowRecord::failed(row_number, format!("CSV parsing error: {error}"))
        };

        if let Some(parse_error) = &row.parse_error {
            warn!("CSV parsing error at data row [{row_number}]: {parse_error}");
        }

        if sender.blocking_send(row).is_err() {
            debug!("Row consumer went away, stopping CSV reader at row [{row_number}]");
            break;
        }
    }
}
