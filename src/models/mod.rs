mod account;
mod errors;
mod reading;
mod row_record;
mod upload_result;

pub use account::Account;
#[cfg(test)]
pub use account::FAULT_VALUE;
pub use errors::AccountError;
pub use reading::MeterReading;
pub use row_record::RowRecord;
pub use upload_result::UploadResult;
