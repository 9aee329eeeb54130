mod errors;
mod row_reader;
mod upload_service;

pub use errors::UploadError;
pub use row_reader::RowReader;
pub use upload_service::UploadService;
