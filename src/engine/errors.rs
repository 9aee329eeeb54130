use crate::storage::StorageError;
use thiserror::Error;

/// Outcomes that end an upload without producing a result summary.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Upload of [{file_name}] was canceled")]
    Canceled {
        file_name: String
    },
    #[error("Upload of [{file_name}] could not load an account: {source}")]
    Storage {
        file_name: String,
        #[source]
        source: StorageError
    }
}
