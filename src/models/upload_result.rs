use serde::Serialize;

/// Summary of one upload; the only artifact handed back to the caller.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub saved_readings: usize,
    pub failed_readings: usize,
    /// One entry per failed row, in row order, plus at most one batch-level error.
    pub errors: Vec<String>,
    pub file_name: String
}

impl UploadResult {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }
}
