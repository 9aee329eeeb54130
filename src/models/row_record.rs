/// One CSV data row as raw text, before any typing or validation.
///
/// `row_number` is 1-based over the whole file, so the first data row is 2.
/// A row carrying a `parse_error` never reaches validation; whatever text was
/// recovered alongside it is kept for error reporting only.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RowRecord {
    pub row_number: usize,
    pub account_id: Option<String>,
    pub reading_date_time: Option<String>,
    pub read_value: Option<String>,
    pub parse_error: Option<String>
}

impl RowRecord {
    pub fn parsed(row_number: usize, account_id: String, reading_date_time: String, read_value: String) -> Self {
        Self {
            row_number,
            account_id: Some(account_id),
            reading_date_time: Some(reading_date_time),
            read_value: Some(read_value),
            parse_error: None
        }
    }

    pub fn failed(row_number: usize, parse_error: impl Into<String>) -> Self {
        Self {
            row_number,
            account_id: None,
            reading_date_time: None,
            read_value: None,
            parse_error: Some(parse_error.into())
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.parse_error.is_none()
    }

    /// Uniform prefix used for every error reported against this row.
    pub fn error_prefix(&self) -> String {
        format!(
            "Row {} (AccId: {}, ReadDate: {}, ReadVal: {}):",
            self.row_number,
            self.account_id.as_deref().unwrap_or("NULL"),
            self.reading_date_time.as_deref().unwrap_or("NULL"),
            self.read_value.as_deref().unwrap_or("NULL")
        )
    }
}
