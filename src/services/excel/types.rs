/// Column tagging each combined row with its source sheet (one sheet per model).
pub const SHEET_COLUMN: &str = "model_sheet";

/// Derived column holding the normalized vulnerability status.
pub const NORMALIZED_STATUS_COLUMN: &str = "status_normalized";

/// One worksheet after header extraction: trimmed header names and string
/// cell values, rows padded to the header width.
#[derive(Debug)]
pub struct SheetData {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Headers picked by keyword detection. Only `status` is required downstream.
#[derive(Debug)]
pub struct ColumnSelection {
    pub cve: Option<String>,
    pub files: Option<String>,
    pub status: Option<String>,
}
