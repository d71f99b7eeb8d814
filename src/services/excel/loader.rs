use super::types::{SheetData, NORMALIZED_STATUS_COLUMN, SHEET_COLUMN};
use super::utils::normalize_status;
use crate::error::AppError;
use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// Read every sheet of the workbook into one combined dataframe.
///
/// The first row of each sheet is decorative and skipped; the second row is
/// the header. Every row is tagged with its sheet name, and the combined
/// column set is the union of all sheets' columns in first-seen order.
pub fn load_workbook(path: &Path) -> Result<DataFrame, AppError> {
    tracing::info!("Reading workbook from {}", path.display());
    let file_data = Bytes::from(std::fs::read(path)?);
    load_from_bytes(file_data)
}

pub fn load_from_bytes(file_data: Bytes) -> Result<DataFrame, AppError> {
    let cursor = Cursor::new(file_data);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e| AppError::Workbook(format!("Failed to open Excel file: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    tracing::info!("Found {} sheets: {:?}", sheet_names.len(), sheet_names);

    let mut sheets = Vec::new();
    for sheet_name in &sheet_names {
        match workbook.worksheet_range(sheet_name) {
            Ok(range) => match read_sheet(sheet_name, &range) {
                Some(sheet) => {
                    tracing::info!(
                        "Sheet {}: {} rows, {} columns",
                        sheet_name,
                        sheet.rows.len(),
                        sheet.headers.len()
                    );
                    sheets.push(sheet);
                }
                None => tracing::warn!("Sheet {} has no header row, skipping", sheet_name),
            },
            Err(e) => {
                tracing::warn!("Failed to read worksheet {}: {}", sheet_name, e);
            }
        }
    }

    combine(&sheets)
}

/// Extract headers (second row, trimmed) and data rows from one sheet.
/// Columns with blank or duplicate header names are dropped.
fn read_sheet(name: &str, range: &calamine::Range<Data>) -> Option<SheetData> {
    let mut rows_iter = range.rows();
    let _decorative = rows_iter.next()?;
    let header_cells = rows_iter.next()?;

    let mut headers: Vec<String> = Vec::new();
    let mut kept_indexes: Vec<usize> = Vec::new();
    for (idx, cell) in header_cells.iter().enumerate() {
        let header = cell.to_string().trim().to_string();
        if header.is_empty() || headers.contains(&header) {
            continue;
        }
        headers.push(header);
        kept_indexes.push(idx);
    }
    if headers.is_empty() {
        return None;
    }

    let rows = rows_iter
        .map(|row| {
            kept_indexes
                .iter()
                .map(|&idx| cell_to_string(row.get(idx)))
                .collect()
        })
        .collect();

    Some(SheetData {
        name: name.to_string(),
        headers,
        rows,
    })
}

fn cell_to_string(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(value) => value.to_string(),
    }
}

/// Concatenate sheets into one dataframe over the union of their columns.
/// Cells a sheet does not have are empty strings, which the status
/// normalizer later folds into `N/A`.
fn combine(sheets: &[SheetData]) -> Result<DataFrame, AppError> {
    let mut union_order: Vec<String> = Vec::new();
    let mut columns: HashMap<String, Vec<String>> = HashMap::new();
    let mut sheet_tags: Vec<String> = Vec::new();

    for sheet in sheets {
        for header in &sheet.headers {
            if !columns.contains_key(header) {
                columns.insert(header.clone(), vec![String::new(); sheet_tags.len()]);
                union_order.push(header.clone());
            }
        }
        for (name, values) in columns.iter_mut() {
            match sheet.headers.iter().position(|header| header == name) {
                Some(idx) => {
                    for row in &sheet.rows {
                        values.push(row.get(idx).cloned().unwrap_or_default());
                    }
                }
                None => values.extend(std::iter::repeat(String::new()).take(sheet.rows.len())),
            }
        }
        sheet_tags.extend(sheet.rows.iter().map(|_| sheet.name.clone()));
    }

    let mut series = vec![Series::new(SHEET_COLUMN, sheet_tags)];
    for name in &union_order {
        let values = columns.remove(name).unwrap_or_default();
        series.push(Series::new(name, values));
    }
    DataFrame::new(series).map_err(AppError::from)
}

/// Append the normalized status column derived from `status_column`.
/// Cells from sheets without the column are blank and normalize to `N/A`.
pub fn append_normalized_status(
    mut df: DataFrame,
    status_column: &str,
) -> Result<DataFrame, AppError> {
    let normalized: Vec<String> = df
        .column(status_column)?
        .str()?
        .into_iter()
        .map(|value| normalize_status(value.unwrap_or("")))
        .collect();
    df.with_column(Series::new(NORMALIZED_STATUS_COLUMN, normalized))?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, headers: &[&str], rows: &[&[&str]]) -> SheetData {
        SheetData {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn combine_tags_rows_and_unions_columns() {
        let sheets = vec![
            sheet(
                "ModelA",
                &["CVE ID", "Vulnerabilidade?"],
                &[&["CVE-1", "Yes"], &["CVE-2", "no"]],
            ),
            sheet(
                "ModelB",
                &["CVE ID", "Arquivo Afetado", "Vulnerabilidade?"],
                &[&["CVE-3", "src/lib.rs", "SIM"]],
            ),
        ];

        let df = combine(&sheets).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(
            df.get_column_names(),
            vec![SHEET_COLUMN, "CVE ID", "Vulnerabilidade?", "Arquivo Afetado"]
        );

        let tags = df.column(SHEET_COLUMN).unwrap().str().unwrap();
        assert_eq!(tags.get(0), Some("ModelA"));
        assert_eq!(tags.get(2), Some("ModelB"));

        // ModelA has no file column, so those cells are blank
        let files = df.column("Arquivo Afetado").unwrap().str().unwrap();
        assert_eq!(files.get(0), Some(""));
        assert_eq!(files.get(2), Some("src/lib.rs"));
    }

    #[test]
    fn combine_of_no_sheets_yields_empty_frame() {
        let df = combine(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.get_column_names(), vec![SHEET_COLUMN]);
    }

    #[test]
    fn append_normalized_status_covers_blank_cells() {
        let sheets = vec![sheet(
            "ModelA",
            &["Vulnerabilidade?"],
            &[&["Yes"], &["ERROR: timeout"], &[""]],
        )];
        let df = combine(&sheets).unwrap();
        let df = append_normalized_status(df, "Vulnerabilidade?").unwrap();

        let normalized = df.column(NORMALIZED_STATUS_COLUMN).unwrap().str().unwrap();
        assert_eq!(normalized.get(0), Some("YES"));
        assert_eq!(normalized.get(1), Some("ERROR"));
        assert_eq!(normalized.get(2), Some("N/A"));
    }
}
