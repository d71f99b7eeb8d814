use crate::error::AppError;
use crate::models::{PivotRow, StatusPivot};
use crate::services::excel::types::{NORMALIZED_STATUS_COLUMN, SHEET_COLUMN};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

const COUNT_COLUMN: &str = "count";

/// Group the combined table by (sheet, normalized status) and pivot the
/// counts into sheet rows over sorted status columns. Rows are ordered by
/// total descending, ties broken by sheet name.
pub fn summarize(df: &DataFrame) -> Result<StatusPivot, AppError> {
    let grouped = df
        .clone()
        .lazy()
        .group_by([col(SHEET_COLUMN), col(NORMALIZED_STATUS_COLUMN)])
        .agg([len().cast(DataType::UInt32).alias(COUNT_COLUMN)])
        .collect()?;

    let model_col = grouped.column(SHEET_COLUMN)?.str()?;
    let status_col = grouped.column(NORMALIZED_STATUS_COLUMN)?.str()?;
    let count_col = grouped.column(COUNT_COLUMN)?.u32()?;

    let mut status_set: BTreeSet<String> = BTreeSet::new();
    let mut per_model: HashMap<String, HashMap<String, u64>> = HashMap::new();
    for idx in 0..grouped.height() {
        let (Some(model), Some(status), Some(n)) =
            (model_col.get(idx), status_col.get(idx), count_col.get(idx))
        else {
            continue;
        };
        status_set.insert(status.to_string());
        *per_model
            .entry(model.to_string())
            .or_default()
            .entry(status.to_string())
            .or_insert(0) += u64::from(n);
    }

    let statuses: Vec<String> = status_set.into_iter().collect();
    let mut rows: Vec<PivotRow> = per_model
        .into_iter()
        .map(|(model, by_status)| {
            let counts: Vec<u64> = statuses
                .iter()
                .map(|status| by_status.get(status).copied().unwrap_or(0))
                .collect();
            let total = counts.iter().sum();
            PivotRow {
                model,
                counts,
                total,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.model.cmp(&b.model)));

    Ok(StatusPivot { statuses, rows })
}
