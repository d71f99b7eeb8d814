/// Sheet-by-status count table derived from the combined workbook.
///
/// `statuses` holds the distinct normalized labels in sorted order; each row
/// carries one count per label plus a row total used only for ordering.
#[derive(Debug, Clone)]
pub struct StatusPivot {
    pub statuses: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone)]
pub struct PivotRow {
    pub model: String,
    pub counts: Vec<u64>,
    pub total: u64,
}

impl StatusPivot {
    pub fn max_total(&self) -> u64 {
        self.rows.iter().map(|row| row.total).max().unwrap_or(0)
    }

    /// Row-normalized counts. Zero totals divide by one so empty rows stay zero.
    pub fn proportions(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| {
                let denominator = row.total.max(1) as f64;
                row.counts
                    .iter()
                    .map(|&count| count as f64 / denominator)
                    .collect()
            })
            .collect()
    }

    /// Indexes of the YES and NO columns, in status-column order.
    pub fn yes_no_indices(&self) -> Vec<usize> {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, status)| status.as_str() == "YES" || status.as_str() == "NO")
            .map(|(idx, _)| idx)
            .collect()
    }
}
