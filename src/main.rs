use anyhow::Result;
use std::time::Instant;

mod config;
mod error;
mod logging;
mod models;
mod services;

use error::AppError;
use services::excel::types::SHEET_COLUMN;
use services::excel::{loader, utils};
use services::{charts, summary};

fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::new()?;

    run(&config)?;

    Ok(())
}

fn run(config: &config::Config) -> Result<(), AppError> {
    let start = Instant::now();

    let df = loader::load_workbook(&config.input_path)?;

    let headers: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|&name| name != SHEET_COLUMN)
        .map(|name| name.to_string())
        .collect();
    let selection = utils::detect_columns(&headers);
    tracing::info!(
        "Detected columns: CVE={:?}, files={:?}, status={:?}",
        selection.cve,
        selection.files,
        selection.status
    );

    let status_column = selection.status.ok_or(AppError::MissingStatusColumn)?;
    let df = loader::append_normalized_status(df, &status_column)?;

    let pivot = summary::summarize(&df)?;
    tracing::info!(
        "Aggregated {} sheets across {} status labels",
        pivot.rows.len(),
        pivot.statuses.len()
    );

    let written = charts::render_all(&pivot, &config.out_dir)?;
    tracing::info!(
        "Wrote {} charts to {} in {:?}",
        written.len(),
        config.out_dir.display(),
        start.elapsed()
    );

    Ok(())
}
