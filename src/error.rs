use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Workbook error: {0}")]
    Workbook(String),
    #[error("DataFrame error: {0}")]
    DataFrame(String),
    #[error("Chart error: {0}")]
    Chart(String),
    #[error("no vulnerability status column detected in the workbook headers")]
    MissingStatusColumn,
}

impl From<polars::prelude::PolarsError> for AppError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        AppError::DataFrame(err.to_string())
    }
}

impl From<calamine::XlsxError> for AppError {
    fn from(err: calamine::XlsxError) -> Self {
        AppError::Workbook(err.to_string())
    }
}
