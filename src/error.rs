use thiserror::Error;

/// Errors raised while building or rendering a DTR
#[derive(Debug, Error)]
pub enum DtrError {
    #[error("invalid month {month} for year {year}")]
    InvalidMonth { month: u32, year: i32 },

    #[error("invalid office schedule: {0}")]
    InvalidSchedule(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("HTML generation failed: {0}")]
    Template(#[from] askama::Error),

    #[error("spreadsheet generation failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DtrError {
    /// Whether the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DtrError::InvalidMonth { .. }
                | DtrError::InvalidSchedule(_)
                | DtrError::InvalidRequest(_)
                | DtrError::Json(_)
        )
    }
}

impl From<lopdf::Error> for DtrError {
    fn from(err: lopdf::Error) -> Self {
        DtrError::Pdf(err.to_string())
    }
}

pub type DtrResult<T> = Result<T, DtrError>;
