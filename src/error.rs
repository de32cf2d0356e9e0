use thiserror::Error;

/// Errors surfaced by the authenticator, the grid, the encoders and the warehouse writer.
#[derive(Debug, Error)]
pub enum AppError {
    /// Role, username and password did not match any credential entry
    #[error("Invalid username or password for selected role.")]
    InvalidCredentials,

    /// A required setting is absent; nothing is attempted
    #[error("{0}")]
    ConfigurationMissing(String),

    /// A setting is present but unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Connection, schema or query failure against the warehouse
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// Grid or filter input rejected before it reaches the session table
    #[error("{0}")]
    Validation(String),

    /// Spreadsheet or delimited-text encoding failed
    #[error("Export failed: {0}")]
    Export(String),
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Export(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Export(e.to_string())
    }
}
