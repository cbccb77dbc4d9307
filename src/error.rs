use thiserror::Error;

#[derive(Error, Debug)]
pub enum KitboardError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown project: {0}")]
    UnknownProject(String),

    #[error("Unknown beneficiary session: {0}")]
    UnknownSession(String),

    #[error("Dataset already imported: {0}")]
    AlreadyImported(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, KitboardError>;
