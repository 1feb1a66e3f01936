use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyAssistantError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generation API returned status {status}: {details}")]
    Upstream {
        status: u16,
        details: serde_json::Value,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("Unsupported file '{0}': only PDF documents can be loaded")]
    UnsupportedFile(String),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StudyAssistantError {
    /// HTTP status a failure of this kind is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            StudyAssistantError::InvalidRequest(_) => 400,
            StudyAssistantError::Upstream { status, .. } if (100..=599).contains(status) => {
                *status
            }
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, StudyAssistantError>;
