//! Error types for Holo

use thiserror::Error;

/// Problems that block a submission and are shown inline next to the
/// offending control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select at least one structure file")]
    NoFileSelected,

    #[error("Only {accepted} files are accepted")]
    WrongFileType { accepted: String },

    #[error("Pack name cannot contain '/': {0}")]
    InvalidPackName(String),
}

impl ValidationError {
    /// Translation key of the inline message for this error
    pub fn translation_key(&self) -> &'static str {
        match self {
            ValidationError::NoFileSelected => "upload.error.no_file_selected",
            ValidationError::WrongFileType { .. } => "upload.error.wrong_file_type",
            ValidationError::InvalidPackName(_) => "metadata.pack_name.error",
        }
    }
}

/// The main error type for Holo operations
#[derive(Debug, Error)]
pub enum HoloError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Archive format error: {0}")]
    ArchiveFormatError(String),

    #[error("Pack format error: {0}")]
    PackFormatError(String),

    #[error("Resource pack error: {0}")]
    ResourcePackError(String),

    #[error("{0}")]
    UserInput(String),

    #[error("Generation error: {0}")]
    GenerationError(String),

    #[error("A generation is already in progress")]
    SubmissionInFlight,
}

impl HoloError {
    /// Whether this error was caused by what the user supplied rather than
    /// by a fault in the tool. User-facing errors are reported without a
    /// bug-report link.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, HoloError::UserInput(_) | HoloError::Validation(_))
    }
}

/// Result type alias for Holo operations
pub type Result<T> = std::result::Result<T, HoloError>;

impl From<toml::de::Error> for HoloError {
    fn from(err: toml::de::Error) -> Self {
        HoloError::TomlParseError(err.to_string())
    }
}

impl From<serde_json::Error> for HoloError {
    fn from(err: serde_json::Error) -> Self {
        HoloError::JsonError(err.to_string())
    }
}
