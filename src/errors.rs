use crate::validator::ValidationReport;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Schema load error: {0}")]
    SchemaLoad(#[from] SchemaLoadError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    #[error("Field {0} is maintained by the request and cannot be set directly")]
    ManagedField(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A required setup value is absent or unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Both an API key and a client certificate are configured; choose one")]
    ConflictingAuthentication,

    #[error("Failed to read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaLoadError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Rule #{index} has an empty field name")]
    EmptyName { index: usize },

    #[error("Field {field}: mode '{mode}' is not a single character")]
    InvalidMode { field: String, mode: String },

    #[error("Field {field}: invalid pattern: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("Token of length {length} is too short to mask; at least {minimum} characters are required")]
    TokenTooShort { length: usize, minimum: usize },
}
