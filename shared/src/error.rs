use thiserror::Error;

/// Startup failures. Any of these means the process must not serve traffic.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY missing")]
    MissingCredential,
    #[error("mapping file '{path}' could not be read: {source}")]
    CatalogUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("mapping file '{path}' is not valid: {reason}")]
    CatalogMalformed { path: String, reason: String },
    #[error("mapping file '{path}' defines no categories")]
    EmptyCatalog { path: String },
    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Structural problems with the text returned by the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("malformed JSON: {0}")]
    Malformed(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
