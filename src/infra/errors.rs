// src/infra/errors.rs — Error types for Bio-Astra

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BioAstraError {
    // Caller errors
    #[error("{0}")]
    Validation(String),

    #[error("{what} not found")]
    NotFound { what: String },

    // Startup-time conditions surfaced per request
    #[error("Configuration error: {0}")]
    Configuration(String),

    // External generation (never retried)
    #[error("Generation via '{provider}' failed: {message}")]
    Generation { provider: String, message: String },

    // Infra
    #[error("Corpus file '{path}' is invalid: {message}")]
    Corpus { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BioAstraError {
    pub fn validation(message: impl Into<String>) -> Self {
        BioAstraError::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        BioAstraError::NotFound { what: what.into() }
    }

    /// Stable tag used at the HTTP boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            BioAstraError::Validation(_) => "validation",
            BioAstraError::NotFound { .. } => "not_found",
            BioAstraError::Configuration(_) => "configuration",
            BioAstraError::Generation { .. } => "generation",
            BioAstraError::Corpus { .. }
            | BioAstraError::Io(_)
            | BioAstraError::Json(_)
            | BioAstraError::Other(_) => "internal",
        }
    }
}
