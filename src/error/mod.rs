//! Error types for token response handling.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion, ServerErrorDetails};

use thiserror::Error;

use crate::cache::CacheError;

/// Primary error type for all response handling operations.
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("State mismatch: response state does not match the request state")]
    StateMismatch,

    #[error("Interaction required: {0}")]
    InteractionRequired(ServerErrorDetails),

    #[error("Server error: {0}")]
    Server(ServerErrorDetails),

    #[error("Token response is missing required field: {0}")]
    MissingField(&'static str),

    #[error("Client info decoding error: {0}")]
    ClientInfoDecoding(String),

    #[error("Client info is empty or missing")]
    ClientInfoEmpty,

    #[error("ID token parsing error: {0}")]
    IdTokenParsing(String),

    #[error("Invalid authority: {0}")]
    InvalidAuthority(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl ResponseError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StateMismatch => ErrorCategory::Csrf,
            Self::InteractionRequired(_) => ErrorCategory::InteractionRequired,
            Self::Server(_) | Self::MissingField(_) => ErrorCategory::Server,
            Self::ClientInfoDecoding(_) | Self::ClientInfoEmpty => ErrorCategory::ClientInfo,
            Self::IdTokenParsing(_) => ErrorCategory::IdToken,
            Self::InvalidAuthority(_) | Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Cache(_) => ErrorCategory::Cache,
        }
    }

    /// Whether the caller must fall back to an interactive flow.
    pub fn requires_interaction(&self) -> bool {
        matches!(self, Self::InteractionRequired(_))
    }

    /// Server-reported details, when the endpoint returned an error payload.
    pub fn server_details(&self) -> Option<&ServerErrorDetails> {
        match self {
            Self::InteractionRequired(details) | Self::Server(details) => Some(details),
            _ => None,
        }
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Csrf => RecoverySuggestion::RestartFlow,
            ErrorCategory::InteractionRequired => RecoverySuggestion::AcquireTokenInteractively,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Cache => RecoverySuggestion::CheckCacheStorage,
            ErrorCategory::ClientInfo | ErrorCategory::IdToken | ErrorCategory::Server => {
                RecoverySuggestion::ContactSupport
            }
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ResponseError>;
