//! Error classification and recovery.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Csrf,
    InteractionRequired,
    Server,
    ClientInfo,
    IdToken,
    Configuration,
    Cache,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Discard the in-flight request and start a new authorization flow.
    RestartFlow,
    /// Silent acquisition cannot succeed; prompt the user.
    AcquireTokenInteractively,
    CheckConfiguration,
    CheckCacheStorage,
    ContactSupport,
}

/// Error payload reported by an authorization or token endpoint.
///
/// `message` is the human-readable diagnostic. For token endpoint failures it
/// embeds the error codes, timestamp, correlation id and trace id returned by
/// the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerErrorDetails {
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub suberror: Option<String>,
    pub message: String,
}

impl ServerErrorDetails {
    pub fn error_code(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for ServerErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.error.as_deref(), self.suberror.as_deref()) {
            (Some(error), Some(suberror)) if !suberror.is_empty() => {
                write!(f, "{error} ({suberror}): {}", self.message)
            }
            (Some(error), _) => write!(f, "{error}: {}", self.message),
            (None, _) => f.write_str(&self.message),
        }
    }
}
