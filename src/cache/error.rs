use thiserror::Error;

/// Failures reported by a [`CacheStore`](super::CacheStore).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Cache lock poisoned")]
    Poisoned,
    #[error("Cache rejected record: {0}")]
    Rejected(String),
}

impl From<std::io::Error> for CacheError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for CacheError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for CacheError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
