//! Handler configuration (code > env > defaults).

use std::path::PathBuf;

use bon::Builder;

use crate::authority::{Authority, AuthorityKind};
use crate::cache::CacheStoreConfig;
use crate::error::{ResponseError, Result};

pub const CLIENT_ID_ENV: &str = "OIDC_CLIENT_ID";
pub const AUTHORITY_ENV: &str = "OIDC_AUTHORITY";
pub const AUTHORITY_KIND_ENV: &str = "OIDC_AUTHORITY_KIND";
pub const CACHE_DIR_ENV: &str = "OIDC_CACHE_DIR";

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";

/// Settings needed to build a [`ResponseHandler`](crate::handler::ResponseHandler).
///
/// # Example
/// ```
/// use oidc_response::config::HandlerConfig;
///
/// let config = HandlerConfig::builder()
///     .client_id("my-client")
///     .authority("https://login.microsoftonline.com/contoso.onmicrosoft.com")
///     .build();
/// assert_eq!(config.parse_authority().unwrap().tenant(), Some("contoso.onmicrosoft.com"));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct HandlerConfig {
    #[builder(into)]
    pub client_id: String,
    #[builder(into, default = DEFAULT_AUTHORITY.to_string())]
    pub authority: String,
    /// Overrides kind detection from the authority URL.
    pub authority_kind: Option<AuthorityKind>,
    pub cache_dir: Option<PathBuf>,
}

impl HandlerConfig {
    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let client_id = std::env::var(CLIENT_ID_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ResponseError::Configuration(format!("{CLIENT_ID_ENV} is not set")))?;
        let authority =
            std::env::var(AUTHORITY_ENV).unwrap_or_else(|_| DEFAULT_AUTHORITY.to_string());
        let authority_kind = match std::env::var(AUTHORITY_KIND_ENV) {
            Ok(raw) => Some(raw.trim().parse::<AuthorityKind>().map_err(|_| {
                ResponseError::Configuration(format!(
                    "{AUTHORITY_KIND_ENV} must be one of aad, b2c, adfs (got {raw:?})"
                ))
            })?),
            Err(_) => None,
        };
        let cache_dir = std::env::var_os(CACHE_DIR_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty());

        Ok(Self {
            client_id,
            authority,
            authority_kind,
            cache_dir,
        })
    }

    pub fn parse_authority(&self) -> Result<Authority> {
        match self.authority_kind {
            Some(kind) => Authority::with_kind(&self.authority, kind),
            None => Authority::parse(&self.authority),
        }
    }

    pub fn cache_store_config(&self) -> CacheStoreConfig {
        CacheStoreConfig::new(
            self.cache_dir
                .clone()
                .unwrap_or_else(CacheStoreConfig::default_dir),
        )
    }
}
