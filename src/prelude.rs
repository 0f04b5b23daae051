//! Convenience re-exports for common use.

pub use crate::authority::{Authority, AuthorityKind};
pub use crate::cache::{CacheRecord, CacheStore, FileCacheStore, InMemoryCacheStore};
pub use crate::claims::{ClaimsParser, IdTokenClaims};
pub use crate::client_info::ClientInfo;
pub use crate::config::HandlerConfig;
pub use crate::crypto::{CryptoProvider, DefaultCrypto};
pub use crate::error::{ResponseError, Result};
pub use crate::handler::ResponseHandler;
pub use crate::response::{AuthorizationCodeResponse, TokenResponse, ValidatedTokenResponse};
pub use crate::result::{AccountInfo, AuthenticationResult};
pub use crate::scopes::{ScopeNormalizer, ScopeSet};
