//! Orchestration of validation, cache derivation and result assembly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::authority::Authority;
use crate::cache::{build_cache_record, CacheStore, FileCacheStore};
use crate::claims::{ClaimsParser, JwtClaimsParser};
use crate::config::HandlerConfig;
use crate::crypto::{CryptoProvider, DefaultCrypto};
use crate::error::{ResponseError, Result};
use crate::response::{
    validate_authorization_code_response, validate_token_response, AuthorizationCodeResponse,
    TokenResponse, ValidatedTokenResponse,
};
use crate::result::{assemble_result, AuthenticationResult};
use crate::scopes::{DefaultScopeNormalizer, ScopeNormalizer};

/// Entry point for processing authorization and token endpoint responses.
///
/// Holds no per-response state, so one handler can serve concurrent flows.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use oidc_response::authority::Authority;
/// use oidc_response::cache::InMemoryCacheStore;
/// use oidc_response::handler::ResponseHandler;
/// use oidc_response::response::TokenResponse;
///
/// # fn example(body: &str) -> oidc_response::error::Result<()> {
/// let handler = ResponseHandler::new("my-client", Arc::new(InMemoryCacheStore::new()));
/// let authority = Authority::parse("https://login.microsoftonline.com/common")?;
/// let response: TokenResponse = serde_json::from_str(body).expect("token body");
/// let result = handler.handle_token_response(response, &authority)?;
/// println!("signed in as {}", result.unique_id());
/// # Ok(())
/// # }
/// ```
pub struct ResponseHandler {
    client_id: String,
    crypto: Arc<dyn CryptoProvider>,
    claims_parser: Arc<dyn ClaimsParser>,
    scope_normalizer: Arc<dyn ScopeNormalizer>,
    cache: Arc<dyn CacheStore>,
}

impl ResponseHandler {
    pub fn new(client_id: impl Into<String>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            client_id: client_id.into(),
            crypto: Arc::new(DefaultCrypto),
            claims_parser: Arc::new(JwtClaimsParser),
            scope_normalizer: Arc::new(DefaultScopeNormalizer),
            cache,
        }
    }

    /// Handler with default collaborators and a file cache at the configured dir.
    pub fn from_config(config: &HandlerConfig) -> Self {
        let store = FileCacheStore::new(config.cache_store_config());
        Self::new(config.client_id.clone(), Arc::new(store))
    }

    pub fn with_crypto(mut self, crypto: Arc<dyn CryptoProvider>) -> Self {
        self.crypto = crypto;
        self
    }

    pub fn with_claims_parser(mut self, claims_parser: Arc<dyn ClaimsParser>) -> Self {
        self.claims_parser = claims_parser;
        self
    }

    pub fn with_scope_normalizer(mut self, scope_normalizer: Arc<dyn ScopeNormalizer>) -> Self {
        self.scope_normalizer = scope_normalizer;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn validate_authorization_code_response(
        &self,
        response: &AuthorizationCodeResponse,
        expected_state: &str,
    ) -> Result<()> {
        validate_authorization_code_response(response, expected_state, self.crypto.as_ref())
    }

    pub fn validate_token_response(&self, response: TokenResponse) -> Result<ValidatedTokenResponse> {
        validate_token_response(response, self.crypto.as_ref())
    }

    /// Parse claims, build and persist the cache record, then assemble the result.
    ///
    /// Nothing is written to the cache unless the record and the result were both built.
    pub fn generate_authentication_result(
        &self,
        validated: &ValidatedTokenResponse,
        authority: &Authority,
    ) -> Result<AuthenticationResult> {
        self.generate_authentication_result_at(validated, authority, Utc::now())
    }

    /// Same as [`generate_authentication_result`](Self::generate_authentication_result)
    /// with an explicit clock reading.
    pub fn generate_authentication_result_at(
        &self,
        validated: &ValidatedTokenResponse,
        authority: &Authority,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult> {
        let response = validated.response();
        let raw_id_token = response
            .id_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ResponseError::MissingField("id_token"))?;
        if response.access_token.as_deref().map_or(true, str::is_empty) {
            return Err(ResponseError::MissingField("access_token"));
        }

        let claims = self.claims_parser.parse(raw_id_token, self.crypto.as_ref())?;
        let scopes = self.scope_normalizer.normalize(
            response.scope.as_deref().unwrap_or_default(),
            &self.client_id,
            true,
        );
        let record = build_cache_record(
            validated,
            &claims,
            authority,
            &self.client_id,
            &scopes,
            now,
        )?;
        let result = assemble_result(validated, &claims, &record, &scopes, now)?;
        self.cache.save(&record)?;
        debug!(
            authority = %authority,
            scopes = %scopes,
            "saved cache record for token response"
        );

        Ok(result)
    }

    /// Validate a token response and, if it succeeds, generate its result.
    pub fn handle_token_response(
        &self,
        response: TokenResponse,
        authority: &Authority,
    ) -> Result<AuthenticationResult> {
        let validated = self.validate_token_response(response)?;
        self.generate_authentication_result(&validated, authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheStore;

    #[test]
    fn missing_id_token_is_rejected_before_caching() {
        let store = Arc::new(InMemoryCacheStore::new());
        let handler = ResponseHandler::new("client", store.clone());
        let authority = Authority::parse("https://login.microsoftonline.com/common").unwrap();
        let response = TokenResponse {
            access_token: Some("at".to_string()),
            ..Default::default()
        };
        let err = handler.handle_token_response(response, &authority).unwrap_err();
        assert!(matches!(err, ResponseError::MissingField("id_token")));
        assert!(store.snapshot().unwrap().accounts.is_empty());
    }

    #[test]
    fn missing_access_token_is_rejected() {
        let handler = ResponseHandler::new("client", Arc::new(InMemoryCacheStore::new()));
        let authority = Authority::parse("https://login.microsoftonline.com/common").unwrap();
        let response = TokenResponse {
            id_token: Some("a.b.c".to_string()),
            ..Default::default()
        };
        let err = handler.handle_token_response(response, &authority).unwrap_err();
        assert!(matches!(err, ResponseError::MissingField("access_token")));
    }
}
