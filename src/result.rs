//! The public result of a successful token exchange.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{AccountEntity, CacheRecord};
use crate::claims::IdTokenClaims;
use crate::error::{ResponseError, Result};
use crate::response::ValidatedTokenResponse;
use crate::scopes::ScopeSet;
use crate::util::time::offset_by_seconds;

/// Caller-facing summary of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub home_account_id: String,
    pub environment: String,
    pub tenant_id: String,
    pub username: String,
    pub local_account_id: String,
    pub name: Option<String>,
}

impl From<&AccountEntity> for AccountInfo {
    fn from(account: &AccountEntity) -> Self {
        Self {
            home_account_id: account.home_account_id.clone(),
            environment: account.environment.clone(),
            tenant_id: account.realm.clone(),
            username: account.username.clone(),
            local_account_id: account.local_account_id.clone(),
            name: account.name.clone(),
        }
    }
}

/// Immutable outcome of a token exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticationResult {
    unique_id: String,
    tenant_id: String,
    scopes: Vec<String>,
    account: AccountInfo,
    id_token: String,
    id_token_claims: IdTokenClaims,
    access_token: String,
    token_type: String,
    expires_on: DateTime<Utc>,
    ext_expires_on: DateTime<Utc>,
    family_id: Option<String>,
}

impl AuthenticationResult {
    /// `oid` when present, else `sub`.
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn account(&self) -> &AccountInfo {
        &self.account
    }

    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    pub fn id_token_claims(&self) -> &IdTokenClaims {
        &self.id_token_claims
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn expires_on(&self) -> DateTime<Utc> {
        self.expires_on
    }

    pub fn ext_expires_on(&self) -> DateTime<Utc> {
        self.ext_expires_on
    }

    pub fn family_id(&self) -> Option<&str> {
        self.family_id.as_deref()
    }
}

/// Project a validated response and its cache record into the public result.
pub fn assemble_result(
    validated: &ValidatedTokenResponse,
    claims: &IdTokenClaims,
    record: &CacheRecord,
    scopes: &ScopeSet,
    now: DateTime<Utc>,
) -> Result<AuthenticationResult> {
    let response = validated.response();
    let unique_id = claims
        .unique_id()
        .ok_or_else(|| ResponseError::IdTokenParsing("token carries neither oid nor sub".to_string()))?;
    let expires_on = offset_by_seconds(now, response.expires_in.unwrap_or_default());
    let ext_expires_on = offset_by_seconds(expires_on, response.ext_expires_in.unwrap_or_default());

    Ok(AuthenticationResult {
        unique_id: unique_id.to_string(),
        tenant_id: claims.tenant_id().to_string(),
        scopes: scopes.to_vec(),
        account: AccountInfo::from(&record.account),
        id_token: record.id_token.secret.clone(),
        id_token_claims: claims.clone(),
        access_token: record.access_token.secret.clone(),
        token_type: response
            .token_type
            .clone()
            .unwrap_or_else(|| "Bearer".to_string()),
        expires_on,
        ext_expires_on,
        family_id: response.foci.clone().filter(|foci| !foci.is_empty()),
    })
}
