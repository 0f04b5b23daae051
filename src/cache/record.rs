//! Derivation of cache records from a validated token response.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::entities::{
    AccessTokenEntity, AccountEntity, CredentialType, IdTokenEntity, RefreshTokenEntity,
};
use crate::authority::{Authority, AuthorityKind};
use crate::claims::IdTokenClaims;
use crate::error::{ResponseError, Result};
use crate::response::ValidatedTokenResponse;
use crate::scopes::ScopeSet;
use crate::util::time::offset_by_seconds;

/// Placeholder B2C policy when the authority names none.
pub const DEFAULT_B2C_POLICY: &str = "policy";

/// Everything one successful token response contributes to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub account: AccountEntity,
    pub id_token: IdTokenEntity,
    pub access_token: AccessTokenEntity,
    pub refresh_token: RefreshTokenEntity,
}

/// Build the account entity for the authority's kind.
///
/// AAD and B2C accounts are keyed by `client_info` and fail with
/// [`ResponseError::ClientInfoEmpty`] without it.
pub fn build_account_entity(
    validated: &ValidatedTokenResponse,
    claims: &IdTokenClaims,
    authority: &Authority,
) -> Result<AccountEntity> {
    let client_info = validated.response().client_info.as_deref();
    match authority.kind() {
        AuthorityKind::Aad => {
            let (client_info, home_account_id) = require_client_info(validated, client_info)?;
            Ok(AccountEntity::aad(home_account_id, client_info, authority, claims))
        }
        AuthorityKind::B2c => {
            let (client_info, home_account_id) = require_client_info(validated, client_info)?;
            let policy = authority.policy().unwrap_or(DEFAULT_B2C_POLICY);
            Ok(AccountEntity::b2c(
                home_account_id,
                client_info,
                authority,
                claims,
                policy,
            ))
        }
        AuthorityKind::Adfs => {
            let home_account_id = validated
                .home_account_id()
                .or(claims.sub.as_deref())
                .or(claims.unique_id())
                .ok_or_else(|| {
                    ResponseError::IdTokenParsing("ADFS token carries no subject".to_string())
                })?;
            Ok(AccountEntity::adfs(home_account_id, authority, claims))
        }
    }
}

fn require_client_info<'a>(
    validated: &'a ValidatedTokenResponse,
    client_info: Option<&'a str>,
) -> Result<(&'a str, &'a str)> {
    let client_info = client_info
        .filter(|raw| !raw.is_empty())
        .ok_or(ResponseError::ClientInfoEmpty)?;
    let home_account_id = validated
        .home_account_id()
        .ok_or(ResponseError::ClientInfoEmpty)?;
    Ok((client_info, home_account_id))
}

/// Build the account and its three credentials with consistent keys.
///
/// `now` must be the same instant later used for the public result so stored
/// and reported expiries agree.
pub fn build_cache_record(
    validated: &ValidatedTokenResponse,
    claims: &IdTokenClaims,
    authority: &Authority,
    client_id: &str,
    scopes: &ScopeSet,
    now: DateTime<Utc>,
) -> Result<CacheRecord> {
    let account = build_account_entity(validated, claims, authority)?;
    let response = validated.response();
    let home_account_id = account.home_account_id.clone();
    let environment = authority.host_and_port().to_string();
    let realm = claims.tenant_id().to_string();

    let id_token = IdTokenEntity {
        home_account_id: home_account_id.clone(),
        environment: environment.clone(),
        credential_type: CredentialType::IdToken,
        client_id: client_id.to_string(),
        realm: realm.clone(),
        secret: response.id_token.clone().unwrap_or_default(),
    };

    let expires_in = response.expires_in.unwrap_or_default();
    let ext_expires_in = response.ext_expires_in.unwrap_or_default();
    let expires_on = offset_by_seconds(now, expires_in);
    let extended_expires_on = offset_by_seconds(expires_on, ext_expires_in);
    let access_token = AccessTokenEntity {
        home_account_id: home_account_id.clone(),
        environment: environment.clone(),
        credential_type: CredentialType::AccessToken,
        client_id: client_id.to_string(),
        realm,
        target: scopes.to_string(),
        secret: response.access_token.clone().unwrap_or_default(),
        token_type: response.token_type.clone(),
        cached_at: now.timestamp(),
        expires_on: expires_on.timestamp(),
        extended_expires_on: extended_expires_on.timestamp(),
        expires_in,
        ext_expires_in,
    };

    let refresh_token = RefreshTokenEntity {
        home_account_id,
        environment,
        credential_type: CredentialType::RefreshToken,
        client_id: client_id.to_string(),
        secret: response.refresh_token.clone().unwrap_or_default(),
        family_id: response.foci.clone().filter(|foci| !foci.is_empty()),
    };

    debug!(
        account_key = %account.cache_key(),
        authority_kind = %authority.kind(),
        has_refresh_token = !refresh_token.secret.is_empty(),
        "built cache record"
    );

    Ok(CacheRecord {
        account,
        id_token,
        access_token,
        refresh_token,
    })
}
