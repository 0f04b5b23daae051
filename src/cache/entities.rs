//! Entities accepted by a cache store.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::authority::{Authority, AuthorityKind};
use crate::claims::IdTokenClaims;

/// Credential discriminator used in cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum CredentialType {
    IdToken,
    AccessToken,
    RefreshToken,
}

/// Authority-specific part of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AccountAuthority {
    Aad,
    B2c { policy: String },
    Adfs,
}

impl AccountAuthority {
    pub fn kind(&self) -> AuthorityKind {
        match self {
            Self::Aad => AuthorityKind::Aad,
            Self::B2c { .. } => AuthorityKind::B2c,
            Self::Adfs => AuthorityKind::Adfs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntity {
    pub home_account_id: String,
    pub environment: String,
    pub realm: String,
    pub local_account_id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw `client_info` the account was keyed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<String>,
    pub authority: AccountAuthority,
}

impl AccountEntity {
    pub fn aad(
        home_account_id: &str,
        client_info: &str,
        authority: &Authority,
        claims: &IdTokenClaims,
    ) -> Self {
        Self::from_claims(
            home_account_id,
            Some(client_info),
            authority,
            claims,
            AccountAuthority::Aad,
        )
    }

    pub fn b2c(
        home_account_id: &str,
        client_info: &str,
        authority: &Authority,
        claims: &IdTokenClaims,
        policy: impl Into<String>,
    ) -> Self {
        Self::from_claims(
            home_account_id,
            Some(client_info),
            authority,
            claims,
            AccountAuthority::B2c {
                policy: policy.into(),
            },
        )
    }

    /// ADFS accounts are built from claims alone.
    pub fn adfs(home_account_id: &str, authority: &Authority, claims: &IdTokenClaims) -> Self {
        Self::from_claims(home_account_id, None, authority, claims, AccountAuthority::Adfs)
    }

    fn from_claims(
        home_account_id: &str,
        client_info: Option<&str>,
        authority: &Authority,
        claims: &IdTokenClaims,
        account_authority: AccountAuthority,
    ) -> Self {
        Self {
            home_account_id: home_account_id.to_string(),
            environment: authority.host_and_port().to_string(),
            realm: claims.tenant_id().to_string(),
            local_account_id: claims.unique_id().unwrap_or_default().to_string(),
            username: claims.username().unwrap_or_default().to_string(),
            name: claims.name.clone(),
            client_info: client_info.map(str::to_string),
            authority: account_authority,
        }
    }

    pub fn authority_kind(&self) -> AuthorityKind {
        self.authority.kind()
    }

    /// `{home_account_id}-{environment}-{realm}`, lowercased.
    pub fn cache_key(&self) -> String {
        [
            self.home_account_id.as_str(),
            self.environment.as_str(),
            self.realm.as_str(),
        ]
        .join("-")
        .to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenEntity {
    pub home_account_id: String,
    pub environment: String,
    pub credential_type: CredentialType,
    pub client_id: String,
    pub realm: String,
    pub secret: String,
}

impl IdTokenEntity {
    pub fn cache_key(&self) -> String {
        credential_key(
            &self.home_account_id,
            &self.environment,
            self.credential_type,
            &self.client_id,
            &self.realm,
            "",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenEntity {
    pub home_account_id: String,
    pub environment: String,
    pub credential_type: CredentialType,
    pub client_id: String,
    pub realm: String,
    /// Space-joined normalized scopes.
    pub target: String,
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Unix seconds.
    pub cached_at: i64,
    pub expires_on: i64,
    pub extended_expires_on: i64,
    pub expires_in: u64,
    pub ext_expires_in: u64,
}

impl AccessTokenEntity {
    pub fn cache_key(&self) -> String {
        credential_key(
            &self.home_account_id,
            &self.environment,
            self.credential_type,
            &self.client_id,
            &self.realm,
            &self.target,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenEntity {
    pub home_account_id: String,
    pub environment: String,
    pub credential_type: CredentialType,
    pub client_id: String,
    /// Empty when the grant returned no refresh token.
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,
}

impl RefreshTokenEntity {
    /// Family refresh tokens are keyed by family id so sibling clients share them.
    pub fn cache_key(&self) -> String {
        let client_or_family = self.family_id.as_deref().unwrap_or(&self.client_id);
        credential_key(
            &self.home_account_id,
            &self.environment,
            self.credential_type,
            client_or_family,
            "",
            "",
        )
    }
}

fn credential_key(
    home_account_id: &str,
    environment: &str,
    credential_type: CredentialType,
    client_id: &str,
    realm: &str,
    target: &str,
) -> String {
    let credential_type = credential_type.to_string();
    [
        home_account_id,
        environment,
        credential_type.as_str(),
        client_id,
        realm,
        target,
    ]
    .join("-")
    .to_lowercase()
}
