//! ID token claims and the parser capability that produces them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::crypto::CryptoProvider;
use crate::error::{ResponseError, Result};

/// Decoded ID token payload.
///
/// Claims this crate does not interpret are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    /// B2C trust framework policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tfp: Option<String>,
    /// Legacy B2C policy claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acr: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdTokenClaims {
    /// Subject identifier, preferring `oid` over `sub`.
    pub fn unique_id(&self) -> Option<&str> {
        self.oid.as_deref().or(self.sub.as_deref())
    }

    pub fn tenant_id(&self) -> &str {
        self.tid.as_deref().unwrap_or_default()
    }

    /// `preferred_username`, falling back to the first B2C email.
    pub fn username(&self) -> Option<&str> {
        self.preferred_username
            .as_deref()
            .or_else(|| self.emails.as_ref()?.first().map(String::as_str))
    }
}

/// Capability that turns a raw ID token into claims.
pub trait ClaimsParser: Send + Sync {
    fn parse(&self, raw_id_token: &str, crypto: &dyn CryptoProvider) -> Result<IdTokenClaims>;
}

/// Reads the payload segment of a compact JWS.
///
/// Signatures are not verified here; the token was received directly from the
/// token endpoint over a trusted channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtClaimsParser;

impl ClaimsParser for JwtClaimsParser {
    fn parse(&self, raw_id_token: &str, crypto: &dyn CryptoProvider) -> Result<IdTokenClaims> {
        let mut segments = raw_id_token.trim().split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(ResponseError::IdTokenParsing(
                "expected three dot-separated segments".to_string(),
            ));
        };
        if payload.is_empty() {
            return Err(ResponseError::IdTokenParsing(
                "payload segment is empty".to_string(),
            ));
        }
        let json = crypto
            .base64_decode(payload)
            .map_err(|e| ResponseError::IdTokenParsing(e.to_string()))?;
        let claims: IdTokenClaims =
            serde_json::from_str(&json).map_err(|e| ResponseError::IdTokenParsing(e.to_string()))?;
        if claims.unique_id().is_none() {
            return Err(ResponseError::IdTokenParsing(
                "token carries neither oid nor sub".to_string(),
            ));
        }
        Ok(claims)
    }
}
