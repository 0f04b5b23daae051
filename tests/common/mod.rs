//! Shared test helpers and fake collaborators.

#![allow(dead_code)]

use std::sync::Mutex;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use oidc_response::cache::{CacheError, CacheRecord, CacheStore};
use oidc_response::response::TokenResponse;

pub const CLIENT_ID: &str = "client-1";

/// base64url `client_info` blob for the given identifiers.
pub fn client_info(uid: &str, utid: &str) -> String {
    URL_SAFE_NO_PAD.encode(format!(r#"{{"uid":"{uid}","utid":"{utid}"}}"#))
}

/// Unsigned compact JWT carrying `claims` as its payload.
pub fn id_token(claims: &serde_json::Value) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

/// Successful token response for scenario-style tests.
pub fn token_response(client_info: Option<String>, claims: &serde_json::Value) -> TokenResponse {
    TokenResponse {
        token_type: Some("Bearer".to_string()),
        client_info,
        id_token: Some(id_token(claims)),
        access_token: Some("access-token".to_string()),
        refresh_token: Some("refresh-token".to_string()),
        scope: Some("A B".to_string()),
        expires_in: Some(3600),
        ext_expires_in: Some(0),
        ..Default::default()
    }
}

/// Records every saved cache record.
#[derive(Default)]
pub struct RecordingStore {
    pub saved: Mutex<Vec<CacheRecord>>,
}

impl RecordingStore {
    pub fn records(&self) -> Vec<CacheRecord> {
        self.saved.lock().unwrap().clone()
    }
}

impl CacheStore for RecordingStore {
    fn save(&self, record: &CacheRecord) -> Result<(), CacheError> {
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Rejects every write.
pub struct FailingStore;

impl CacheStore for FailingStore {
    fn save(&self, _record: &CacheRecord) -> Result<(), CacheError> {
        Err(CacheError::Rejected("disk full".to_string()))
    }
}
