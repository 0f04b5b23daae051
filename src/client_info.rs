//! Decoding of the `client_info` identity blob.

use serde::{Deserialize, Serialize};

use crate::crypto::CryptoProvider;
use crate::error::{ResponseError, Result};

/// User and tenant identifiers carried by the provider's `client_info` blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub uid: String,
    pub utid: String,
}

impl ClientInfo {
    /// Decode a base64url-encoded JSON `client_info` blob.
    pub fn decode(raw: &str, crypto: &dyn CryptoProvider) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(ResponseError::ClientInfoEmpty);
        }
        let json = crypto
            .base64_decode(raw)
            .map_err(|e| ResponseError::ClientInfoDecoding(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| ResponseError::ClientInfoDecoding(e.to_string()))
    }

    /// Account identity key: `base64(uid) + "." + base64(utid)`.
    ///
    /// `None` when either identifier is empty.
    pub fn home_account_id(&self, crypto: &dyn CryptoProvider) -> Option<String> {
        if self.uid.is_empty() || self.utid.is_empty() {
            return None;
        }
        Some(format!(
            "{}.{}",
            crypto.base64_encode(&self.uid),
            crypto.base64_encode(&self.utid)
        ))
    }
}
