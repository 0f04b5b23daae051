//! Cryptographic capabilities consumed by response handling.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use thiserror::Error;

/// Failures reported by a [`CryptoProvider`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid base64: {0}")]
    InvalidBase64(String),
    #[error("decoded bytes are not UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Capability interface for the encoding primitives the handler needs.
///
/// Injected so callers can substitute platform crypto or deterministic fakes.
pub trait CryptoProvider: Send + Sync {
    /// Standard (padded) base64 of the UTF-8 bytes of `input`.
    fn base64_encode(&self, input: &str) -> String;
    /// Decodes base64 or base64url, padded or not, into a UTF-8 string.
    fn base64_decode(&self, input: &str) -> Result<String, CryptoError>;
}

/// [`CryptoProvider`] backed by the `base64` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCrypto;

impl CryptoProvider for DefaultCrypto {
    fn base64_encode(&self, input: &str) -> String {
        STANDARD.encode(input.as_bytes())
    }

    fn base64_decode(&self, input: &str) -> Result<String, CryptoError> {
        let normalized: String = input
            .trim()
            .trim_end_matches('=')
            .chars()
            .map(|ch| match ch {
                '-' => '+',
                '_' => '/',
                other => other,
            })
            .collect();
        let bytes = STANDARD_NO_PAD
            .decode(normalized.as_bytes())
            .map_err(|e| CryptoError::InvalidBase64(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CryptoError::InvalidUtf8(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uses_padded_standard_alphabet() {
        assert_eq!(DefaultCrypto.base64_encode("u1"), "dTE=");
        assert_eq!(DefaultCrypto.base64_encode("t1"), "dDE=");
    }

    #[test]
    fn decode_accepts_url_safe_unpadded_input() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let raw = URL_SAFE_NO_PAD.encode(r#"{"uid":"a?b>"}"#);
        assert_eq!(
            DefaultCrypto.base64_decode(&raw).unwrap(),
            r#"{"uid":"a?b>"}"#
        );
    }

    #[test]
    fn decode_accepts_padded_standard_input() {
        assert_eq!(DefaultCrypto.base64_decode("dTE=").unwrap(), "u1");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            DefaultCrypto.base64_decode("not base64!"),
            Err(CryptoError::InvalidBase64(_))
        ));
    }

    #[test]
    fn decode_rejects_non_utf8_payload() {
        let raw = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(
            DefaultCrypto.base64_decode(&raw),
            Err(CryptoError::InvalidUtf8(_))
        ));
    }
}
