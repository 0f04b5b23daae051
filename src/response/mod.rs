//! Wire shapes returned by the authorization and token endpoints.

pub mod validation;

pub use validation::{
    is_interaction_required, validate_authorization_code_response, validate_token_response,
    ValidatedTokenResponse, INTERACTION_REQUIRED_ERRORS, INTERACTION_REQUIRED_SUBERRORS,
};

use serde::{Deserialize, Serialize};

/// Redirect parameters delivered to the client by the authorization endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCodeResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub suberror: Option<String>,
    #[serde(default)]
    pub client_info: Option<String>,
}

/// JSON body returned by the token endpoint, success or failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub suberror: Option<String>,
    #[serde(default, deserialize_with = "deserialize_error_codes")]
    pub error_codes: Option<Vec<String>>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub client_info: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub expires_in: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub ext_expires_in: Option<u64>,
    /// Family-of-client-IDs marker.
    #[serde(default)]
    pub foci: Option<String>,
}

pub(crate) fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl AuthorizationCodeResponse {
    pub fn has_error(&self) -> bool {
        is_set(&self.error) || is_set(&self.error_description) || is_set(&self.suberror)
    }
}

impl TokenResponse {
    pub fn has_error(&self) -> bool {
        is_set(&self.error) || is_set(&self.error_description) || is_set(&self.suberror)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

impl NumberOrString {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::String(s) => s,
        }
    }
}

// Some endpoints send numeric codes, others strings.
fn deserialize_error_codes<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let codes = Option::<Vec<NumberOrString>>::deserialize(deserializer)?;
    Ok(codes.map(|codes| codes.into_iter().map(NumberOrString::into_string).collect()))
}

// v1 endpoints send lifetimes as strings.
fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => u64::try_from(n)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("negative lifetime: {n}"))),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid u64 string: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_success_body() {
        let body = r#"{
            "token_type": "Bearer",
            "scope": "User.Read",
            "expires_in": 3599,
            "ext_expires_in": "3599",
            "access_token": "at",
            "refresh_token": "rt",
            "id_token": "a.b.c",
            "client_info": "eyJ1aWQiOiJ1MSIsInV0aWQiOiJ0MSJ9",
            "foci": "1"
        }"#;
        let response: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.expires_in, Some(3599));
        assert_eq!(response.ext_expires_in, Some(3599));
        assert_eq!(response.foci.as_deref(), Some("1"));
        assert!(!response.has_error());
    }

    #[test]
    fn deserializes_error_body_with_numeric_codes() {
        let body = r#"{
            "error": "invalid_grant",
            "error_description": "AADSTS50126: bad credentials",
            "error_codes": [50126, 7000218],
            "timestamp": "2024-01-01 00:00:00Z",
            "trace_id": "trace",
            "correlation_id": "corr"
        }"#;
        let response: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.error_codes,
            Some(vec!["50126".to_string(), "7000218".to_string()])
        );
        assert!(response.has_error());
    }

    #[test]
    fn rejects_negative_lifetime() {
        let err = serde_json::from_str::<TokenResponse>(r#"{"expires_in": -5}"#).unwrap_err();
        assert!(err.to_string().contains("negative lifetime"));
    }

    #[test]
    fn empty_error_fields_are_not_errors() {
        let response = AuthorizationCodeResponse {
            state: Some("s".to_string()),
            error: Some(String::new()),
            ..Default::default()
        };
        assert!(!response.has_error());
    }
}
