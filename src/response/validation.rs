//! CSRF and server-error validation of endpoint responses.

use tracing::{debug, warn};

use super::{is_set, AuthorizationCodeResponse, TokenResponse};
use crate::client_info::ClientInfo;
use crate::crypto::CryptoProvider;
use crate::error::{ResponseError, Result, ServerErrorDetails};

/// Error codes that can only be resolved by user interaction.
pub const INTERACTION_REQUIRED_ERRORS: [&str; 3] =
    ["interaction_required", "consent_required", "login_required"];

/// Sub-errors that can only be resolved by user interaction.
pub const INTERACTION_REQUIRED_SUBERRORS: [&str; 6] = [
    "message_only",
    "additional_action",
    "basic_action",
    "user_password_expired",
    "consent_required",
    "bad_token",
];

/// A token response that passed validation, with its decoded identity.
///
/// Only produced by [`validate_token_response`]; record building and result
/// assembly take it by reference so the identity key always belongs to the
/// response it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTokenResponse {
    response: TokenResponse,
    client_info: Option<ClientInfo>,
    home_account_id: Option<String>,
}

impl ValidatedTokenResponse {
    pub fn response(&self) -> &TokenResponse {
        &self.response
    }

    pub fn client_info(&self) -> Option<&ClientInfo> {
        self.client_info.as_ref()
    }

    /// Account identity key, when `client_info` carried both identifiers.
    pub fn home_account_id(&self) -> Option<&str> {
        self.home_account_id.as_deref()
    }

    pub fn into_response(self) -> TokenResponse {
        self.response
    }
}

/// Whether a reported error demands an interactive flow.
///
/// Matches the error code, the sub-error, or an interaction-required code
/// embedded in the description.
pub fn is_interaction_required(
    error: Option<&str>,
    error_description: Option<&str>,
    suberror: Option<&str>,
) -> bool {
    let by_code = error.is_some_and(|code| INTERACTION_REQUIRED_ERRORS.contains(&code));
    let by_suberror =
        suberror.is_some_and(|sub| INTERACTION_REQUIRED_SUBERRORS.contains(&sub));
    let by_description = error_description.is_some_and(|desc| {
        INTERACTION_REQUIRED_ERRORS
            .iter()
            .any(|code| desc.contains(code))
    });
    by_code || by_suberror || by_description
}

/// Validate the redirect from the authorization endpoint.
///
/// The state check runs before anything else.
pub fn validate_authorization_code_response(
    response: &AuthorizationCodeResponse,
    expected_state: &str,
    crypto: &dyn CryptoProvider,
) -> Result<()> {
    if response.state.as_deref() != Some(expected_state) {
        warn!("authorization response state does not match request state");
        return Err(ResponseError::StateMismatch);
    }

    if response.has_error() {
        let details = ServerErrorDetails {
            error: response.error.clone(),
            error_description: response.error_description.clone(),
            suberror: response.suberror.clone(),
            message: response.error_description.clone().unwrap_or_default(),
        };
        return Err(classify(details));
    }

    if let Some(raw) = response.client_info.as_deref().filter(|raw| !raw.is_empty()) {
        ClientInfo::decode(raw, crypto)?;
    }

    debug!("authorization code response validated");
    Ok(())
}

/// Validate a token endpoint response and derive its account identity key.
pub fn validate_token_response(
    response: TokenResponse,
    crypto: &dyn CryptoProvider,
) -> Result<ValidatedTokenResponse> {
    if response.has_error() {
        let details = ServerErrorDetails {
            error: response.error.clone(),
            error_description: response.error_description.clone(),
            suberror: response.suberror.clone(),
            message: format_server_error_message(&response),
        };
        return Err(classify(details));
    }

    let client_info = match response.client_info.as_deref() {
        Some(raw) if is_set(&response.client_info) => Some(ClientInfo::decode(raw, crypto)?),
        _ => None,
    };
    let home_account_id = client_info
        .as_ref()
        .and_then(|info| info.home_account_id(crypto));

    debug!(
        has_client_info = client_info.is_some(),
        has_home_account_id = home_account_id.is_some(),
        "token response validated"
    );

    Ok(ValidatedTokenResponse {
        response,
        client_info,
        home_account_id,
    })
}

fn classify(details: ServerErrorDetails) -> ResponseError {
    if is_interaction_required(
        details.error.as_deref(),
        details.error_description.as_deref(),
        details.suberror.as_deref(),
    ) {
        warn!(
            error = details.error_code(),
            suberror = details.suberror.as_deref().unwrap_or_default(),
            "server requires user interaction"
        );
        ResponseError::InteractionRequired(details)
    } else {
        warn!(error = details.error_code(), "server returned an error");
        ResponseError::Server(details)
    }
}

fn format_server_error_message(response: &TokenResponse) -> String {
    let codes = response
        .error_codes
        .as_ref()
        .map(|codes| codes.join(","))
        .unwrap_or_default();
    format!(
        "{codes} - [{}]: {} - Correlation ID: {} - Trace ID: {}",
        response.timestamp.as_deref().unwrap_or_default(),
        response.error_description.as_deref().unwrap_or_default(),
        response.correlation_id.as_deref().unwrap_or_default(),
        response.trace_id.as_deref().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCrypto;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn auth_response(state: &str) -> AuthorizationCodeResponse {
        AuthorizationCodeResponse {
            code: Some("code".to_string()),
            state: Some(state.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn state_mismatch_precedes_error_checks() {
        let response = AuthorizationCodeResponse {
            error: Some("interaction_required".to_string()),
            ..auth_response("other")
        };
        let err = validate_authorization_code_response(&response, "expected", &DefaultCrypto)
            .unwrap_err();
        assert!(matches!(err, ResponseError::StateMismatch));
    }

    #[test]
    fn missing_state_is_a_mismatch() {
        let response = AuthorizationCodeResponse::default();
        let err =
            validate_authorization_code_response(&response, "expected", &DefaultCrypto).unwrap_err();
        assert!(matches!(err, ResponseError::StateMismatch));
    }

    #[test]
    fn authorization_error_is_classified() {
        let response = AuthorizationCodeResponse {
            error: Some("login_required".to_string()),
            error_description: Some("user must sign in".to_string()),
            ..auth_response("s")
        };
        let err = validate_authorization_code_response(&response, "s", &DefaultCrypto).unwrap_err();
        let ResponseError::InteractionRequired(details) = err else {
            panic!("expected interaction required, got {err:?}");
        };
        assert_eq!(details.message, "user must sign in");

        let response = AuthorizationCodeResponse {
            error: Some("access_denied".to_string()),
            ..auth_response("s")
        };
        let err = validate_authorization_code_response(&response, "s", &DefaultCrypto).unwrap_err();
        assert!(matches!(err, ResponseError::Server(_)));
    }

    #[test]
    fn malformed_client_info_is_rejected_early() {
        let response = AuthorizationCodeResponse {
            client_info: Some(URL_SAFE_NO_PAD.encode("{}")),
            ..auth_response("s")
        };
        let err = validate_authorization_code_response(&response, "s", &DefaultCrypto).unwrap_err();
        assert!(matches!(err, ResponseError::ClientInfoDecoding(_)));
    }

    #[test]
    fn valid_authorization_response_passes() {
        let response = AuthorizationCodeResponse {
            client_info: Some(URL_SAFE_NO_PAD.encode(r#"{"uid":"u","utid":"t"}"#)),
            ..auth_response("s")
        };
        validate_authorization_code_response(&response, "s", &DefaultCrypto).unwrap();
    }

    #[test]
    fn empty_client_info_on_redirect_is_ignored() {
        let mut response = auth_response("s");
        response.client_info = Some(String::new());
        assert!(validate_authorization_code_response(&response, "s", &DefaultCrypto).is_ok());
    }

    #[test]
    fn suberror_alone_triggers_interaction_required() {
        assert!(is_interaction_required(None, None, Some("basic_action")));
        assert!(is_interaction_required(
            Some("invalid_grant"),
            Some("AADSTS65001: consent_required for app"),
            None
        ));
        assert!(!is_interaction_required(Some("invalid_grant"), Some("expired"), None));
    }

    #[test]
    fn token_error_message_carries_diagnostics() {
        let response = TokenResponse {
            error: Some("invalid_grant".to_string()),
            error_description: Some("AADSTS70000: bad grant".to_string()),
            error_codes: Some(vec!["70000".to_string(), "70001".to_string()]),
            timestamp: Some("2024-05-01 10:00:00Z".to_string()),
            correlation_id: Some("corr-1".to_string()),
            trace_id: Some("trace-1".to_string()),
            ..Default::default()
        };
        let err = validate_token_response(response, &DefaultCrypto).unwrap_err();
        let ResponseError::Server(details) = err else {
            panic!("expected server error, got {err:?}");
        };
        assert_eq!(
            details.message,
            "70000,70001 - [2024-05-01 10:00:00Z]: AADSTS70000: bad grant - Correlation ID: corr-1 - Trace ID: trace-1"
        );
    }

    #[test]
    fn token_response_without_client_info_has_no_key() {
        let response = TokenResponse {
            access_token: Some("at".to_string()),
            ..Default::default()
        };
        let validated = validate_token_response(response, &DefaultCrypto).unwrap();
        assert_eq!(validated.home_account_id(), None);
        assert!(validated.client_info().is_none());
    }

    #[test]
    fn token_response_derives_home_account_id() {
        let response = TokenResponse {
            client_info: Some(URL_SAFE_NO_PAD.encode(r#"{"uid":"u1","utid":"t1"}"#)),
            ..Default::default()
        };
        let validated = validate_token_response(response, &DefaultCrypto).unwrap();
        assert_eq!(validated.home_account_id(), Some("dTE=.dDE="));
    }
}
