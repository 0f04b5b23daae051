//! OIDC token response handling.
//!
//! Validates responses from an identity provider's authorization and token
//! endpoints, classifies server errors, derives the cache entities for a
//! successful exchange and assembles the caller-facing result.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use oidc_response::prelude::*;
//!
//! # fn example(body: &str, state: &str) -> oidc_response::error::Result<()> {
//! let handler = ResponseHandler::new("my-client", Arc::new(InMemoryCacheStore::new()));
//! let authority = Authority::parse("https://login.microsoftonline.com/common")?;
//!
//! let redirect = AuthorizationCodeResponse {
//!     state: Some(state.to_string()),
//!     code: Some("code".to_string()),
//!     ..Default::default()
//! };
//! handler.validate_authorization_code_response(&redirect, state)?;
//!
//! let response: TokenResponse = serde_json::from_str(body).expect("token body");
//! let validated = handler.validate_token_response(response)?;
//! let result = handler.generate_authentication_result(&validated, &authority)?;
//! println!("{} expires at {}", result.unique_id(), result.expires_on());
//! # Ok(())
//! # }
//! ```

pub mod authority;
pub mod cache;
pub mod claims;
pub mod client_info;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handler;
pub mod prelude;
pub mod response;
pub mod result;
pub mod scopes;
pub mod util;
