//! Authority URLs and their kind.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::error::{ResponseError, Result};

/// Identity provider flavor behind an authority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AuthorityKind {
    #[default]
    Aad,
    B2c,
    Adfs,
}

/// A parsed authority such as `https://login.microsoftonline.com/common`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    url: Url,
    kind: AuthorityKind,
    host_and_port: String,
    tenant: Option<String>,
    policy: Option<String>,
}

impl Authority {
    /// Parse an authority URL, detecting its kind from the host and path.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = parse_url(raw)?;
        let segments = path_segments(&url);
        let kind = detect_kind(&url, &segments);
        Ok(Self::from_parts(url, kind, &segments))
    }

    /// Parse an authority URL with an explicit kind.
    pub fn with_kind(raw: &str, kind: AuthorityKind) -> Result<Self> {
        let url = parse_url(raw)?;
        let segments = path_segments(&url);
        Ok(Self::from_parts(url, kind, &segments))
    }

    fn from_parts(url: Url, kind: AuthorityKind, segments: &[String]) -> Self {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let host_and_port = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };
        let (tenant, policy) = match kind {
            AuthorityKind::Adfs => (None, None),
            AuthorityKind::Aad => (segments.first().cloned(), None),
            AuthorityKind::B2c => {
                let rest = match segments.first() {
                    Some(first) if first.eq_ignore_ascii_case("tfp") => &segments[1..],
                    _ => segments,
                };
                (rest.first().cloned(), rest.get(1).cloned())
            }
        };
        Self {
            url,
            kind,
            host_and_port,
            tenant,
            policy,
        }
    }

    pub fn kind(&self) -> AuthorityKind {
        self.kind
    }

    /// Cache environment: lowercase host, plus the port when non-default.
    pub fn host_and_port(&self) -> &str {
        &self.host_and_port
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// B2C user-flow policy taken from the path, if any.
    pub fn policy(&self) -> Option<&str> {
        self.policy.as_deref()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ResponseError::InvalidAuthority(format!("{raw}: {e}")))?;
    if url.scheme() != "https" {
        return Err(ResponseError::InvalidAuthority(format!(
            "{raw}: authority must use https"
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ResponseError::InvalidAuthority(format!(
            "{raw}: authority has no host"
        )));
    }
    Ok(url)
}

fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

const B2C_HOST_SUFFIX: &str = "b2clogin.com";

fn detect_kind(url: &Url, segments: &[String]) -> AuthorityKind {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if segments
        .first()
        .is_some_and(|s| s.eq_ignore_ascii_case("adfs"))
    {
        AuthorityKind::Adfs
    } else if host == B2C_HOST_SUFFIX
        || host.ends_with(&format!(".{B2C_HOST_SUFFIX}"))
        || segments.iter().any(|s| s.eq_ignore_ascii_case("tfp"))
    {
        AuthorityKind::B2c
    } else {
        AuthorityKind::Aad
    }
}
