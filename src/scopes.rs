//! Scope parsing and normalization.

use std::fmt;

/// OIDC scopes the library requests on the caller's behalf.
pub const RESERVED_SCOPES: [&str; 3] = ["openid", "profile", "offline_access"];

/// Ordered scope set with case-insensitive membership.
///
/// The first spelling of a scope is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet {
    scopes: Vec<String>,
}

impl ScopeSet {
    /// Parse a space-delimited scope string.
    ///
    /// With `filter_reserved`, OIDC reserved scopes and the client id itself
    /// are dropped.
    pub fn parse(raw: &str, client_id: &str, filter_reserved: bool) -> Self {
        let mut set: Self = raw.split_whitespace().collect();
        if filter_reserved {
            for reserved in RESERVED_SCOPES {
                set.remove(reserved);
            }
            if !client_id.is_empty() {
                set.remove(client_id);
            }
        }
        set
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.position(scope).is_some()
    }

    /// Returns `false` if an equal scope (ignoring case) is already present.
    pub fn insert(&mut self, scope: impl Into<String>) -> bool {
        let scope = scope.into();
        let trimmed = scope.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.scopes.push(trimmed.to_string());
        true
    }

    pub fn remove(&mut self, scope: &str) -> bool {
        match self.position(scope) {
            Some(index) => {
                self.scopes.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.scopes.clone()
    }

    fn position(&self, scope: &str) -> Option<usize> {
        let needle = scope.trim().to_lowercase();
        self.scopes.iter().position(|s| s.to_lowercase() == needle)
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::default();
        for scope in iter {
            set.insert(scope);
        }
        set
    }
}

/// Space-joined form used for cache targets.
impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(" "))
    }
}

/// Capability that normalizes granted scope strings.
pub trait ScopeNormalizer: Send + Sync {
    fn normalize(&self, raw: &str, client_id: &str, filter_reserved: bool) -> ScopeSet;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScopeNormalizer;

impl ScopeNormalizer for DefaultScopeNormalizer {
    fn normalize(&self, raw: &str, client_id: &str, filter_reserved: bool) -> ScopeSet {
        ScopeSet::parse(raw, client_id, filter_reserved)
    }
}
