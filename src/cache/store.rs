use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entities::{AccessTokenEntity, AccountEntity, IdTokenEntity, RefreshTokenEntity};
use super::error::CacheError;
use super::record::CacheRecord;

/// Persistence collaborator for validated cache records.
///
/// Lookup and eviction policy belong to the implementation.
pub trait CacheStore: Send + Sync {
    fn save(&self, record: &CacheRecord) -> Result<(), CacheError>;
}

/// All entities stored for one account, keyed by their cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCache {
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountEntity>,
    #[serde(default)]
    pub id_tokens: BTreeMap<String, IdTokenEntity>,
    #[serde(default)]
    pub access_tokens: BTreeMap<String, AccessTokenEntity>,
    #[serde(default)]
    pub refresh_tokens: BTreeMap<String, RefreshTokenEntity>,
}

impl AccountCache {
    /// Insert a record, replacing entities with the same keys.
    pub fn insert(&mut self, record: &CacheRecord) {
        self.accounts
            .insert(record.account.cache_key(), record.account.clone());
        self.id_tokens
            .insert(record.id_token.cache_key(), record.id_token.clone());
        self.access_tokens
            .insert(record.access_token.cache_key(), record.access_token.clone());
        self.refresh_tokens
            .insert(record.refresh_token.cache_key(), record.refresh_token.clone());
    }
}

/// Process-local cache store.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    contents: RwLock<AccountCache>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything saved so far.
    pub fn snapshot(&self) -> Result<AccountCache, CacheError> {
        self.contents
            .read()
            .map(|contents| contents.clone())
            .map_err(|_| CacheError::Poisoned)
    }

    pub fn account(&self, cache_key: &str) -> Option<AccountEntity> {
        self.contents.read().ok()?.accounts.get(cache_key).cloned()
    }

    pub fn access_token(&self, cache_key: &str) -> Option<AccessTokenEntity> {
        self.contents
            .read()
            .ok()?
            .access_tokens
            .get(cache_key)
            .cloned()
    }

    pub fn refresh_token(&self, cache_key: &str) -> Option<RefreshTokenEntity> {
        self.contents
            .read()
            .ok()?
            .refresh_tokens
            .get(cache_key)
            .cloned()
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        let mut contents = self.contents.write().map_err(|_| CacheError::Poisoned)?;
        *contents = AccountCache::default();
        Ok(())
    }
}

impl CacheStore for InMemoryCacheStore {
    fn save(&self, record: &CacheRecord) -> Result<(), CacheError> {
        self.contents
            .write()
            .map_err(|_| CacheError::Poisoned)?
            .insert(record);
        Ok(())
    }
}

/// Configuration for file-backed cache storage.
#[derive(Debug, Clone)]
pub struct CacheStoreConfig {
    pub base_dir: PathBuf,
}

impl CacheStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_cache_dir()
    }
}

/// File-backed cache store: one TOML file per account and environment.
///
/// Saves through one store (and its clones) are serialized; each file is
/// replaced atomically via a temporary file in the same directory.
///
/// # Example
/// ```no_run
/// use oidc_response::cache::{CacheStoreConfig, FileCacheStore};
///
/// let store = FileCacheStore::new(CacheStoreConfig::new(std::path::PathBuf::from("/tmp/oidc")));
/// let cached = store.load("dTE=.dDE=", "login.microsoftonline.com")?;
/// # Ok::<(), oidc_response::cache::CacheError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    base_dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileCacheStore {
    pub fn new(config: CacheStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
            write_lock: Arc::default(),
        }
    }

    pub fn new_default() -> Self {
        Self::new(CacheStoreConfig::new(default_cache_dir()))
    }

    pub fn load(
        &self,
        home_account_id: &str,
        environment: &str,
    ) -> Result<Option<AccountCache>, CacheError> {
        let path = self.cache_path(home_account_id, environment);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(CacheError::Io(err.to_string())),
        };
        let file: CacheFile = toml::from_str(&raw)?;
        Ok(Some(file.cache))
    }

    pub fn clear(&self, home_account_id: &str, environment: &str) -> Result<(), CacheError> {
        let path = self.cache_path(home_account_id, environment);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CacheError::Io(err.to_string())),
        }
    }

    fn cache_path(&self, home_account_id: &str, environment: &str) -> PathBuf {
        let account = normalize_label(home_account_id);
        let environment = normalize_label(environment);
        self.base_dir.join(format!("{account}.{environment}.toml"))
    }

    fn ensure_parent(path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn write_atomic(path: &Path, contents: &str) -> Result<(), CacheError> {
        let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        if let Err(err) = Self::write_private(&tmp, contents) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        if let Err(err) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    fn write_private(path: &Path, contents: &str) -> Result<(), CacheError> {
        fs::write(path, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl CacheStore for FileCacheStore {
    fn save(&self, record: &CacheRecord) -> Result<(), CacheError> {
        let home_account_id = &record.account.home_account_id;
        let environment = &record.account.environment;
        let _guard = self.write_lock.lock().map_err(|_| CacheError::Poisoned)?;
        let mut cache = self.load(home_account_id, environment)?.unwrap_or_default();
        cache.insert(record);

        let path = self.cache_path(home_account_id, environment);
        Self::ensure_parent(&path)?;
        let file = CacheFile {
            version: 1,
            saved_at: Utc::now(),
            cache,
        };
        let serialized = toml::to_string(&file)?;
        Self::write_atomic(&path, &serialized)?;
        tracing::debug!(path = %path.display(), "persisted cache record");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    saved_at: DateTime<Utc>,
    cache: AccountCache,
}

fn default_cache_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".oidc-response"))
        .unwrap_or_else(|| PathBuf::from(".oidc-response"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '-' || lower == '.' {
            out.push(lower);
        } else {
            out.push('-');
        }
    }
    if out.trim_matches(|c| c == '-' || c == '.').is_empty() {
        "default".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{AccountAuthority, CredentialType};
    use tempfile::TempDir;

    fn record(access: &str) -> CacheRecord {
        let home = "dTE=.dDE=".to_string();
        let env = "login.example.com".to_string();
        CacheRecord {
            account: AccountEntity {
                home_account_id: home.clone(),
                environment: env.clone(),
                realm: "t1".to_string(),
                local_account_id: "o1".to_string(),
                username: "user@example.com".to_string(),
                name: None,
                client_info: Some("blob".to_string()),
                authority: AccountAuthority::Aad,
            },
            id_token: IdTokenEntity {
                home_account_id: home.clone(),
                environment: env.clone(),
                credential_type: CredentialType::IdToken,
                client_id: "client".to_string(),
                realm: "t1".to_string(),
                secret: "id".to_string(),
            },
            access_token: AccessTokenEntity {
                home_account_id: home.clone(),
                environment: env.clone(),
                credential_type: CredentialType::AccessToken,
                client_id: "client".to_string(),
                realm: "t1".to_string(),
                target: "A B".to_string(),
                secret: access.to_string(),
                token_type: Some("Bearer".to_string()),
                cached_at: 1,
                expires_on: 3601,
                extended_expires_on: 3601,
                expires_in: 3600,
                ext_expires_in: 0,
            },
            refresh_token: RefreshTokenEntity {
                home_account_id: home,
                environment: env,
                credential_type: CredentialType::RefreshToken,
                client_id: "client".to_string(),
                secret: "rt".to_string(),
                family_id: Some("1".to_string()),
            },
        }
    }

    #[test]
    fn in_memory_store_replaces_same_key() {
        let store = InMemoryCacheStore::new();
        store.save(&record("first")).unwrap();
        store.save(&record("second")).unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.access_tokens.len(), 1);
        let key = record("x").access_token.cache_key();
        assert_eq!(store.access_token(&key).unwrap().secret, "second");
    }

    #[test]
    fn file_store_round_trip_works() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(CacheStoreConfig::new(dir.path().to_path_buf()));
        let saved = record("at");
        store.save(&saved).unwrap();

        let loaded = store
            .load("dTE=.dDE=", "login.example.com")
            .unwrap()
            .unwrap();
        assert_eq!(
            loaded.accounts.get(&saved.account.cache_key()),
            Some(&saved.account)
        );
        assert_eq!(
            loaded.refresh_tokens.get(&saved.refresh_token.cache_key()),
            Some(&saved.refresh_token)
        );
    }

    #[test]
    fn clear_removes_account_file() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(CacheStoreConfig::new(dir.path().to_path_buf()));
        store.save(&record("at")).unwrap();
        store.clear("dTE=.dDE=", "login.example.com").unwrap();
        assert!(store
            .load("dTE=.dDE=", "login.example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn save_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(CacheStoreConfig::new(dir.path().to_path_buf()));
        store.save(&record("first")).unwrap();
        store.save(&record("second")).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["dte-.dde-.login.example.com.toml".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(CacheStoreConfig::new(dir.path().to_path_buf()));
        store.save(&record("at")).unwrap();
        let path = store.cache_path("dTE=.dDE=", "login.example.com");
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn normalize_label_replaces_unsafe_characters() {
        assert_eq!(normalize_label("dTE=.dDE="), "dte-.dde-");
        assert_eq!(normalize_label("  "), "default");
        assert_eq!(normalize_label("../"), "default");
    }
}
