//! Cache entities, record derivation and persistence.

pub mod entities;
pub mod error;
pub mod record;
pub mod store;

pub use entities::{
    AccessTokenEntity, AccountAuthority, AccountEntity, CredentialType, IdTokenEntity,
    RefreshTokenEntity,
};
pub use error::CacheError;
pub use record::{build_account_entity, build_cache_record, CacheRecord, DEFAULT_B2C_POLICY};
pub use store::{AccountCache, CacheStore, CacheStoreConfig, FileCacheStore, InMemoryCacheStore};
