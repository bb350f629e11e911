//! API key lifecycle and validation.

use crate::{KeyServiceConfig, digest_secret, generate_secret};
use chrono::{DateTime, Utc};
use custode_core::{ApiKey, KeyStore, KeyType, Permission};
use custode_error::{CustodeResult, KeyError, KeyErrorKind};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct CachedKey {
    key: ApiKey,
    expires_at: Instant,
}

/// API key lifecycle: creation, validation, revocation.
///
/// Successful validations are cached by secret digest with a TTL bounded
/// by the key's own remaining lifetime, so a cached entry can never
/// outlive the key it proves. Revocation removes the cache entry
/// synchronously.
pub struct ApiKeyService {
    store: Arc<dyn KeyStore>,
    cache: DashMap<String, CachedKey>,
    cache_ttl: Duration,
}

impl ApiKeyService {
    /// Create a service over the given key store.
    pub fn new(store: Arc<dyn KeyStore>, config: &KeyServiceConfig) -> Self {
        Self {
            store,
            cache: DashMap::new(),
            cache_ttl: Duration::from_secs(config.validation_cache_ttl_secs),
        }
    }

    /// Create a key and return it with its plaintext secret.
    ///
    /// The secret is shown exactly once here and is not retrievable
    /// afterwards; only its digest is stored. The key's rate-limit rules
    /// default from its type.
    #[instrument(skip(self, permissions))]
    pub async fn create_key(
        &self,
        name: &str,
        key_type: KeyType,
        owner_user_id: Option<u64>,
        owner_tenant_id: Option<u64>,
        permissions: HashSet<Permission>,
        expires_at: Option<DateTime<Utc>>,
    ) -> CustodeResult<(ApiKey, String)> {
        let secret = generate_secret();
        let key = ApiKey::new(
            name,
            key_type,
            digest_secret(&secret),
            owner_user_id,
            owner_tenant_id,
            permissions,
            expires_at,
        );
        self.store.insert_key(key.clone()).await?;
        debug!(key_id = %key.id, %key_type, "API key created");
        Ok((key, secret))
    }

    /// Resolve a plaintext secret to its key.
    ///
    /// Rejects with `Invalid` when the secret is unknown or the key is
    /// revoked, and with `Expired` when its lifetime has elapsed. A
    /// successful validation records usage on the key; an accounting
    /// write failure is logged and does not fail the validation.
    #[instrument(skip(self, secret))]
    pub async fn validate_key(&self, secret: &str) -> CustodeResult<ApiKey> {
        let digest = digest_secret(secret);
        let now = Utc::now();

        if let Some(mut entry) = self.cache.get_mut(&digest) {
            if entry.expires_at > Instant::now() {
                entry.key.record_use(now);
                let key = entry.key.clone();
                drop(entry);
                self.record_usage(key.id, now).await;
                debug!(key_id = %key.id, "API key validated from cache");
                return Ok(key);
            }
            drop(entry);
            self.cache.remove(&digest);
        }

        let mut key = self.store.key_by_digest(&digest).await?.ok_or_else(|| {
            KeyError::new(KeyErrorKind::Invalid("unrecognized secret".to_string()))
        })?;
        if !key.is_active {
            return Err(KeyError::new(KeyErrorKind::Invalid(format!(
                "key '{}' is revoked",
                key.id
            )))
            .into());
        }
        if key.is_expired(now) {
            return Err(KeyError::new(KeyErrorKind::Expired(format!("key '{}'", key.id))).into());
        }

        key.record_use(now);
        self.record_usage(key.id, now).await;

        if let Some(ttl) = self.entry_ttl(&key, now) {
            self.cache.insert(
                digest,
                CachedKey {
                    key: key.clone(),
                    expires_at: Instant::now() + ttl,
                },
            );
        }
        debug!(key_id = %key.id, "API key validated");
        Ok(key)
    }

    /// Soft-revoke a key and drop its cached validation.
    #[instrument(skip(self))]
    pub async fn revoke_key(&self, key_id: Uuid) -> CustodeResult<()> {
        let mut key = self.store.key(key_id).await?.ok_or_else(|| {
            KeyError::new(KeyErrorKind::KeyNotFound {
                key_id: key_id.to_string(),
            })
        })?;
        key.revoke();
        self.store.update_key(key.clone()).await?;
        self.cache.remove(&key.secret_digest);
        debug!(%key_id, "API key revoked");
        Ok(())
    }

    /// Fetch a key by id for management operations.
    pub async fn key(&self, key_id: Uuid) -> CustodeResult<Option<ApiKey>> {
        Ok(self.store.key(key_id).await?)
    }

    /// Cache TTL bounded by the key's remaining lifetime. `None` when the
    /// key expires before any entry would be useful.
    fn entry_ttl(&self, key: &ApiKey, now: DateTime<Utc>) -> Option<Duration> {
        match key.expires_at {
            None => Some(self.cache_ttl),
            Some(expiry) => {
                let remaining = (expiry - now).to_std().ok()?;
                Some(self.cache_ttl.min(remaining))
            }
        }
    }

    /// Usage accounting goes through the store's narrow counter update,
    /// never a full-row write, so a write that lands after a concurrent
    /// revocation cannot reactivate the key.
    async fn record_usage(&self, key_id: Uuid, used_at: DateTime<Utc>) {
        if let Err(e) = self.store.record_key_usage(key_id, used_at).await {
            warn!(%key_id, error = %e, "Usage accounting write failed");
        }
    }
}
