//! The wired trust core.

use crate::CustodeConfig;
use custode_audit::{AuditSink, ComplianceReporter, IntegrityChecker, ThreatDetector};
use custode_core::{ApiKey, EventStore, KeyStore, RoleStore};
use custode_error::CustodeResult;
use custode_keys::{Allowance, ApiKeyService, RateLimiter, TokenService};
use custode_rbac::RbacEngine;
use std::sync::Arc;

/// The assembled trust core: every component wired over one shared store.
///
/// Built once at application startup and passed to call sites explicitly.
/// The audit sink is shared with the RBAC engine so role mutations land
/// in the same log the analytics read.
pub struct Custode {
    sink: Arc<AuditSink>,
    rbac: RbacEngine,
    keys: ApiKeyService,
    limiter: RateLimiter,
    tokens: TokenService,
    threats: ThreatDetector,
    integrity: IntegrityChecker,
    compliance: ComplianceReporter,
}

impl Custode {
    /// Wire the core over a store implementing all three storage traits.
    pub fn new<S>(store: Arc<S>, config: &CustodeConfig) -> CustodeResult<Self>
    where
        S: RoleStore + EventStore + KeyStore + 'static,
    {
        let events: Arc<dyn EventStore> = store.clone();
        let sink = Arc::new(AuditSink::new(events.clone(), &config.audit)?);
        let tokens = match &config.token_secret {
            Some(secret) => TokenService::new(secret.as_bytes()),
            None => TokenService::with_random_secret(),
        };
        Ok(Self {
            rbac: RbacEngine::new(store.clone(), sink.clone(), &config.rbac),
            keys: ApiKeyService::new(store, &config.keys),
            limiter: RateLimiter::new(),
            tokens,
            threats: ThreatDetector::new(events.clone(), &config.audit),
            integrity: IntegrityChecker::new(events.clone()),
            compliance: ComplianceReporter::new(events),
            sink,
        })
    }

    /// The RBAC engine.
    pub fn rbac(&self) -> &RbacEngine {
        &self.rbac
    }

    /// The audit sink.
    pub fn audit(&self) -> &AuditSink {
        &self.sink
    }

    /// The API key service.
    pub fn keys(&self) -> &ApiKeyService {
        &self.keys
    }

    /// The rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// The bearer-token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// The batch threat detector.
    pub fn threats(&self) -> &ThreatDetector {
        &self.threats
    }

    /// The log integrity checker.
    pub fn integrity(&self) -> &IntegrityChecker {
        &self.integrity
    }

    /// The compliance reporter.
    pub fn compliance(&self) -> &ComplianceReporter {
        &self.compliance
    }

    /// Resolve a secret and admit or reject the request against the key's
    /// rate-limit rules. Returns the validated key alongside the
    /// allowance so callers can authorize with it.
    pub async fn check_rate_limit(&self, secret: &str) -> CustodeResult<(ApiKey, Allowance)> {
        let key = self.keys.validate_key(secret).await?;
        let allowance = self.limiter.check(&key)?;
        Ok((key, allowance))
    }
}
