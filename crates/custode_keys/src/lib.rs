//! API key lifecycle, sliding-window rate limiting, and bearer tokens.
//!
//! Keys carry an opaque high-entropy secret that is returned exactly once
//! at creation; only its SHA-256 digest is stored. Rate limiting keeps a
//! sliding log of request timestamps per key and rule, so capacity
//! recovers continuously as logged requests age out rather than at fixed
//! window boundaries. Bearer tokens are signed JWTs with a unique `jti`;
//! there is no revocation list for outstanding tokens.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod rate_limit;
mod secret;
mod service;
mod token;

pub use config::KeyServiceConfig;
pub use rate_limit::{Allowance, RateLimiter};
pub use secret::{digest_secret, generate_secret};
pub use service::ApiKeyService;
pub use token::{Claims, TokenService};
