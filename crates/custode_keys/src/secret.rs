//! Opaque secret generation and digesting.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Generate an opaque API key secret: 256 bits from the OS entropy source,
/// URL-safe base64 without padding.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hex digest of a secret. The digest is the stored lookup
/// identifier; the plaintext secret is never persisted.
pub fn digest_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_carries_enough_entropy() {
        let secret = generate_secret();
        // 32 bytes -> 43 base64 characters without padding.
        assert_eq!(secret.len(), 43);
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let digest = digest_secret("some-secret");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, digest_secret("some-secret"));
        assert_ne!(digest, digest_secret("other-secret"));
    }
}
