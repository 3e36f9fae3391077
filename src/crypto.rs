//! Cryptographic utilities for webhook signatures
//!
//! Deliveries are signed with HMAC-SHA256 over the exact request body, keyed
//! with the endpoint's webhook secret, and sent hex encoded in the
//! `X-Signature` header.

/// Signature utilities
pub mod signature {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use subtle::ConstantTimeEq;

    type HmacSha256 = Hmac<Sha256>;

    /// Length of an HMAC-SHA256 digest in bytes
    pub const DIGEST_LEN: usize = 32;

    fn digest(payload: &[u8], secret: &str) -> Option<[u8; DIGEST_LEN]> {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(payload);
        Some(mac.finalize().into_bytes().into())
    }

    /// Compute the hex-encoded signature the gateway would send for `payload`
    pub fn compute_signature(payload: &[u8], secret: &str) -> String {
        digest(payload, secret).map(hex::encode).unwrap_or_default()
    }

    /// Verify a webhook signature header against the raw payload
    ///
    /// `payload` must be the body bytes exactly as received. Returns `false`
    /// for an absent, empty, non-hex, wrong-length or mismatching header.
    pub fn verify_signature(payload: &[u8], signature: Option<&str>, secret: &str) -> bool {
        let Some(signature) = signature.map(str::trim).filter(|s| !s.is_empty()) else {
            return false;
        };

        let provided = match hex::decode(signature) {
            Ok(bytes) if bytes.len() == DIGEST_LEN => bytes,
            _ => return false,
        };

        let Some(expected) = digest(payload, secret) else {
            return false;
        };

        expected[..].ct_eq(&provided[..]).into()
    }
}

pub use signature::{compute_signature, verify_signature};
