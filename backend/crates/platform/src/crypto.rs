//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode bytes as unpadded base64url (RFC 4648 §5)
pub fn to_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// PKCE `S256` challenge for a verifier: `base64url(SHA-256(verifier))`
/// without padding (RFC 7636 §4.2)
pub fn pkce_s256_challenge(code_verifier: &str) -> String {
    to_base64url(&sha256(code_verifier.as_bytes()))
}

/// Check a PKCE verifier against a stored `S256` challenge
///
/// Matching is exact: no case folding, no prefix match.
pub fn verify_pkce_s256(code_verifier: &str, code_challenge: &str) -> bool {
    let computed = pkce_s256_challenge(code_verifier);
    constant_time_eq(computed.as_bytes(), code_challenge.as_bytes())
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
