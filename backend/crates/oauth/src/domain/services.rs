//! Domain Services
//!
//! Pure rules of the flow: PKCE check and bearer header parsing.

use crate::domain::entities::AuthorizationCode;
use platform::crypto::verify_pkce_s256;

/// Whether a code redemption passes PKCE
///
/// The check runs only when the code was issued with a challenge and the
/// client supplied a verifier. The comparison is exact.
pub fn pkce_satisfied(code: &AuthorizationCode, code_verifier: Option<&str>) -> bool {
    match (code.code_challenge.as_deref(), code_verifier) {
        (Some(challenge), Some(verifier)) if !challenge.is_empty() => {
            verify_pkce_s256(verifier, challenge)
        }
        _ => true,
    }
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}
