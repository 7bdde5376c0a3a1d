//! PBKDF2-HMAC-SHA256 password hashes.
//!
//! Encoded as `pbkdf2-sha256$<iterations>$<salt>$<hash>` with unpadded
//! standard base64, so the work factor can be raised without invalidating
//! stored hashes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

pub const DEFAULT_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;

const SCHEME: &str = "pbkdf2-sha256";

pub fn hash_password(password: &str) -> String {
    hash_password_with(password, DEFAULT_ITERATIONS)
}

pub fn hash_password_with(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password, &salt, iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    )
}

/// Check `password` against an encoded hash in constant time.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, AuthError> {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(AuthError::PasswordHash("malformed hash".to_string()));
    };

    if scheme != SCHEME {
        return Err(AuthError::PasswordHash(format!("unsupported scheme {scheme}")));
    }
    let iterations: u32 = iterations
        .parse()
        .map_err(|_| AuthError::PasswordHash("bad iteration count".to_string()))?;
    if iterations == 0 {
        return Err(AuthError::PasswordHash("bad iteration count".to_string()));
    }
    let salt = STANDARD_NO_PAD
        .decode(salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    let expected = STANDARD_NO_PAD
        .decode(expected)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

    let actual = derive(password, &salt, iterations);
    Ok(actual.as_slice().ct_eq(expected.as_slice()).into())
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}
