//! CSRF tokens bound to a session.
//!
//! The token is minted at login, carried inside the signed session claims,
//! and must be echoed in the `X-CSRF-Token` header of every mutating request.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

pub const HEADER: &str = "x-csrf-token";
const TOKEN_BYTES: usize = 32;

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn verify(expected: &str, presented: Option<&str>) -> Result<(), AuthError> {
    let presented = presented.ok_or(AuthError::CsrfMismatch)?;
    if expected.is_empty() {
        return Err(AuthError::CsrfMismatch);
    }
    if bool::from(expected.as_bytes().ct_eq(presented.as_bytes())) {
        Ok(())
    } else {
        Err(AuthError::CsrfMismatch)
    }
}
