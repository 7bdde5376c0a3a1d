use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use prehospital_core::models::user::{CurrentUser, Role};

use crate::csrf;
use crate::error::AuthError;

pub const ISSUER: &str = "prehospital";
pub const MIN_SECRET_LEN: usize = 32;

/// HMAC keys derived from the server's session secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::WeakSecret {
                min: MIN_SECRET_LEN,
            });
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub csrf: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn current_user(&self) -> Result<CurrentUser, AuthError> {
        let id = self
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken(format!("bad subject: {}", self.sub)))?;
        Ok(CurrentUser {
            id,
            username: self.username.clone(),
            role: self.role,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub csrf_token: String,
    pub expires_at: jiff::Timestamp,
}

/// Sign a new session for `user`, valid for `ttl` from `now`.
pub fn issue_session(
    user: &CurrentUser,
    keys: &SessionKeys,
    ttl: jiff::SignedDuration,
    now: jiff::Timestamp,
) -> Result<IssuedSession, AuthError> {
    let expires_at = now + ttl;
    let csrf_token = csrf::generate_token();
    let claims = SessionClaims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role,
        csrf: csrf_token.clone(),
        iss: ISSUER.to_string(),
        iat: now.as_second(),
        exp: expires_at.as_second(),
    };

    let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)?;
    Ok(IssuedSession {
        token,
        csrf_token,
        expires_at,
    })
}

/// Verify a session token's signature and issuer, then check expiry
/// against `now`.
pub fn validate_session(
    token: &str,
    keys: &SessionKeys,
    now: jiff::Timestamp,
) -> Result<SessionClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    // Expiry is checked below against the caller's clock.
    validation.validate_exp = false;

    let claims = decode::<SessionClaims>(token, &keys.decoding, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?
        .claims;

    if claims.exp <= now.as_second() {
        return Err(AuthError::TokenExpired);
    }
    Ok(claims)
}
