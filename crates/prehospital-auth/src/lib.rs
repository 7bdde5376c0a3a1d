//! prehospital-auth
//!
//! Session collaborator for the intake API: password hashing, login lockout,
//! signed session tokens, CSRF tokens, and ownership checks.

pub mod authorize;
pub mod csrf;
pub mod error;
pub mod lockout;
pub mod password;
pub mod session;
