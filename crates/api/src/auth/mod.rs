//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session token generation, validation, and refresh-token helpers.
//! - [`google`] -- Google ID token verification behind [`google::IdentityVerifier`].
//! - [`session`] -- opening sessions and the session cookie.

pub mod google;
pub mod jwt;
pub mod password;
pub mod session;
