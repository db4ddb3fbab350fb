//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the signed-in user, their role and the admin
//!   role's broadcast scopes, from a Bearer token or the session cookie.
//! - [`auth::MaybeAuthUser`] -- the same, but optional (used by pages).
//! - [`rbac::RequireAdmin`] -- requires the built-in admin role.
//! - [`rbac::RequireManageUsers`] and friends -- require one permission flag.

pub mod auth;
pub mod rbac;
