//! Account rules: invitations and the accounts that can never be removed.

use crate::error::CoreError;

/// Usernames of the bootstrap administrator, compared case-insensitively.
pub const PROTECTED_USERNAMES: &[&str] = &["admin", "adminthegreat"];

/// Whether an account is the bootstrap admin or the configured superuser.
pub fn is_protected_user(username: &str, email: Option<&str>, superuser_email: &str) -> bool {
    let username_protected = PROTECTED_USERNAMES.contains(&username.to_lowercase().as_str());
    let superuser = superuser_email.trim().to_lowercase();
    let email_protected = !superuser.is_empty()
        && email.is_some_and(|e| e.trim().to_lowercase() == superuser);
    username_protected || email_protected
}

/// Lower-case an invitation address and check it belongs to the allowed domain.
pub fn normalize_invite_email(email: &str, allowed_domain: &str) -> Result<String, CoreError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(CoreError::Validation("Email is required".to_string()));
    }
    let suffix = format!("@{}", allowed_domain.trim().to_lowercase());
    if !email.ends_with(&suffix) || email.len() == suffix.len() {
        return Err(CoreError::Validation(format!(
            "Only {allowed_domain} addresses may be invited"
        )));
    }
    Ok(email)
}

/// Display name for an invited user: the given name, or the address local part.
pub fn invite_display_name(name: Option<&str>, email: &str) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n.to_string(),
        None => email.split('@').next().unwrap_or(email).to_string(),
    }
}
