//! Opening server-side sessions and the browser session cookie.

use axum::http::header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT};
use chrono::Utc;
use hermas_core::types::DbId;
use hermas_db::models::session::CreateSession;
use hermas_db::repositories::SessionRepo;
use serde::Serialize;

use crate::auth::jwt::{generate_access_token, generate_refresh_token};
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Name of the HttpOnly cookie carrying the session token.
pub const SESSION_COOKIE: &str = "hermas_session";

/// Successful authentication response returned by every sign-in route.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Session token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
}

/// Persist a session row and mint its tokens.
pub async fn open_session(
    state: &AppState,
    user: UserInfo,
    user_agent: Option<String>,
) -> AppResult<AuthResponse> {
    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let session = SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at,
            user_agent,
        },
    )
    .await?;

    let access_token = generate_access_token(user.id, &user.role, session.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, session_id = session.id, "Session opened");

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user,
    })
}

/// `Set-Cookie` value that stores `token` for the session lifetime.
pub fn session_cookie(config: &ServerConfig, token: &str) -> AppResult<HeaderValue> {
    let max_age = config.jwt.access_token_expiry_mins * 60;
    build_cookie(config, token, max_age)
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(config: &ServerConfig) -> AppResult<HeaderValue> {
    build_cookie(config, "", 0)
}

fn build_cookie(config: &ServerConfig, value: &str, max_age: i64) -> AppResult<HeaderValue> {
    let secure = if config.cookie_secure { "; Secure" } else { "" };
    let cookie =
        format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}");
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::InternalError(format!("Invalid cookie header: {e}")))
}

/// Session token from the `Cookie` header, if present.
pub fn token_from_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; hermas_session=abc.def.ghi; lang=en"),
        );
        assert_eq!(token_from_cookie(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("hermas_session="));
        assert_eq!(token_from_cookie(&headers), None);
        assert_eq!(token_from_cookie(&HeaderMap::new()), None);
    }
}
