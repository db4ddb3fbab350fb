//! Google ID token verification.
//!
//! [`IdentityVerifier`] is the seam the sign-in handler talks to. The real
//! implementation, [`GoogleVerifier`], fetches Google's published RS256 keys
//! and checks signature, audience, issuer and expiry. Tests swap in a stub.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::GoogleConfig;

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// How long fetched signing keys are reused before refreshing.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// The facts about a signed-in Google account that sign-in depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub sub: String,
    /// Lower-cased address.
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Google sign-in is not configured")]
    NotConfigured,
    #[error("Invalid Google credential: {0}")]
    InvalidToken(String),
    #[error("Google account email is not verified")]
    EmailNotVerified,
    #[error("Could not fetch Google signing keys: {0}")]
    KeyFetch(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<GoogleIdentity, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
}

/// Verifies ID tokens against Google's JWKS endpoint.
pub struct GoogleVerifier {
    config: GoogleConfig,
    http: reqwest::Client,
    keys: RwLock<Option<(Instant, JwkSet)>>,
}

impl GoogleVerifier {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            keys: RwLock::new(None),
        }
    }

    async fn fetch_keys(&self) -> Result<JwkSet, IdentityError> {
        let set = self
            .http
            .get(&self.config.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?
            .json::<JwkSet>()
            .await
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?;
        tracing::debug!(keys = set.keys.len(), "Fetched Google signing keys");
        Ok(set)
    }

    /// Cached key set; refetched when stale or when `kid` is unknown.
    async fn key_set(&self, kid: &str) -> Result<JwkSet, IdentityError> {
        {
            let cached = self.keys.read().await;
            if let Some((fetched_at, set)) = cached.as_ref() {
                if fetched_at.elapsed() < JWKS_CACHE_TTL && set.find(kid).is_some() {
                    return Ok(set.clone());
                }
            }
        }
        let set = self.fetch_keys().await?;
        *self.keys.write().await = Some((Instant::now(), set.clone()));
        Ok(set)
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, credential: &str) -> Result<GoogleIdentity, IdentityError> {
        if !self.config.enabled() {
            return Err(IdentityError::NotConfigured);
        }

        let header =
            decode_header(credential).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("missing key id".into()))?;

        let set = self.key_set(&kid).await?;
        let jwk = set
            .find(&kid)
            .ok_or_else(|| IdentityError::InvalidToken("unknown key id".into()))?;
        let key =
            DecodingKey::from_jwk(jwk).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.config.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let claims = decode::<GoogleClaims>(credential, &key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?
            .claims;

        identity_from_claims(claims)
    }
}

fn identity_from_claims(claims: GoogleClaims) -> Result<GoogleIdentity, IdentityError> {
    let email = claims
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| IdentityError::InvalidToken("missing email".into()))?;
    if !claims.email_verified {
        return Err(IdentityError::EmailNotVerified);
    }
    Ok(GoogleIdentity {
        sub: claims.sub,
        email,
        name: claims.name,
    })
}
