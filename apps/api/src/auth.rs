//! JWT authentication module.
//!
//! Handles session tokens, password hashing and the request extractors
//! that turn a bearer token into a [`Session`] / [`StoreContext`].
//!
//! ```text
//! login ──► token { sub: user }                  ──► CurrentUser
//!                │
//!          switch-store (membership checked)
//!                ▼
//!           token { sub: user, store_id }        ──► CurrentStore
//!                                                    (membership re-checked)
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use adega_core::{CoreError, Session, StoreContext};

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (profile id)
    pub sub: String,

    /// Selected store; absent until `switch-store`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl Claims {
    pub fn session(&self) -> Session {
        Session::new(self.sub.clone(), self.store_id.clone())
    }
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Issues a session token, with or without a selected store.
    pub fn issue(&self, user_id: &str, store_id: Option<&str>) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            store_id: store_id.map(str::to_string),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {e}")))
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::invalid_token("Session expired"),
                _ => ApiError::invalid_token("Invalid token"),
            })
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Password hashing failed: {e}")))
}

/// `false` for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Authenticated user, store not required.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

/// Authenticated user acting inside a store they belong to.
#[derive(Debug, Clone)]
pub struct CurrentStore(pub StoreContext);

fn session_from_parts(parts: &Parts, state: &AppState) -> Result<Session, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::from(CoreError::NotAuthenticated))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| ApiError::invalid_token("Invalid authorization header"))?;

    let claims = state.jwt.validate(token).inspect_err(|e| {
        warn!(uri = %parts.uri, reason = %e.message, "Rejected bearer token");
    })?;

    Ok(claims.session())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = CurrentUser(session_from_parts(parts, state)?);
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

impl FromRequestParts<AppState> for CurrentStore {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(session) = CurrentUser::from_request_parts(parts, state).await?;
        let ctx = session.store_context()?;

        // Membership may have been revoked after the token was issued.
        if state
            .db
            .stores()
            .membership(&ctx.store_id, &ctx.user_id)
            .await?
            .is_none()
        {
            return Err(CoreError::StoreAccessDenied {
                store_id: ctx.store_id,
            }
            .into());
        }

        Ok(CurrentStore(ctx))
    }
}
