//! Signed session tokens.
//!
//! A session token is an HS256 JWT carrying the identity id, the role and
//! the issue/expiry timestamps. Nothing is stored server-side: a token is
//! valid exactly when its signature checks out under the current key and
//! its expiry lies in the future. There is no revocation before expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SessionConfig;
use crate::db::Role;

/// Default session lifetime (24 hours).
pub const DEFAULT_SESSION_LIFETIME_SECS: u64 = 24 * 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Token-related errors.
///
/// Validation never produces an error; only key setup and signing can fail.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The signing secret is empty.
    #[error("session signing secret is not configured")]
    MissingSecret,

    /// Signing the claims failed.
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity id.
    pub sub: String,
    /// Role at the time of issuance.
    pub role: Role,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expires-at (unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    /// Identity id of the session holder.
    pub fn identity_id(&self) -> &str {
        &self.sub
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl SessionKeys {
    /// Build keys from a secret and a lifetime in seconds.
    pub fn new(secret: &str, lifetime_secs: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        // Expiry is checked in `validate_at` against an explicit clock.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        let lifetime_secs = i64::try_from(lifetime_secs).unwrap_or(i64::MAX);
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: Duration::try_seconds(lifetime_secs).unwrap_or(Duration::MAX),
        })
    }

    /// Build keys from the session configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self, TokenError> {
        Self::new(&config.secret, config.lifetime_secs)
    }

    /// Issue a token for an identity, valid from now for the configured lifetime.
    pub fn issue(&self, identity_id: &str, role: Role) -> Result<String, TokenError> {
        self.issue_at(identity_id, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        identity_id: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.issue_claims_at(identity_id, role, now)
            .map(|(token, _)| token)
    }

    /// Issue a token as if the current time were `now`, returning the signed
    /// claims alongside it.
    pub fn issue_claims_at(
        &self,
        identity_id: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<(String, SessionClaims), TokenError> {
        let iat = now.timestamp();
        let claims = SessionClaims {
            sub: identity_id.to_string(),
            role,
            iat,
            exp: iat.saturating_add(self.lifetime.num_seconds()),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign session token: {}", e);
            TokenError::Signing(e.to_string())
        })?;
        Ok((token, claims))
    }

    /// Validate a token against the current time.
    pub fn validate(&self, token: &str) -> Option<SessionClaims> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// Returns `None` for an empty, malformed, forged, wrongly-signed or
    /// expired token. The reason is only logged at debug level.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Option<SessionClaims> {
        if token.is_empty() {
            return None;
        }

        let claims = match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                return None;
            }
        };

        if now.timestamp() >= claims.exp {
            tracing::debug!(sub = %claims.sub, "Session token expired");
            return None;
        }

        Some(claims)
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
