//! Short-lived HS256 assertions that identify the installed app to Jira.
//!
//! A token is minted per request from the app's shared secret. It carries the
//! `iss`, `sub` and `aud` claims configured for the installation and expires
//! one hour after it was issued.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Lifetime of a minted assertion, in seconds.
pub const ASSERTION_TTL_SECS: i64 = 60 * 60;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Shared secret must not be empty")]
    EmptySecret,

    #[error("Missing required claim: {0}")]
    MissingClaim(&'static str),

    #[error("Failed to sign assertion: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Assertion rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by every app assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Everything needed to act as the installed application.
#[derive(Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub issuer: String,
    pub subject: String,
    pub audience: String,
    shared_secret: String,
}

// Keeps the secret out of logs and panic messages.
impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("issuer", &self.issuer)
            .field("subject", &self.subject)
            .field("audience", &self.audience)
            .field("shared_secret", &"<redacted>")
            .finish()
    }
}

impl AppCredentials {
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        audience: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let credentials = Self {
            issuer: issuer.into(),
            subject: subject.into(),
            audience: audience.into(),
            shared_secret: shared_secret.into(),
        };

        if credentials.shared_secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        for (name, value) in [
            ("iss", &credentials.issuer),
            ("sub", &credentials.subject),
            ("aud", &credentials.audience),
        ] {
            if value.trim().is_empty() {
                return Err(AuthError::MissingClaim(name));
            }
        }

        Ok(credentials)
    }

    /// Mint an assertion issued now.
    pub fn mint(&self) -> Result<String, AuthError> {
        self.mint_at(Utc::now().timestamp())
    }

    /// Mint an assertion with an explicit `iat` (seconds since the epoch).
    pub fn mint_at(&self, issued_at: i64) -> Result<String, AuthError> {
        let claims = self.claims_at(issued_at);
        debug!(iss = %claims.iss, aud = %claims.aud, exp = claims.exp, "Minting app assertion");

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.shared_secret.as_bytes()),
        )
        .map_err(AuthError::Signing)
    }

    pub fn claims_at(&self, issued_at: i64) -> Claims {
        Claims {
            iss: self.issuer.clone(),
            sub: self.subject.clone(),
            aud: self.audience.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_TTL_SECS,
        }
    }

    /// Check signature, expiry, issuer and audience of a token minted with
    /// these credentials.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.sub = Some(self.subject.clone());
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub", "aud"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.shared_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(AuthError::Rejected)
    }
}
