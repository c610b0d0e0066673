//! Access and refresh token issuance.
//!
//! Both token kinds carry the same claim set, `{ email, exp, iat, jti }`, and are signed with
//! HS256. They use separate secrets, so a token of one kind never validates as the
//! other. Tokens handed to [`TokenIssuer::revoke`] are rejected until the revocation
//! cache forgets them.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::revocation::RevokedTokens;

/// Why a token could not be issued or accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Token has been revoked")]
    Revoked,
    /// The signing keys are unusable; this is a server fault, not a client one.
    #[error("Token signing is misconfigured: {0}")]
    Misconfigured(String),
}

/// Represents the claims encoded within a token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Email of the user the token was issued to.
    pub email: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Unique per issued token, so no two tokens share a revocable string.
    pub jti: String,
}

/// Everything the issuer needs, normally derived from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub revocation_retention: Duration,
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl SigningKey {
    fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        let ttl = chrono::Duration::from_std(ttl)
            .ok()
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| TokenError::Misconfigured("token lifetime out of range".into()))?;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }
}

/// Issues, validates and revokes session tokens.
pub struct TokenIssuer {
    access: SigningKey,
    refresh: SigningKey,
    revoked: RevokedTokens,
    validation: Validation,
}

impl TokenIssuer {
    /// Builds an issuer, rejecting empty or shared secrets and lifetimes too large to
    /// express as an expiry date.
    pub fn new(settings: TokenSettings) -> Result<Self, TokenError> {
        if settings.access_secret.is_empty() || settings.refresh_secret.is_empty() {
            return Err(TokenError::Misconfigured("secrets must not be empty".into()));
        }
        if settings.access_secret == settings.refresh_secret {
            return Err(TokenError::Misconfigured(
                "access and refresh secrets must differ".into(),
            ));
        }

        // Expiry is checked by `check_expiry` so that a zero TTL is already expired.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            access: SigningKey::new(&settings.access_secret, settings.access_ttl)?,
            refresh: SigningKey::new(&settings.refresh_secret, settings.refresh_ttl)?,
            revoked: RevokedTokens::new(settings.revocation_retention),
            validation,
        })
    }

    pub fn issue_access_token(&self, email: &str) -> Result<String, TokenError> {
        Self::issue(&self.access, email)
    }

    pub fn issue_refresh_token(&self, email: &str) -> Result<String, TokenError> {
        Self::issue(&self.refresh, email)
    }

    /// Returns the email bound to a valid access token.
    pub fn validate_access_token(&self, token: &str) -> Result<String, TokenError> {
        self.validate(&self.access, token)
    }

    /// Returns the email bound to a valid refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<String, TokenError> {
        self.validate(&self.refresh, token)
    }

    /// Returns the email an access token was issued to, as long as its signature
    /// holds. Expiry and revocation are not checked; `/refresh` uses this to confirm
    /// the superseded token belongs to the refreshing user.
    pub fn access_token_owner(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.decode_claims(&self.access, token)?.email)
    }

    /// Marks `token` as logged off. Works for either token kind and for tokens that
    /// would not validate anyway.
    pub fn revoke(&self, token: &str) {
        self.revoked.revoke(token);
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.revoked.is_revoked(token)
    }

    fn issue(key: &SigningKey, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(key.ttl)
            .ok_or_else(|| TokenError::Misconfigured("token lifetime out of range".into()))?;
        let claims = Claims {
            email: email.to_owned(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)
            .map_err(|e| TokenError::Misconfigured(format!("failed to sign token: {}", e)))
    }

    fn validate(&self, key: &SigningKey, token: &str) -> Result<String, TokenError> {
        if self.revoked.is_revoked(token) {
            return Err(TokenError::Revoked);
        }

        let claims = self.decode_claims(key, token)?;
        check_expiry(&claims)?;
        Ok(claims.email)
    }

    fn decode_claims(&self, key: &SigningKey, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &key.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}

fn check_expiry(claims: &Claims) -> Result<(), TokenError> {
    if claims.exp <= Utc::now().timestamp() {
        Err(TokenError::Expired)
    } else {
        Ok(())
    }
}
