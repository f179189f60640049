//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying the account id and username. Nothing is
//! stored server-side: a token is valid if and only if its signature checks
//! out under the configured secret and its expiry is still in the future.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use pinmark_core::{AccountId, Username};

use super::AuthError;
use crate::models::CurrentAccount;

/// Lifetime of a session token.
pub const TOKEN_TTL: Duration = Duration::hours(24);

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: AccountId,
    username: String,
    iat: i64,
    exp: i64,
}

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates session tokens.
///
/// Construct once at startup from the configured secret and share it.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a token service signing with `secret`.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the caller's clock in `validate_at`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
        }
    }

    /// Issue a token for `account`, valid for [`TOKEN_TTL`] from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue(&self, account: &CurrentAccount) -> Result<SessionToken, AuthError> {
        self.issue_at(account, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue_at(
        &self,
        account: &CurrentAccount,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, AuthError> {
        let expires_at = now + TOKEN_TTL;
        let claims = Claims {
            user_id: account.id,
            username: account.username.as_str().to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok(SessionToken {
            token,
            // Round to whole seconds, matching what the token encodes.
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }

    /// Validate a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` for any malformed, forged or
    /// expired token.
    pub fn validate(&self, token: &str) -> Result<CurrentAccount, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// A token is expired from the second its `exp` is reached.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` for any malformed, forged or
    /// expired token.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<CurrentAccount, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                AuthError::Unauthenticated
            })?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            tracing::debug!(account_id = %claims.user_id, "session token expired");
            return Err(AuthError::Unauthenticated);
        }

        let username = Username::parse(&claims.username).map_err(|_| AuthError::Unauthenticated)?;

        Ok(CurrentAccount {
            id: claims.user_id,
            username,
        })
    }
}
