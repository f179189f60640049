//! Authentication service.
//!
//! Password registration gated by an invite code, password login, and
//! validation of the signed session tokens issued at login.

mod error;
mod token;

pub use error::AuthError;
pub use token::{SessionToken, TOKEN_TTL, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;
use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use subtle::ConstantTimeEq;

use pinmark_core::Username;

use crate::db::RepositoryError;
use crate::db::accounts::AccountRepository;
use crate::models::{Account, CurrentAccount};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: SessionToken,
    pub account: CurrentAccount,
}

/// Authentication service.
///
/// Handles registration, login and token validation.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
    tokens: &'a TokenService,
    registration_code: &'a SecretString,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        pool: &'a SqlitePool,
        tokens: &'a TokenService,
        registration_code: &'a SecretString,
    ) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            tokens,
            registration_code,
        }
    }

    /// Register a new account.
    ///
    /// No session is issued; the client logs in afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if any input is empty.
    /// Returns `AuthError::InvalidCode` if the code does not match.
    /// Returns `AuthError::InvalidUsername` if the username is malformed.
    /// Returns `AuthError::DuplicateUsername` if the username is taken.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        verification_code: &str,
    ) -> Result<Account, AuthError> {
        require("username", username)?;
        require("password", password)?;
        require("verification_code", verification_code)?;

        if !code_matches(verification_code, self.registration_code) {
            tracing::warn!(username, "registration rejected: invalid verification code");
            return Err(AuthError::InvalidCode);
        }

        self.create_account(username, password).await
    }

    /// Create an account without checking the registration code.
    ///
    /// Used by `register` after the code check and by operator tooling.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username is malformed.
    /// Returns `AuthError::DuplicateUsername` if the username is taken.
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, AuthError> {
        let username = Username::parse(username)?;
        require("password", password)?;

        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .create(&username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateUsername,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(account_id = %account.id, username = %account.username, "account created");
        Ok(account)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if either input is empty.
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSession, AuthError> {
        require("username", username)?;
        require("password", password)?;

        // A name that could never have been registered is just an unknown user.
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let (account, password_hash) = self
            .accounts
            .get_password_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let current = CurrentAccount::from(&account);
        let token = self.tokens.issue(&current)?;

        tracing::info!(account_id = %account.id, "login succeeded");
        Ok(LoginSession {
            token,
            account: current,
        })
    }

    /// Validate a session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if the token is malformed,
    /// forged or expired.
    pub fn validate(&self, token: &str) -> Result<CurrentAccount, AuthError> {
        self.tokens.validate(token)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), AuthError> {
    if value.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(())
}

/// Constant-time comparison of a submitted registration code.
fn code_matches(submitted: &str, expected: &SecretString) -> bool {
    submitted
        .as_bytes()
        .ct_eq(expected.expose_secret().as_bytes())
        .into()
}

/// Hash a password using Argon2id into a PHC string.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    const CODE: &str = "let-me-in";

    fn secrets() -> (TokenService, SecretString) {
        let tokens = TokenService::new(&SecretString::from(
            "k3y-Material-For-Tests-0123456789abcdef".to_owned(),
        ));
        (tokens, SecretString::from(CODE.to_owned()))
    }

    #[tokio::test]
    async fn test_register_then_login_round_trips_account() {
        let pool = create_memory_pool().await.unwrap();
        let (tokens, code) = secrets();
        let auth = AuthService::new(&pool, &tokens, &code);

        let account = auth.register("alice", "s3cret", CODE).await.unwrap();
        let session = auth.login("alice", "s3cret").await.unwrap();

        assert_eq!(session.account.id, account.id);
        let validated = auth.validate(&session.token.token).unwrap();
        assert_eq!(validated.id, account.id);
        assert_eq!(validated.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_wrong_code_rejected() {
        let pool = create_memory_pool().await.unwrap();
        let (tokens, code) = secrets();
        let auth = AuthService::new(&pool, &tokens, &code);

        let err = auth.register("alice", "s3cret", "guess").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
        assert!(matches!(
            auth.login("alice", "s3cret").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_code_matches() {
        let expected = SecretString::from(CODE.to_owned());

        assert!(code_matches(CODE, &expected));
        assert!(!code_matches("let-me-i", &expected));
        assert!(!code_matches("let-me-in!", &expected));
        assert!(!code_matches("LET-ME-IN", &expected));
        assert!(!code_matches("", &expected));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let pool = create_memory_pool().await.unwrap();
        let (tokens, code) = secrets();
        let auth = AuthService::new(&pool, &tokens, &code);

        auth.register("alice", "one", CODE).await.unwrap();
        let err = auth.register("alice", "two", CODE).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let pool = create_memory_pool().await.unwrap();
        let (tokens, code) = secrets();
        let auth = AuthService::new(&pool, &tokens, &code);

        assert!(matches!(
            auth.register("", "pw", CODE).await.unwrap_err(),
            AuthError::MissingField("username")
        ));
        assert!(matches!(
            auth.register("bob", "", CODE).await.unwrap_err(),
            AuthError::MissingField("password")
        ));
        assert!(matches!(
            auth.register("bob", "pw", "").await.unwrap_err(),
            AuthError::MissingField("verification_code")
        ));
        assert!(matches!(
            auth.login("bob", "").await.unwrap_err(),
            AuthError::MissingField("password")
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let pool = create_memory_pool().await.unwrap();
        let (tokens, code) = secrets();
        let auth = AuthService::new(&pool, &tokens, &code);

        auth.register("alice", "s3cret", CODE).await.unwrap();

        let wrong_password = auth.login("alice", "nope").await.unwrap_err();
        let unknown_user = auth.login("mallory", "s3cret").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_create_account_skips_code() {
        let pool = create_memory_pool().await.unwrap();
        let (tokens, code) = secrets();
        let auth = AuthService::new(&pool, &tokens, &code);

        auth.create_account("operator", "pw").await.unwrap();
        assert!(auth.login("operator", "pw").await.is_ok());
    }

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(verify_password("battery staple", &hash).is_err());
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
