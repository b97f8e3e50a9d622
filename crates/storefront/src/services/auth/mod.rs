//! Authentication service.
//!
//! Password signup and login against the user store.
//!
//! New hashes are Argon2id PHC strings. Accounts carried over from the old
//! store hold base64 of a 16-byte salt followed by a PBKDF2-HMAC-SHA256
//! digest; they still verify and are rehashed on their next login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::Sha256;
use tracing::instrument;

use bazaar_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::UserRecord;
use crate::payments::signature::constant_time_compare;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

const LEGACY_SALT_LEN: usize = 16;
const LEGACY_DIGEST_LEN: usize = 32;
const LEGACY_ROUNDS: u32 = 100_000;

/// Which scheme a stored hash matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verified {
    Argon2,
    Legacy,
}

/// Signup form, as submitted.
#[derive(Debug, Clone)]
pub struct Signup<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm: &'a str,
    pub ip: Option<String>,
}

/// Authentication service.
///
/// Handles user registration and login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: UserRepository<'a>) -> Self {
        Self { users }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` if the confirmation differs.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: Signup<'_>) -> Result<UserRecord, AuthError> {
        let username = form.username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username is required"));
        }

        if form.password != form.confirm {
            return Err(AuthError::PasswordMismatch);
        }

        let email = Email::parse(form.email)?;
        validate_password(form.password)?;
        let password_hash = hash_password(form.password)?;

        let user = self
            .users
            .create(NewUser {
                id: generate_user_id(),
                username: username.to_owned(),
                email,
                password_hash,
                ip: form.ip,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with an email or username and a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if either field is blank.
    /// Returns `AuthError::InvalidCredentials` if the user is unknown or the
    /// password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<UserRecord, AuthError> {
        if login.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingField("username and password are required"));
        }

        let mut user = self
            .users
            .get_by_login(login)
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        if verify_password(password, &user.password_hash)? == Verified::Legacy
            && let Some(upgraded) = self.upgrade_hash(&user, password).await
        {
            user.password_hash = upgraded;
        }

        Ok(user)
    }

    /// Replace a legacy hash with Argon2id. Failures leave the old hash in
    /// place; the login itself still succeeds.
    async fn upgrade_hash(&self, user: &UserRecord, password: &str) -> Option<String> {
        let hash = hash_password(password).ok()?;
        match self
            .users
            .update_password_hash(&user.id, hash.clone())
            .await
        {
            Ok(()) => {
                tracing::info!(user_id = %user.id, "Legacy password hash upgraded");
                Some(hash)
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Password hash upgrade failed");
                None
            }
        }
    }
}

/// Generate a fresh 32-hex-char user id.
fn generate_user_id() -> UserId {
    let bytes: [u8; 16] = rand::random();
    UserId::new(hex::encode(bytes))
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash of either scheme.
fn verify_password(password: &str, hash: &str) -> Result<Verified, AuthError> {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return verify_legacy(password, hash)
            .then_some(Verified::Legacy)
            .ok_or(AuthError::InvalidCredentials);
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map(|()| Verified::Argon2)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Check a `base64(salt || pbkdf2_sha256(password, salt))` blob.
fn verify_legacy(password: &str, stored: &str) -> bool {
    let Ok(blob) = STANDARD.decode(stored.trim()) else {
        return false;
    };
    let Some((salt, expected)) = blob.split_at_checked(LEGACY_SALT_LEN) else {
        return false;
    };
    if expected.len() != LEGACY_DIGEST_LEN {
        return false;
    }

    let mut derived = [0_u8; LEGACY_DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, LEGACY_ROUNDS, &mut derived);
    constant_time_compare(&hex::encode(derived), &hex::encode(expected))
}
