//! The single admin account and timing-safe credential verification.
//!
//! The configured password is never kept in memory as plaintext after
//! start-up: it is hashed with Argon2id once, and logins verify against the
//! hash. Emails are compared through SHA-256 digests so the comparison time
//! does not depend on how many leading characters match.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use folio_core::config::AuthConfig;
use folio_core::error::AppError;

use crate::identity::{Identity, PermissionSet, Role};

/// Identity id of the built-in admin account.
pub const ADMIN_ID: &str = "admin";

/// The one account allowed to log in.
#[derive(Clone)]
pub struct AdminAccount {
    identity: Identity,
    email_digest: [u8; 32],
    password_hash: String,
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("identity", &self.identity)
            .finish()
    }
}

impl AdminAccount {
    /// Builds the account from configuration, hashing the password.
    ///
    /// Fails with a configuration error when either credential is missing.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        let email = config
            .admin_email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::configuration("Admin email not configured"))?;
        let password = config
            .admin_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::configuration("Admin password not configured"))?;

        Self::new(&email, password)
    }

    /// Builds the account from plaintext credentials.
    pub fn new(email: &str, password: &str) -> Result<Self, AppError> {
        let email = normalize_email(email);
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?
            .to_string();

        Ok(Self {
            email_digest: digest(&email),
            identity: Identity {
                id: ADMIN_ID.to_string(),
                email,
                role: Role::Admin,
                permissions: PermissionSet::admin(),
            },
            password_hash,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Resolves an identity id carried in a token.
    pub fn resolve(&self, identity_id: &str) -> Option<&Identity> {
        (identity_id == self.identity.id).then_some(&self.identity)
    }

    /// Checks a login attempt.
    ///
    /// Both the email and the password are always checked, so a wrong email
    /// costs as much as a wrong password.
    pub fn verify(&self, email: &str, password: &str) -> Result<Option<&Identity>, AppError> {
        let email_ok = bool::from(digest(&normalize_email(email)).ct_eq(&self.email_digest));

        let parsed = PasswordHash::new(&self.password_hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;
        let password_ok = match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                return Err(AppError::internal(format!(
                    "Password verification failed: {e}"
                )));
            }
        };

        Ok((email_ok & password_ok).then_some(&self.identity))
    }
}

/// Lower-cases and trims an email for comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
