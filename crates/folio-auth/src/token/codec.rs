//! HS256 token signing and verification.
//!
//! The algorithm is fixed: tokens whose header names anything but HS256 are
//! rejected as malformed. Besides `exp`, verification enforces a maximum
//! token age measured from `iat`, so a token with a tampered or skewed
//! expiry still dies at the ceiling.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use thiserror::Error;

use folio_core::config::AuthConfig;
use folio_core::error::AppError;

use super::claims::{Claims, TokenSubject};

/// Why a token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::expired_token("Token expired"),
            TokenError::Malformed | TokenError::BadSignature => {
                AppError::malformed_token("Invalid token")
            }
        }
    }
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }

    /// Lifetime in seconds at issuance.
    pub fn lifetime_seconds(&self) -> i64 {
        self.claims.exp - self.claims.iat
    }
}

/// Signs and verifies admin tokens with a server-held symmetric secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    refresh_validation: Validation,
    issuer: String,
    audience: String,
    default_lifetime: Duration,
    max_age: Duration,
    leeway: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("default_lifetime", &self.default_lifetime)
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    ///
    /// Fails with a configuration error when no secret is configured.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let secret = config.secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.leeway_seconds;

        let mut refresh_validation = validation.clone();
        refresh_validation.validate_exp = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            refresh_validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            default_lifetime: Duration::hours(config.token_ttl_hours as i64),
            max_age: Duration::hours(config.max_age_hours as i64),
            leeway: config.leeway_seconds as i64,
        })
    }

    /// The configured token lifetime.
    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }

    /// Signs a token for `subject` valid for `lifetime` from now.
    pub fn issue(&self, subject: &TokenSubject, lifetime: Duration) -> Result<IssuedToken, AppError> {
        self.issue_at(subject, lifetime, Utc::now())
    }

    /// Signs a token as if issued at `issued_at`.
    ///
    /// `lifetime` must lie in `(0, max_age]`.
    pub fn issue_at(
        &self,
        subject: &TokenSubject,
        lifetime: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        if lifetime <= Duration::zero() || lifetime > self.max_age {
            return Err(AppError::validation(format!(
                "Token lifetime must be between 1s and {}s",
                self.max_age.num_seconds()
            )));
        }

        let iat = issued_at.timestamp();
        let claims = Claims {
            subject: subject.clone(),
            jti: subject.sid.to_string(),
            nonce: hex::encode(rand::random::<[u8; 8]>()),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            nbf: iat,
            exp: (issued_at + lifetime).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verifies signature, issuer, audience, expiry, and the max-age ceiling.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode_with(token, &self.validation)?;
        self.check_age(&claims, Utc::now().timestamp())?;
        Ok(claims)
    }

    /// Verifies everything except expiry and max age.
    ///
    /// Only the refresh flow uses this; it still requires a live session.
    pub fn verify_ignoring_expiry(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode_with(token, &self.refresh_validation)?;
        if claims.iat > Utc::now().timestamp() + self.leeway {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })
    }

    fn check_age(&self, claims: &Claims, now: i64) -> Result<(), TokenError> {
        if claims.iat > now + self.leeway {
            return Err(TokenError::Malformed);
        }
        if now - claims.iat > self.max_age.num_seconds() + self.leeway {
            return Err(TokenError::Expired);
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ExpiryOnly {
    exp: i64,
}

/// Reads `exp` from a token payload without checking the signature.
///
/// Returns `None` for anything that is not a three-part token with a JSON
/// payload carrying a numeric `exp`.
pub fn peek_expiry(token: &str) -> Option<i64> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice::<ExpiryOnly>(&bytes).ok().map(|p| p.exp)
}
