#![deny(clippy::pedantic, unsafe_code)]

//! Short-lived credentials for the signing service
//!
//! Every request to the service carries a fresh HS256 JWT whose claims are
//! `iss` (the API key), `iat` and `exp = iat + 5 minutes`. Time comes from a
//! [`Clock`] so tests can pin issuance to a known instant.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use xpisign_errors::SigningError;

/// Lifetime of every issued credential.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// Source of the current Unix time in seconds.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually driven clock
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let secs = i64::try_from(by.as_secs()).unwrap_or(i64::MAX);
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Registered claims carried by the credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// A signed credential, valid until `expires_at`
#[derive(Clone)]
pub struct Credential {
    token: String,
    issued_at: i64,
    expires_at: i64,
}

impl Credential {
    /// Compact JWT
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("JWT {}", self.token)
    }

    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Mints credentials from an API key pair
#[derive(Clone)]
pub struct TokenIssuer {
    issuer: String,
    secret: String,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create an issuer backed by the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty.
    pub fn new(issuer: impl Into<String>, secret: impl Into<String>) -> Result<Self, SigningError> {
        let issuer = issuer.into();
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SigningError::EmptySecret);
        }
        Ok(Self {
            issuer,
            secret,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign a new credential valid for [`TOKEN_LIFETIME`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JWT encoder rejects the key or claims.
    pub fn issue(&self) -> Result<Credential, SigningError> {
        let issued_at = self.clock.now_unix();
        let lifetime = i64::try_from(TOKEN_LIFETIME.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: issued_at + lifetime,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| SigningError::EncodeFailed {
            reason: e.to_string(),
        })?;

        Ok(Credential {
            token,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use proptest::prelude::*;

    fn decode_claims(token: &str, secret: &str) -> Claims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims
    }

    #[test]
    fn test_claims_use_single_instant() {
        let clock = Arc::new(FixedClock::new(1_700_000_000));
        let issuer = TokenIssuer::new("user:12345:67", "s3cret")
            .unwrap()
            .with_clock(clock);

        let credential = issuer.issue().unwrap();
        let claims = decode_claims(credential.token(), "s3cret");

        assert_eq!(claims.iss, "user:12345:67");
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_300);
        assert_eq!(credential.issued_at(), claims.iat);
        assert_eq!(credential.expires_at(), claims.exp);
        assert!(credential.authorization().starts_with("JWT "));
    }

    #[test]
    fn test_expiry_follows_clock() {
        let clock = Arc::new(FixedClock::new(1_000));
        let issuer = TokenIssuer::new("iss", "key")
            .unwrap()
            .with_clock(clock.clone());

        let first = issuer.issue().unwrap();
        clock.advance(Duration::from_secs(299));
        assert!(!first.is_expired_at(clock.now_unix()));
        clock.advance(Duration::from_secs(1));
        assert!(first.is_expired_at(clock.now_unix()));

        let second = issuer.issue().unwrap();
        assert_eq!(second.issued_at(), 1_300);
        assert!(!second.is_expired_at(clock.now_unix()));
    }

    #[test]
    fn test_wrong_secret_does_not_verify() {
        let issuer = TokenIssuer::new("iss", "right").unwrap();
        let credential = issuer.issue().unwrap();
        let validation = Validation::new(Algorithm::HS256);
        assert!(decode::<Claims>(
            credential.token(),
            &DecodingKey::from_secret(b"wrong"),
            &validation
        )
        .is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            TokenIssuer::new("iss", ""),
            Err(SigningError::EmptySecret)
        ));
    }

    #[test]
    fn test_empty_issuer_is_signed_as_is() {
        let issuer = TokenIssuer::new("", "secret").unwrap();
        let claims = decode_claims(issuer.issue().unwrap().token(), "secret");
        assert_eq!(claims.iss, "");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let issuer = TokenIssuer::new("iss", "hunter2").unwrap();
        let credential = issuer.issue().unwrap();
        assert!(!format!("{issuer:?}").contains("hunter2"));
        assert!(!format!("{credential:?}").contains(credential.token()));
    }

    proptest! {
        #[test]
        fn prop_lifetime_is_exactly_five_minutes(
            now in 0i64..4_000_000_000,
            iss in "[a-z0-9:]{1,32}",
            secret in "[ -~]{1,64}",
        ) {
            let issuer = TokenIssuer::new(iss.clone(), secret.clone())
                .unwrap()
                .with_clock(Arc::new(FixedClock::new(now)));
            let claims = decode_claims(issuer.issue().unwrap().token(), &secret);
            prop_assert_eq!(claims.exp - claims.iat, 300);
            prop_assert_eq!(claims.iat, now);
            prop_assert_eq!(claims.iss, iss);
        }
    }
}
