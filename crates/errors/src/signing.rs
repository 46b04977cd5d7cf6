//! Credential signing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SigningError {
    #[error("JWT secret is empty")]
    EmptySecret,

    #[error("failed to sign credential: {reason}")]
    EncodeFailed { reason: String },
}

impl UserFacingError for SigningError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptySecret => Some(
                "Set XPISIGN_JWT_ISSUER and XPISIGN_JWT_SECRET or pass --issuer/--secret.",
            ),
            Self::EncodeFailed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::EmptySecret => "signing.empty_secret",
            Self::EncodeFailed { .. } => "signing.encode_failed",
        };
        Some(code)
    }
}
