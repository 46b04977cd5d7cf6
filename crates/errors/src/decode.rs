//! Response decoding error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeError {
    #[error("invalid {stage} response: {message}")]
    InvalidJson { stage: String, message: String },
}

impl UserFacingError for DecodeError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("The signing service returned an unexpected body; check the service base URL.")
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidJson { .. } => Some("decode.invalid_json"),
        }
    }
}
