//! Submission workflow error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubmissionError {
    #[error(
        "validation failed for {guid}: {errors} errors, {warnings} warnings{}",
        processing_suffix(.processed)
    )]
    ValidationFailed {
        guid: String,
        processed: bool,
        errors: u32,
        warnings: u32,
    },

    #[error("signing service reported {guid} as valid but listed no files")]
    NoFilesAvailable { guid: String },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn processing_suffix(processed: &bool) -> &'static str {
    if *processed {
        ""
    } else {
        " (still processing)"
    }
}

impl UserFacingError for SubmissionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ValidationFailed {
                processed: false, ..
            } => Some("Validation was still running; raise the poll attempts or delay."),
            Self::ValidationFailed { .. } => {
                Some("Open the validation report on the signing service and fix the reported errors.")
            }
            Self::NoFilesAvailable { .. } => {
                Some("The package may be awaiting manual review; check its status later.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed {
                processed: false,
                ..
            } | Self::NoFilesAvailable { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ValidationFailed { .. } => "submission.validation_failed",
            Self::NoFilesAvailable { .. } => "submission.no_files",
        };
        Some(code)
    }
}
