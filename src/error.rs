//! Error types for the receipts crate.
//!
//! Internally we use `anyhow` (aliased as `Res`). At the public boundary, i.e. the `commands`
//! module, errors are tagged with an `ErrorType` so that callers can tell a validation problem,
//! which the user can fix by re-submitting the form, apart from configuration and remote-service
//! failures.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad categories of failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Missing or malformed configuration or secrets.
    Config,
    /// Unable to obtain an access token.
    Auth,
    /// The form input was rejected before anything was sent anywhere.
    Validation,
    /// A call to Google Drive or Google Sheets failed.
    Service,
    /// Local file system problems.
    Io,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type.
#[derive(Debug)]
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: anyhow::Error) -> Self {
        Self { error_type, inner }
    }

    /// Creates a validation error carrying exactly `message`.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Validation, anyhow::anyhow!(message.into()))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn is_validation(&self) -> bool {
        self.error_type == ErrorType::Validation
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Validation messages are shown to the user verbatim.
        if self.is_validation() {
            return write!(f, "{}", self.inner);
        }
        write!(f, "{} error: {:#}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let inner: &(dyn std::error::Error + 'static) = self.inner.as_ref();
        Some(inner)
    }
}

/// Converts an internal `Res` into a public `Result` by tagging the error with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Res<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
