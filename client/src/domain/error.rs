//! Presentation-facing error payload.
//!
//! Service errors collapse into an [`Error`] carrying a stable [`ErrorCode`]
//! and a short message. Transport internals such as response bodies stay out
//! of the message; the HTTP status, timeout and offending field travel in
//! `details` instead.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::ports::RequestError;
use crate::domain::{
    EndpointValidationError, RegistryError, SettingsError, TileLayoutError, UpdateCodeError,
};

/// Stable machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Timeout,
    HttpError,
    TransportError,
    DecodeError,
    ValidationError,
    NotFound,
    /// Backend state could not be saved ahead of a code update.
    PersistFailed,
    /// The code update failed after backend state was saved.
    UpdateFailed,
    MalformedTile,
    SettingsUnavailable,
}

/// Error payload handed to the presentation layer.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use client::domain::{Error, ErrorCode};
///
/// let err = Error::try_new(ErrorCode::NotFound, "missing").expect("valid message");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert!(Error::try_new(ErrorCode::NotFound, " ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    EmptyMessage,
}

impl std::fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

impl Error {
    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    // Only called with the non-empty literals below.
    fn fixed(code: ErrorCode, message: &'static str) -> Self {
        Self {
            code,
            message: message.to_owned(),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<&RequestError> for Error {
    fn from(value: &RequestError) -> Self {
        match value {
            RequestError::Timeout { timeout_ms } => Self::fixed(
                ErrorCode::Timeout,
                "the backend did not answer in time; the outcome is unknown",
            )
            .with_details(json!({ "timeoutMs": timeout_ms })),
            RequestError::Http { status, .. } => {
                Self::fixed(ErrorCode::HttpError, "the backend rejected the request")
                    .with_details(json!({ "status": status }))
            }
            RequestError::Transport { .. } => {
                Self::fixed(ErrorCode::TransportError, "the backend could not be reached")
            }
            RequestError::Decode { .. } => Self::fixed(
                ErrorCode::DecodeError,
                "the backend sent an unexpected response",
            ),
        }
    }
}

impl From<RequestError> for Error {
    fn from(value: RequestError) -> Self {
        Self::from(&value)
    }
}

impl From<EndpointValidationError> for Error {
    fn from(value: EndpointValidationError) -> Self {
        let message = match value {
            EndpointValidationError::PathMissingLeadingSlash => "endpoint path must start with '/'",
            EndpointValidationError::Blank { .. } => "a required endpoint field is empty",
        };
        Self::fixed(ErrorCode::ValidationError, message)
            .with_details(json!({ "field": value.field().as_str() }))
    }
}

impl From<RegistryError> for Error {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::Validation(error) => Self::from(error),
            RegistryError::NotFound { path } => {
                Self::fixed(ErrorCode::NotFound, "endpoint not found")
                    .with_details(json!({ "path": path.as_str() }))
            }
            RegistryError::Request(error) => Self::from(error),
        }
    }
}

impl From<UpdateCodeError> for Error {
    fn from(value: UpdateCodeError) -> Self {
        let (code, message, cause) = match value {
            UpdateCodeError::PersistFailed(cause) => (
                ErrorCode::PersistFailed,
                "backend state could not be saved; the code was not changed",
                cause,
            ),
            UpdateCodeError::UpdateFailed(cause) => (
                ErrorCode::UpdateFailed,
                "the code update failed after backend state was saved",
                cause,
            ),
        };
        let cause = Self::from(&cause);
        let mut details = json!({ "cause": cause.code() });
        if let (Some(Value::Object(extra)), Value::Object(target)) =
            (cause.details, &mut details)
        {
            target.extend(extra);
        }
        Self::fixed(code, message).with_details(details)
    }
}

impl From<SettingsError> for Error {
    fn from(value: SettingsError) -> Self {
        match value {
            SettingsError::Unavailable(cause) => Self::fixed(
                ErrorCode::SettingsUnavailable,
                "settings are unavailable and no local copy exists",
            )
            .with_details(json!({ "cause": Self::from(&cause).code() })),
            SettingsError::SaveFailed(cause) => Self::from(cause),
        }
    }
}

impl From<TileLayoutError> for Error {
    fn from(value: TileLayoutError) -> Self {
        Self::fixed(ErrorCode::MalformedTile, "the dashboard contains a malformed tile")
            .with_details(json!({ "tileId": value.tile_id }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}
