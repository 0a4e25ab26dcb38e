//! Session identity used as the backend's per-user key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`Username::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    Empty,
    SurroundingWhitespace,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "username must not be empty"),
            Self::SurroundingWhitespace => {
                write!(f, "username must not contain surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable, email-like identifier supplied by whoever authenticated the user.
///
/// The client trusts the value as given; it only rejects identifiers that
/// could never address a backend record.
///
/// # Examples
/// ```
/// use client::domain::Username;
///
/// let user = Username::new("demo@nalflo.com").expect("valid username");
/// assert_eq!(user.as_ref(), "demo@nalflo.com");
/// assert!(Username::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from borrowed input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(value.as_ref().to_owned())
    }

    fn from_owned(value: String) -> Result<Self, UserValidationError> {
        if value.trim().is_empty() {
            return Err(UserValidationError::Empty);
        }
        if value.trim() != value {
            return Err(UserValidationError::SurroundingWhitespace);
        }
        Ok(Self(value))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}
