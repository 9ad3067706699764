//! User identity data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by the user value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    EmptyName,
    NameTooLong { max: usize },
    PasswordTooShort { min: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier assigned by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a repository-assigned identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Maximum stored length for an email address.
pub const EMAIL_MAX: usize = 255;
/// Maximum stored length for a display name.
pub const NAME_MAX: usize = 255;
/// Minimum accepted password length, checked before hashing.
pub const PASSWORD_MIN: usize = 5;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Deliverability is the mail server's problem; this only rejects
        // strings that cannot be addresses at all.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated email address with a lowercased domain part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an address.
    ///
    /// The domain part is lowercased; the local part is preserved verbatim
    /// since some providers treat it case-sensitively.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        let email = email.trim().to_owned();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }

        let (local, domain) = email
            .rsplit_once('@')
            .ok_or(UserValidationError::InvalidEmail)?;
        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Validate a display name, returning the trimmed value.
pub fn validate_name(name: &str) -> Result<String, UserValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(UserValidationError::NameTooLong { max: NAME_MAX });
    }
    Ok(trimmed.to_owned())
}

/// Check the raw password length policy before hashing.
pub fn validate_password(raw: &str) -> Result<(), UserValidationError> {
    if raw.chars().count() < PASSWORD_MIN {
        return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    Ok(())
}

/// Application user as visible to the rest of the domain.
///
/// The credential hash never appears here; it stays behind the user
/// repository port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
}
