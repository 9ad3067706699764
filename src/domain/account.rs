//! Account domain service: registration, credential checks, profile updates.
//!
//! Raw passwords exist only transiently on this path; they are hashed via the
//! [`PasswordHasher`] port before touching a repository and never read back.

use std::sync::Arc;

use tracing::info;

use crate::domain::error::{Error, FieldError};
use crate::domain::ports::{
    NewUserRecord, PasswordHasher, PasswordHasherError, UserChanges, UserRepository,
    UserRepositoryError,
};
use crate::domain::user::{
    EmailAddress, User, UserId, UserValidationError, validate_name, validate_password,
};

/// Raw registration payload; `None` marks an omitted field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationInput {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Raw profile patch; omitted fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub password: Option<String>,
}

fn missing_field(field: &str) -> FieldError {
    FieldError::new(field, "missing_field", format!("missing required field: {field}"))
}

fn user_field_error(field: &str, error: &UserValidationError) -> FieldError {
    let code = match error {
        UserValidationError::EmptyEmail | UserValidationError::EmptyName => "blank",
        UserValidationError::InvalidEmail => "invalid",
        UserValidationError::EmailTooLong { .. } | UserValidationError::NameTooLong { .. } => {
            "too_long"
        }
        UserValidationError::PasswordTooShort { .. } => "too_short",
    };
    FieldError::new(field, code, error.to_string())
}

fn bad_credentials() -> Error {
    Error::unauthorized("unable to authenticate with provided credentials")
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::EmailTaken { .. } => Error::validation(vec![FieldError::new(
            "email",
            "email_taken",
            "a user with this email already exists",
        )]),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    match error {
        PasswordHasherError::Hashing { message } => {
            Error::internal(format!("password hashing error: {message}"))
        }
    }
}

/// Identity operations over the user repository and hasher ports.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    /// Create a new service over the given adapters.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Register a new user, collecting every field failure.
    pub async fn register(&self, input: RegistrationInput) -> Result<User, Error> {
        let mut errors = Vec::new();

        let email = match &input.email {
            None => {
                errors.push(missing_field("email"));
                None
            }
            Some(raw) => match EmailAddress::new(raw) {
                Ok(email) => Some(email),
                Err(error) => {
                    errors.push(user_field_error("email", &error));
                    None
                }
            },
        };
        let name = match &input.name {
            None => {
                errors.push(missing_field("name"));
                None
            }
            Some(raw) => match validate_name(raw) {
                Ok(name) => Some(name),
                Err(error) => {
                    errors.push(user_field_error("name", &error));
                    None
                }
            },
        };
        let password = match &input.password {
            None => {
                errors.push(missing_field("password"));
                None
            }
            Some(raw) => match validate_password(raw) {
                Ok(()) => Some(raw.clone()),
                Err(error) => {
                    errors.push(user_field_error("password", &error));
                    None
                }
            },
        };

        let (Some(email), Some(name), Some(password)) = (email, name, password) else {
            return Err(Error::validation(errors));
        };

        let password_hash = self.hasher.hash(&password).map_err(map_hasher_error)?;
        let user = self
            .users
            .insert(NewUserRecord {
                email,
                name,
                password_hash,
            })
            .await
            .map_err(map_user_error)?;

        info!(user_id = %user.id, "registered new user");
        Ok(user)
    }

    /// Verify credentials and return the authenticated user.
    ///
    /// Unknown addresses, wrong passwords, and deactivated accounts are all
    /// reported identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, Error> {
        let mut errors = Vec::new();
        if email.trim().is_empty() {
            errors.push(FieldError::new("email", "blank", "email must not be blank"));
        }
        if password.is_empty() {
            errors.push(FieldError::new(
                "password",
                "blank",
                "password must not be blank",
            ));
        }
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }

        let Ok(email) = EmailAddress::new(email) else {
            return Err(bad_credentials());
        };
        let Some(credentials) = self
            .users
            .find_credentials(&email)
            .await
            .map_err(map_user_error)?
        else {
            return Err(bad_credentials());
        };

        let verified = self
            .hasher
            .verify(password, &credentials.password_hash)
            .map_err(map_hasher_error)?;
        if !verified || !credentials.user.is_active {
            return Err(bad_credentials());
        }
        Ok(credentials.user)
    }

    /// Fetch the profile behind an authenticated session.
    pub async fn profile(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            // The session outlived the account; force a fresh login.
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Apply a partial profile update (name and/or password).
    pub async fn update_profile(&self, id: UserId, patch: ProfilePatch) -> Result<User, Error> {
        let mut errors = Vec::new();

        let name = match &patch.name {
            None => None,
            Some(raw) => match validate_name(raw) {
                Ok(name) => Some(name),
                Err(error) => {
                    errors.push(user_field_error("name", &error));
                    None
                }
            },
        };
        let password_hash = match &patch.password {
            None => None,
            Some(raw) => match validate_password(raw) {
                Ok(()) => Some(self.hasher.hash(raw).map_err(map_hasher_error)?),
                Err(error) => {
                    errors.push(user_field_error("password", &error));
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }

        self.users
            .update(
                id,
                UserChanges {
                    name,
                    password_hash,
                },
            )
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}
